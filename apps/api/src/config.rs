use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::extraction::segmenter::StrategyChoice;
use crate::session::{DEFAULT_CONFIDENCE_THRESHOLD, DEFAULT_VERIFICATION_TIMEOUT};

/// Application configuration loaded from environment variables.
/// Startup fails if a required variable is missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub classifier_url: String,
    pub classifier_token: Option<String>,
    pub classifier_timeout: Duration,
    /// Minimum confidence for `confidence_threshold_met`; in [0, 1].
    pub confidence_threshold: f64,
    pub verification_timeout: Duration,
    pub section_strategy: StrategyChoice,
    pub data_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let confidence_threshold = match get("CONFIDENCE_THRESHOLD") {
            Some(v) => v
                .trim()
                .parse::<f64>()
                .context("CONFIDENCE_THRESHOLD must be a number")?,
            None => DEFAULT_CONFIDENCE_THRESHOLD,
        };
        if !(0.0..=1.0).contains(&confidence_threshold) {
            bail!("CONFIDENCE_THRESHOLD must be between 0 and 1, got {confidence_threshold}");
        }

        let section_strategy = match get("SECTION_STRATEGY") {
            Some(v) => v.parse::<StrategyChoice>().map_err(anyhow::Error::msg)?,
            None => StrategyChoice::default(),
        };

        Ok(Config {
            classifier_url: get("CLASSIFIER_URL").with_context(|| {
                "Required environment variable 'CLASSIFIER_URL' is not set".to_string()
            })?,
            classifier_token: get("HUGGINGFACE_API_TOKEN"),
            classifier_timeout: Duration::from_secs(secs(&get, "CLASSIFIER_TIMEOUT_SECS", 30)?),
            confidence_threshold,
            verification_timeout: Duration::from_secs(secs(
                &get,
                "VERIFICATION_TIMEOUT_SECS",
                DEFAULT_VERIFICATION_TIMEOUT.as_secs(),
            )?),
            section_strategy,
            data_dir: get("DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./data")),
            port: get("PORT")
                .unwrap_or_else(|| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: get("RUST_LOG").unwrap_or_else(|| "info".to_string()),
        })
    }
}

fn secs(get: &impl Fn(&str) -> Option<String>, key: &str, default: u64) -> Result<u64> {
    match get(key) {
        Some(v) => v
            .trim()
            .parse::<u64>()
            .with_context(|| format!("{key} must be a whole number of seconds")),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("CLASSIFIER_URL", "http://localhost:9000/classify")]).unwrap();
        assert_eq!(config.classifier_token, None);
        assert_eq!(config.classifier_timeout, Duration::from_secs(30));
        assert_eq!(config.confidence_threshold, 0.8);
        assert_eq!(config.verification_timeout, Duration::from_secs(300));
        assert_eq!(config.section_strategy, StrategyChoice::Auto);
        assert_eq!(config.data_dir, PathBuf::from("./data"));
        assert_eq!(config.port, 8080);
        assert_eq!(config.rust_log, "info");
    }

    #[test]
    fn test_classifier_url_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("CLASSIFIER_URL"));
    }

    #[test]
    fn test_threshold_outside_unit_interval_is_rejected() {
        let url = ("CLASSIFIER_URL", "http://x");
        assert!(load(&[url, ("CONFIDENCE_THRESHOLD", "1.5")]).is_err());
        assert!(load(&[url, ("CONFIDENCE_THRESHOLD", "-0.1")]).is_err());
        assert!(load(&[url, ("CONFIDENCE_THRESHOLD", "high")]).is_err());
        let config = load(&[url, ("CONFIDENCE_THRESHOLD", "0.65")]).unwrap();
        assert_eq!(config.confidence_threshold, 0.65);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("CLASSIFIER_URL", "http://x"),
            ("HUGGINGFACE_API_TOKEN", "hf_123"),
            ("SECTION_STRATEGY", "uppercase"),
            ("VERIFICATION_TIMEOUT_SECS", "60"),
            ("PORT", "9090"),
        ])
        .unwrap();
        assert_eq!(config.classifier_token.as_deref(), Some("hf_123"));
        assert_eq!(config.section_strategy, StrategyChoice::Uppercase);
        assert_eq!(config.verification_timeout, Duration::from_secs(60));
        assert_eq!(config.port, 9090);
        assert!(load(&[("CLASSIFIER_URL", "http://x"), ("SECTION_STRATEGY", "fuzzy")]).is_err());
    }
}
