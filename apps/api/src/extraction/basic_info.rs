//! Contact data and identity lines (name, headline, location).
//!
//! Email, phone and profile URL are plain pattern matches over the whole
//! document. The name comes from the line after the export's contact marker;
//! documents without a marker fall back to the remote classifier.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::{debug, info};

use crate::classifier::ZeroShotClassifier;
use crate::errors::AppError;
use crate::extraction::segmenter::{HeaderStrategy, TokenDictionary};

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").expect("valid regex")
});

/// Digits with the usual separators, never across a line break.
static PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\+?\(?\d[\d ().\-]{7,}\d").expect("valid regex"));

/// `YYYY-MM` / `MM/YYYY` dates and ranges of them, which would otherwise read
/// as a phone number once the separators are dropped.
static YEAR_MONTH_SPAN: Lazy<Regex> = Lazy::new(|| {
    let ym = r"(?:(?:19|20)\d{2}[-./](?:1[0-2]|0?[1-9])|(?:1[0-2]|0?[1-9])[-./](?:19|20)\d{2})";
    Regex::new(&format!(r"\b{ym}(?:\s*[-–—]\s*{ym})?(?:$|[^\d./\-])")).expect("valid regex")
});

static PROFILE_URL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:https?://)?(?:[a-z]{2,3}\.)?linkedin\.com/in/[A-Za-z0-9_%\-]+/?")
        .expect("valid regex")
});

const CONTACT_MARKERS: &[&str] = &[
    "contact",
    "contact information",
    "contactar",
    "coordonnées",
    "kontakt",
    "contato",
    "contatti",
];

const EXCLUDED_PREFIXES: &[&str] = &["Page ", "www.", "http", "Top Skills", "Contact"];

/// Classifier labels for the marker-less fallback.
const LABEL_NAME: &str = "full_name";
const LABEL_HEADLINE: &str = "headline";
const LABEL_OTHER: &str = "other";

const FALLBACK_MIN_SCORE: f64 = 0.8;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct BasicInfo {
    pub full_name: Option<String>,
    pub headline: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub profile_url: Option<String>,
}

pub fn find_email(text: &str) -> Option<String> {
    EMAIL.find(text).map(|m| m.as_str().to_string())
}

/// First run of 10 to 15 digits once separators are removed. Year-month
/// dates are blanked out of each line first.
pub fn find_phone(text: &str) -> Option<String> {
    text.lines().find_map(|line| {
        let line = YEAR_MONTH_SPAN.replace_all(line, " ");
        PHONE
            .find_iter(&line)
            .map(|m| m.as_str().trim())
            .find(|candidate| {
                let digits = candidate.chars().filter(char::is_ascii_digit).count();
                (10..=15).contains(&digits)
            })
            .map(String::from)
    })
}

pub fn find_profile_url(text: &str) -> Option<String> {
    PROFILE_URL.find(text).map(|m| m.as_str().to_string())
}

fn is_contact_marker(line: &str) -> bool {
    let line = line.trim().trim_end_matches(':').to_lowercase();
    CONTACT_MARKERS.contains(&line.as_str())
}

fn is_contact_data(line: &str) -> bool {
    EMAIL.is_match(line) || PROFILE_URL.is_match(line) || find_phone(line).is_some()
}

fn is_excluded(line: &str, headers: &TokenDictionary) -> bool {
    EXCLUDED_PREFIXES.iter().any(|p| line.starts_with(p))
        || is_contact_data(line)
        || headers.match_header(line).is_some()
}

/// Name, headline and location from the lines following the contact marker.
fn identity_after_marker(text: &str) -> Option<(String, Option<String>, Option<String>)> {
    let headers = TokenDictionary::new();
    let mut lines = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .skip_while(|l| !is_contact_marker(l));
    lines.next()?;

    let mut rest = lines.skip_while(|l| is_excluded(l, &headers));
    let name = rest.next()?.to_string();
    let headline = rest
        .by_ref()
        .find(|l| !is_excluded(l, &headers))
        .map(String::from);
    let location = match headline {
        Some(_) => rest
            .next()
            .filter(|l| !is_excluded(l, &headers))
            .map(String::from),
        None => None,
    };
    Some((name, headline, location))
}

/// Extracts contact data and identity lines. Only the classifier fallback can
/// fail; its error aborts this step and is returned to the caller.
pub async fn extract_basic_info(
    text: &str,
    classifier: &dyn ZeroShotClassifier,
) -> Result<BasicInfo, AppError> {
    let mut info = BasicInfo {
        email: find_email(text),
        phone: find_phone(text),
        profile_url: find_profile_url(text),
        ..BasicInfo::default()
    };

    if let Some((name, headline, location)) = identity_after_marker(text) {
        debug!(%name, "name found after contact marker");
        info.full_name = Some(name);
        info.headline = headline;
        info.location = location;
        return Ok(info);
    }

    let candidates: Vec<String> = text
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .take(2)
        .map(String::from)
        .collect();
    if candidates.is_empty() {
        return Ok(info);
    }

    info!(lines = candidates.len(), "no contact marker, classifying leading lines");
    let labels = [LABEL_NAME, LABEL_HEADLINE, LABEL_OTHER].map(String::from);
    let results = classifier.classify(&candidates, &labels).await?;

    for (line, classification) in candidates.iter().zip(&results) {
        let Some((label, score)) = classification.top() else {
            continue;
        };
        if score <= FALLBACK_MIN_SCORE {
            debug!(%line, label, score, "classification below threshold");
            continue;
        }
        match label {
            LABEL_NAME if info.full_name.is_none() => info.full_name = Some(line.clone()),
            LABEL_HEADLINE if info.headline.is_none() => info.headline = Some(line.clone()),
            _ => {}
        }
    }

    Ok(info)
}
