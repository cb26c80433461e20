/// Classifier client: the single point of entry for zero-shot classification calls.
///
/// ARCHITECTURAL RULE: No other module may call the classification endpoint directly.
/// All scoring goes through the `ZeroShotClassifier` trait.
///
/// Calls are bounded by the client timeout and are never retried.
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("classification request timed out after {0:?}")]
    Timeout(Duration),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("classifier returned no labels")]
    EmptyResult,
}

/// Wire request: `{sequences, candidate_labels, multi_label}`.
#[derive(Debug, Serialize)]
struct ClassificationRequest<'a> {
    sequences: &'a [String],
    candidate_labels: &'a [String],
    multi_label: bool,
}

/// Ranked result for one input sequence. `labels` and `scores` are parallel and
/// sorted by descending score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Classification {
    pub labels: Vec<String>,
    pub scores: Vec<f64>,
}

impl Classification {
    /// The highest-ranked label and its score, if any.
    pub fn top(&self) -> Option<(&str, f64)> {
        let label = self.labels.first()?;
        let score = self.scores.first().copied().unwrap_or(0.0);
        Some((label.as_str(), score))
    }
}

/// The endpoint answers with a bare object for one sequence and a list for many.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ClassificationResponse {
    Single(Classification),
    Batch(Vec<Classification>),
}

impl ClassificationResponse {
    fn into_vec(self) -> Vec<Classification> {
        match self {
            ClassificationResponse::Single(c) => vec![c],
            ClassificationResponse::Batch(v) => v,
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: String,
}

/// Scores each sequence against the candidate labels without task-specific training.
///
/// Returns one `Classification` per input sequence, in input order.
#[async_trait]
pub trait ZeroShotClassifier: Send + Sync {
    async fn classify(
        &self,
        sequences: &[String],
        candidate_labels: &[String],
    ) -> Result<Vec<Classification>, ClassifierError>;
}

/// HTTP implementation for a hosted zero-shot classification model.
#[derive(Clone)]
pub struct HttpClassifier {
    client: Client,
    endpoint: String,
    api_token: Option<String>,
    timeout: Duration,
}

impl HttpClassifier {
    pub fn new(
        endpoint: String,
        api_token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, ClassifierError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            api_token,
            timeout,
        })
    }
}

#[async_trait]
impl ZeroShotClassifier for HttpClassifier {
    async fn classify(
        &self,
        sequences: &[String],
        candidate_labels: &[String],
    ) -> Result<Vec<Classification>, ClassifierError> {
        let request_body = ClassificationRequest {
            sequences,
            candidate_labels,
            multi_label: false,
        };

        let mut request = self.client.post(&self.endpoint).json(&request_body);
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout(self.timeout)
            } else {
                ClassifierError::Http(e)
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiErrorBody>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            return Err(ClassifierError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                ClassifierError::Timeout(self.timeout)
            } else {
                ClassifierError::Http(e)
            }
        })?;
        let results = parse_response(&body)?;

        debug!(
            sequences = sequences.len(),
            labels = candidate_labels.len(),
            "classification succeeded"
        );

        Ok(results)
    }
}

fn parse_response(body: &str) -> Result<Vec<Classification>, ClassifierError> {
    let results = serde_json::from_str::<ClassificationResponse>(body)?.into_vec();
    if results.is_empty() {
        return Err(ClassifierError::EmptyResult);
    }
    Ok(results)
}
