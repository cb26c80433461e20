//! "Apply to form at address": the end-to-end form session.
//!
//! navigate -> enumerate fields -> map (concurrently, page order kept) ->
//! write -> verify -> check timeout -> re-write overrides -> submit.
//!
//! The live page sits behind `BrowserSession`; this module never touches a DOM.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::Url;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::Config;
use crate::errors::AppError;
use crate::mapping::FieldMapper;
use crate::models::{
    ApplicationRecord, ApplicationStatus, CandidateProfile, FieldType, FormFieldDescriptor,
    MappedField,
};
use crate::verification::{
    validate_threshold, OperatorIo, VerificationController, VerificationOutcome,
};

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.8;
pub const DEFAULT_VERIFICATION_TIMEOUT: Duration = Duration::from_secs(300);

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionReceipt {
    pub ok: bool,
    pub status: Option<u16>,
    pub final_url: Option<String>,
}

/// The page capabilities the form session needs.
#[async_trait]
pub trait BrowserSession: Send {
    async fn navigate(&mut self, url: &Url) -> Result<(), AppError>;

    async fn field_descriptors(&mut self) -> Result<Vec<FormFieldDescriptor>, AppError>;

    /// Choices currently offered by a select or radio group.
    async fn read_options(&mut self, identity: &str) -> Result<Vec<String>, AppError>;

    async fn write_value(&mut self, identity: &str, value: &str) -> Result<(), AppError>;

    async fn attach_file(&mut self, identity: &str, path: &Path) -> Result<(), AppError>;

    async fn submit(&mut self) -> Result<SubmissionReceipt, AppError>;
}

#[derive(Debug, Clone)]
pub struct ApplyRequest {
    pub form_url: String,
    pub company_name: Option<String>,
    pub position_title: Option<String>,
    pub attachment: Option<PathBuf>,
    pub confidence_threshold: f64,
    pub verification_timeout: Duration,
}

impl ApplyRequest {
    pub fn new(form_url: impl Into<String>) -> Self {
        Self {
            form_url: form_url.into(),
            company_name: None,
            position_title: None,
            attachment: None,
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            verification_timeout: DEFAULT_VERIFICATION_TIMEOUT,
        }
    }

    /// Threshold and verification timeout as configured for this process.
    pub fn from_config(form_url: impl Into<String>, config: &Config) -> Self {
        Self::new(form_url)
            .with_threshold(config.confidence_threshold)
            .with_verification_timeout(config.verification_timeout)
    }

    /// Listing details kept in the application history.
    pub fn with_listing(mut self, company: impl Into<String>, position: impl Into<String>) -> Self {
        self.company_name = Some(company.into());
        self.position_title = Some(position.into());
        self
    }

    pub fn with_attachment(mut self, path: impl Into<PathBuf>) -> Self {
        self.attachment = Some(path.into());
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_verification_timeout(mut self, timeout: Duration) -> Self {
        self.verification_timeout = timeout;
        self
    }
}

/// Record of one submitted application.
#[derive(Debug, Clone, Serialize)]
pub struct ApplicationOutcome {
    pub form_url: String,
    pub company_name: Option<String>,
    pub position_title: Option<String>,
    pub applied_at: DateTime<Utc>,
    /// Identity -> confidence for every non-file field that was presented.
    pub confidence_scores: HashMap<String, f64>,
    pub modifications_made: bool,
    pub attachment: Option<PathBuf>,
    pub verification: VerificationOutcome,
    pub receipt: SubmissionReceipt,
}

impl ApplicationOutcome {
    /// History entry for this submission. A receipt that is not ok leaves
    /// the application pending.
    pub fn to_record(&self) -> ApplicationRecord {
        ApplicationRecord {
            id: Uuid::new_v4(),
            form_url: self.form_url.clone(),
            company_name: self.company_name.clone(),
            position_title: self.position_title.clone(),
            applied_at: self.applied_at,
            status: if self.receipt.ok {
                ApplicationStatus::Submitted
            } else {
                ApplicationStatus::Pending
            },
            verification_secs: self.verification.duration.as_secs_f64(),
            confidence_scores: self.confidence_scores.clone(),
            modifications_made: self.modifications_made,
            attachment: self.attachment.clone(),
        }
    }
}

fn parse_form_url(raw: &str) -> Result<Url, AppError> {
    let url = Url::parse(raw.trim())
        .map_err(|e| AppError::Validation(format!("Invalid form URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::Validation(format!(
            "Form URL must be http or https, got '{other}'"
        ))),
    }
}

async fn check_attachment(path: &Path) -> Result<(), AppError> {
    match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => Ok(()),
        _ => Err(AppError::Validation(format!(
            "Attachment '{}' does not exist",
            path.display()
        ))),
    }
}

pub async fn apply_to_form(
    request: &ApplyRequest,
    profile: Arc<CandidateProfile>,
    browser: &mut dyn BrowserSession,
    mapper: &FieldMapper,
    operator: &mut dyn OperatorIo,
) -> Result<ApplicationOutcome, AppError> {
    validate_threshold(request.confidence_threshold)?;
    let url = parse_form_url(&request.form_url)?;
    if let Some(path) = &request.attachment {
        check_attachment(path).await?;
    }

    info!(url = %url, "starting form session");
    browser.navigate(&url).await?;

    let mut descriptors = browser.field_descriptors().await?;
    for descriptor in descriptors
        .iter_mut()
        .filter(|d| d.field_type.is_choice() && d.options.is_empty())
    {
        descriptor.options = browser.read_options(&descriptor.identity).await?;
    }
    debug!(fields = descriptors.len(), "form fields detected");

    let mut presented: Vec<MappedField> = Vec::new();
    for mapped in mapper.map_all(descriptors, profile).await {
        if mapped.descriptor.field_type == FieldType::File {
            let Some(path) = &request.attachment else {
                debug!(field = %mapped.descriptor.identity, "no attachment, skipping file field");
                continue;
            };
            browser.attach_file(&mapped.descriptor.identity, path).await?;
            let name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            presented.push(MappedField::new(mapped.descriptor, name, 0.0));
            continue;
        }
        if !mapped.value.is_empty() {
            browser
                .write_value(&mapped.descriptor.identity, &mapped.value)
                .await?;
        }
        presented.push(mapped);
    }

    let mut controller = VerificationController::new(
        presented,
        request.confidence_threshold,
        request.verification_timeout,
    )?;
    let verification = controller.run(operator).await?;
    // A late approval leaves the page as mapped; overrides go in only when
    // the form is about to be submitted.
    controller.check_timeout()?;

    for field in controller.fields() {
        if let Some(value) = verification.modifications.get(&field.descriptor.identity) {
            browser.write_value(&field.descriptor.identity, value).await?;
        }
    }

    let receipt = browser.submit().await?;
    if receipt.ok {
        info!(url = %url, status = ?receipt.status, "application submitted");
    } else {
        warn!(url = %url, status = ?receipt.status, "submission response indicates a problem");
    }

    let confidence_scores = controller
        .fields()
        .iter()
        .filter(|f| !f.is_file())
        .map(|f| (f.descriptor.identity.clone(), f.confidence))
        .collect();

    Ok(ApplicationOutcome {
        form_url: url.to_string(),
        company_name: request.company_name.clone(),
        position_title: request.position_title.clone(),
        applied_at: Utc::now(),
        confidence_scores,
        modifications_made: !verification.modifications.is_empty(),
        attachment: request.attachment.clone(),
        verification,
        receipt,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::testing::FakeClassifier;
    use crate::models::profile::sample_profile;
    use crate::storage::{ApplicationStore, JsonFileStore};
    use crate::verification::ScriptedOperator;

    #[derive(Default)]
    struct FakeBrowser {
        fields: Vec<FormFieldDescriptor>,
        options: HashMap<String, Vec<String>>,
        visited: Vec<String>,
        writes: Vec<(String, String)>,
        attached: Vec<(String, PathBuf)>,
        submitted: bool,
    }

    #[async_trait]
    impl BrowserSession for FakeBrowser {
        async fn navigate(&mut self, url: &Url) -> Result<(), AppError> {
            self.visited.push(url.to_string());
            Ok(())
        }

        async fn field_descriptors(&mut self) -> Result<Vec<FormFieldDescriptor>, AppError> {
            Ok(self.fields.clone())
        }

        async fn read_options(&mut self, identity: &str) -> Result<Vec<String>, AppError> {
            Ok(self.options.get(identity).cloned().unwrap_or_default())
        }

        async fn write_value(&mut self, identity: &str, value: &str) -> Result<(), AppError> {
            self.writes.push((identity.to_string(), value.to_string()));
            Ok(())
        }

        async fn attach_file(&mut self, identity: &str, path: &Path) -> Result<(), AppError> {
            self.attached.push((identity.to_string(), path.to_path_buf()));
            Ok(())
        }

        async fn submit(&mut self) -> Result<SubmissionReceipt, AppError> {
            self.submitted = true;
            Ok(SubmissionReceipt {
                ok: true,
                status: Some(200),
                final_url: Some("https://jobs.example.com/thanks".to_string()),
            })
        }
    }

    fn descriptor(identity: &str, field_type: FieldType, label: &str) -> FormFieldDescriptor {
        FormFieldDescriptor {
            identity: identity.to_string(),
            field_type,
            label: label.to_string(),
            required: true,
            options: Vec::new(),
        }
    }

    fn browser() -> FakeBrowser {
        FakeBrowser {
            fields: vec![
                descriptor("#name", FieldType::Text, "Full Name"),
                descriptor("#email", FieldType::Email, "Email"),
                descriptor("#relocate", FieldType::Radio, "Relocate?"),
                descriptor("#cv", FieldType::File, "Resume"),
            ],
            options: HashMap::from([(
                "#relocate".to_string(),
                vec!["Yes".to_string(), "No".to_string()],
            )]),
            ..FakeBrowser::default()
        }
    }

    fn mapper() -> FieldMapper {
        FieldMapper::new(Arc::new(
            FakeClassifier::new()
                .with_score("Jane Doe", 0.96)
                .with_score("Yes", 0.7),
        ))
    }

    #[tokio::test]
    async fn test_approved_session_fills_and_submits() {
        let dir = tempfile::tempdir().unwrap();
        let cv = dir.path().join("cv.pdf");
        std::fs::write(&cv, b"%PDF-1.4").unwrap();

        let mut browser = browser();
        let mut operator = ScriptedOperator::new(["1"]);
        let request = ApplyRequest::new("https://jobs.example.com/apply").with_attachment(&cv);

        let outcome = apply_to_form(
            &request,
            Arc::new(sample_profile()),
            &mut browser,
            &mapper(),
            &mut operator,
        )
        .await
        .unwrap();

        assert!(browser.submitted);
        assert_eq!(browser.visited, vec!["https://jobs.example.com/apply"]);
        assert_eq!(
            browser.writes,
            vec![
                ("#name".to_string(), "Jane Doe".to_string()),
                ("#email".to_string(), "jane@example.com".to_string()),
                ("#relocate".to_string(), "Yes".to_string()),
            ]
        );
        assert_eq!(browser.attached, vec![("#cv".to_string(), cv.clone())]);
        assert!(!outcome.modifications_made);
        assert_eq!(outcome.confidence_scores.len(), 3);
        assert_eq!(outcome.confidence_scores["#name"], 0.96);
        // 0.5 on email and 0.7 on the radio are below 0.8.
        assert!(!outcome.verification.confidence_threshold_met);
        assert!(outcome.receipt.ok);
    }

    #[tokio::test]
    async fn test_outcome_is_recorded_in_history() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path());
        let request = ApplyRequest::new("https://jobs.example.com/apply")
            .with_listing("TechCorp", "Senior Engineer");

        let outcome = apply_to_form(
            &request,
            Arc::new(sample_profile()),
            &mut browser(),
            &mapper(),
            &mut ScriptedOperator::new(["modify", "", "", "No", "1"]),
        )
        .await
        .unwrap();
        store.store_application(&outcome.to_record()).await.unwrap();

        let history = store.applications(None, None).await.unwrap();
        assert_eq!(history.len(), 1);
        let record = &history[0];
        assert_eq!(record.form_url, "https://jobs.example.com/apply");
        assert_eq!(record.company_name.as_deref(), Some("TechCorp"));
        assert_eq!(record.position_title.as_deref(), Some("Senior Engineer"));
        assert_eq!(record.status, ApplicationStatus::Submitted);
        assert!(record.modifications_made);
        assert_eq!(record.confidence_scores["#name"], 0.96);
    }

    #[tokio::test]
    async fn test_overrides_are_written_back() {
        let mut browser = browser();
        // No attachment: the file field is skipped and never prompted.
        let mut operator = ScriptedOperator::new(["modify", "", "jane.doe@work.com", "No", "approve"]);
        let request = ApplyRequest::new("https://jobs.example.com/apply");

        let outcome = apply_to_form(
            &request,
            Arc::new(sample_profile()),
            &mut browser,
            &mapper(),
            &mut operator,
        )
        .await
        .unwrap();

        assert!(browser.attached.is_empty());
        assert!(outcome.modifications_made);
        assert_eq!(outcome.verification.modifications.len(), 2);
        assert_eq!(
            &browser.writes[3..],
            &[
                ("#email".to_string(), "jane.doe@work.com".to_string()),
                ("#relocate".to_string(), "No".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_cancel_never_submits() {
        let mut browser = browser();
        let err = apply_to_form(
            &ApplyRequest::new("https://jobs.example.com/apply"),
            Arc::new(sample_profile()),
            &mut browser,
            &mapper(),
            &mut ScriptedOperator::new(["3"]),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::VerificationCancelled));
        assert!(!browser.submitted);
    }

    #[tokio::test]
    async fn test_invalid_requests_fail_before_navigation() {
        let cases = [
            ApplyRequest::new("ftp://jobs.example.com/apply"),
            ApplyRequest::new("not a url"),
            ApplyRequest::new("https://jobs.example.com").with_threshold(1.5),
            ApplyRequest::new("https://jobs.example.com").with_attachment("/nonexistent/cv.pdf"),
        ];
        for request in cases {
            let mut browser = browser();
            let err = apply_to_form(
                &request,
                Arc::new(sample_profile()),
                &mut browser,
                &mapper(),
                &mut ScriptedOperator::new(["1"]),
            )
            .await
            .unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{request:?}");
            assert!(browser.visited.is_empty());
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_verification_blocks_submission() {
        let mut browser = browser();
        let mut operator = ScriptedOperator::new(["1"]).with_delay(Duration::from_secs(400));
        let err = apply_to_form(
            &ApplyRequest::new("https://jobs.example.com/apply"),
            Arc::new(sample_profile()),
            &mut browser,
            &mapper(),
            &mut operator,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::VerificationTimeout { .. }));
        assert!(!browser.submitted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_configured_timeout_applies() {
        let config = Config::from_lookup(|key| match key {
            "CLASSIFIER_URL" => Some("http://classifier.test".to_string()),
            "CONFIDENCE_THRESHOLD" => Some("0.5".to_string()),
            "VERIFICATION_TIMEOUT_SECS" => Some("30".to_string()),
            _ => None,
        })
        .unwrap();
        let request = ApplyRequest::from_config("https://jobs.example.com/apply", &config);
        assert_eq!(request.confidence_threshold, 0.5);
        assert_eq!(request.verification_timeout, Duration::from_secs(30));

        // 40s is well inside the default limit but past the configured one.
        let mut browser = browser();
        let mut operator = ScriptedOperator::new(["1"]).with_delay(Duration::from_secs(40));
        let err = apply_to_form(
            &request,
            Arc::new(sample_profile()),
            &mut browser,
            &mapper(),
            &mut operator,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::VerificationTimeout { limit_secs: 30, .. }));
        assert!(!browser.submitted);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_modifications_are_not_written() {
        let mut browser = browser();
        // Five answers at 100s each end past the 300s limit.
        let mut operator =
            ScriptedOperator::new(["modify", "", "late@work.com", "", "approve"])
                .with_delay(Duration::from_secs(100));
        let err = apply_to_form(
            &ApplyRequest::new("https://jobs.example.com/apply"),
            Arc::new(sample_profile()),
            &mut browser,
            &mapper(),
            &mut operator,
        )
        .await
        .unwrap_err();

        assert!(matches!(err, AppError::VerificationTimeout { .. }));
        assert!(!browser.submitted);
        assert_eq!(browser.writes.len(), 3);
        assert!(browser.writes.iter().all(|(_, value)| value != "late@work.com"));
    }
}
