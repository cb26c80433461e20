//! Human verification of mapped fields before submission.
//!
//! ```text
//! Presenting -> AwaitingChoice -> Approved
//!                    |  ^      \-> Cancelled
//!                    v  |
//!                  Modifying
//! ```
//!
//! Unrecognized input re-prompts without a transition. The elapsed-time limit
//! is only reported when `check_timeout` is polled; nothing interrupts a
//! pending prompt.

pub mod operator;

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::MappedField;

pub use operator::{ConsoleOperator, OperatorIo, ScriptedOperator};

const CHOICE_PROMPT: &str = "Choose [1] approve  [2] modify  [3] cancel: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationState {
    Presenting,
    AwaitingChoice,
    Modifying,
    Approved,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Approve,
    Modify,
    Cancel,
}

impl Choice {
    pub fn parse(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "1" | "approve" | "a" => Some(Choice::Approve),
            "2" | "modify" | "m" => Some(Choice::Modify),
            "3" | "cancel" | "c" => Some(Choice::Cancel),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct VerificationOutcome {
    pub session_id: Uuid,
    pub approved: bool,
    /// Field identity -> value entered by the operator.
    pub modifications: HashMap<String, String>,
    pub confidence_threshold_met: bool,
    pub duration: Duration,
    pub timestamp: DateTime<Utc>,
}

pub fn validate_threshold(threshold: f64) -> Result<(), AppError> {
    if (0.0..=1.0).contains(&threshold) {
        Ok(())
    } else {
        Err(AppError::Validation(format!(
            "confidence_threshold must be between 0 and 1, got {threshold}"
        )))
    }
}

/// True when every non-file field is at or above the threshold.
pub fn threshold_met(fields: &[MappedField], threshold: f64) -> bool {
    fields
        .iter()
        .filter(|f| !f.is_file())
        .all(|f| f.confidence >= threshold)
}

pub struct VerificationController {
    session_id: Uuid,
    fields: Vec<MappedField>,
    threshold_met: bool,
    limit: Duration,
    started: Instant,
    state: VerificationState,
    modifications: HashMap<String, String>,
}

impl VerificationController {
    pub fn new(fields: Vec<MappedField>, threshold: f64, limit: Duration) -> Result<Self, AppError> {
        validate_threshold(threshold)?;
        let threshold_met = threshold_met(&fields, threshold);
        Ok(Self {
            session_id: Uuid::new_v4(),
            fields,
            threshold_met,
            limit,
            started: Instant::now(),
            state: VerificationState::Presenting,
            modifications: HashMap::new(),
        })
    }

    pub fn state(&self) -> VerificationState {
        self.state
    }

    pub fn fields(&self) -> &[MappedField] {
        &self.fields
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// `VerificationTimeout` once the session has been open for at least the
    /// configured limit.
    pub fn check_timeout(&self) -> Result<(), AppError> {
        let elapsed = self.elapsed();
        if elapsed >= self.limit {
            return Err(AppError::VerificationTimeout {
                elapsed_secs: elapsed.as_secs(),
                limit_secs: self.limit.as_secs(),
            });
        }
        Ok(())
    }

    pub fn render_table(&self) -> String {
        let rows: Vec<[String; 4]> = self
            .fields
            .iter()
            .map(|f| {
                let label = if f.descriptor.required {
                    format!("{}*", f.descriptor.label)
                } else {
                    f.descriptor.label.clone()
                };
                let confidence = if f.is_file() {
                    "N/A".to_string()
                } else {
                    format!("{:.0}%", f.confidence * 100.0)
                };
                [
                    label,
                    f.descriptor.field_type.as_str().to_string(),
                    f.value.clone(),
                    confidence,
                ]
            })
            .collect();

        let header = ["Field", "Type", "Value", "Confidence"].map(String::from);
        let mut widths = header.clone().map(|h| h.chars().count());
        for row in &rows {
            for (w, cell) in widths.iter_mut().zip(row) {
                *w = (*w).max(cell.chars().count());
            }
        }

        let line = |cells: &[String; 4]| {
            cells
                .iter()
                .zip(widths)
                .map(|(c, w)| format!("{c:<w$}"))
                .collect::<Vec<_>>()
                .join(" | ")
                .trim_end()
                .to_string()
        };
        let mut out = vec![line(&header)];
        out.push(widths.map(|w| "-".repeat(w)).join("-+-"));
        out.extend(rows.iter().map(line));
        out.join("\n")
    }

    async fn modify(&mut self, io: &mut dyn OperatorIo) -> Result<(), AppError> {
        io.show("Enter a new value, or press Enter to keep the current one.")
            .await?;
        for field in self.fields.iter_mut().filter(|f| !f.is_file()) {
            let prompt = format!("{} [{}]: ", field.descriptor.label, field.value);
            let answer = io.ask(&prompt).await?;
            let answer = answer.trim();
            if answer.is_empty() || answer == field.value {
                continue;
            }
            debug!(field = %field.descriptor.identity, "value overridden");
            field.value = answer.to_string();
            self.modifications
                .insert(field.descriptor.identity.clone(), answer.to_string());
        }
        Ok(())
    }

    /// Runs the conversation to a terminal state. Cancel surfaces as
    /// `AppError::VerificationCancelled`.
    pub async fn run(&mut self, io: &mut dyn OperatorIo) -> Result<VerificationOutcome, AppError> {
        info!(
            session_id = %self.session_id,
            fields = self.fields.len(),
            threshold_met = self.threshold_met,
            "verification started"
        );

        loop {
            match self.state {
                VerificationState::Presenting => {
                    io.show(&self.render_table()).await?;
                    if !self.threshold_met {
                        io.show("Some fields are below the confidence threshold.")
                            .await?;
                    }
                    self.state = VerificationState::AwaitingChoice;
                }
                VerificationState::AwaitingChoice => {
                    let input = io.ask(CHOICE_PROMPT).await?;
                    match Choice::parse(&input) {
                        Some(Choice::Approve) => self.state = VerificationState::Approved,
                        Some(Choice::Modify) => self.state = VerificationState::Modifying,
                        Some(Choice::Cancel) => self.state = VerificationState::Cancelled,
                        None => io.show("Invalid choice").await?,
                    }
                }
                VerificationState::Modifying => {
                    self.modify(io).await?;
                    io.show(&self.render_table()).await?;
                    self.state = VerificationState::AwaitingChoice;
                }
                VerificationState::Approved => break,
                VerificationState::Cancelled => {
                    info!(session_id = %self.session_id, "verification cancelled");
                    return Err(AppError::VerificationCancelled);
                }
            }
        }

        let outcome = VerificationOutcome {
            session_id: self.session_id,
            approved: true,
            modifications: self.modifications.clone(),
            confidence_threshold_met: self.threshold_met,
            duration: self.elapsed(),
            timestamp: Utc::now(),
        };
        info!(
            session_id = %outcome.session_id,
            modifications = outcome.modifications.len(),
            "verification approved"
        );
        Ok(outcome)
    }
}
