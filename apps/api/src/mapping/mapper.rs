//! Field Mapper: picks the profile value that best answers a form field.
//!
//! The field's hypothesis is the single sequence; the candidate values (the
//! field's own options, or a pool drawn from the profile) are the labels.
//! The top-ranked label is the value and its score the confidence.
//!
//! Failure policy differs from extraction: a classifier error here only
//! empties the one field, `("", 0.0)`, and the session carries on.

use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, warn};

use crate::classifier::{ClassifierError, ZeroShotClassifier};
use crate::mapping::hypothesis::hypothesis_for;
use crate::models::form::clamp_confidence;
use crate::models::{CandidateProfile, FieldType, FormFieldDescriptor, MappedField};

#[derive(Clone)]
pub struct FieldMapper {
    classifier: Arc<dyn ZeroShotClassifier>,
}

/// Candidate values for a field without its own options.
pub fn candidate_pool(field_type: FieldType, profile: &CandidateProfile) -> Vec<String> {
    match field_type {
        FieldType::Email => profile.email.iter().cloned().collect(),
        FieldType::Tel => profile.phone.iter().cloned().collect(),
        _ => profile.string_attributes(),
    }
}

impl FieldMapper {
    pub fn new(classifier: Arc<dyn ZeroShotClassifier>) -> Self {
        Self { classifier }
    }

    /// Like [`FieldMapper::map`] but surfaces classifier errors.
    pub async fn try_map(
        &self,
        descriptor: &FormFieldDescriptor,
        profile: &CandidateProfile,
    ) -> Result<(String, f64), ClassifierError> {
        if descriptor.field_type == FieldType::File {
            return Ok((String::new(), 0.0));
        }

        let candidates: Vec<String> = if descriptor.options.is_empty() {
            candidate_pool(descriptor.field_type, profile)
        } else {
            descriptor.options.clone()
        };
        if candidates.is_empty() {
            debug!(field = %descriptor.identity, "empty candidate pool");
            return Ok((String::new(), 0.0));
        }

        let hypothesis = hypothesis_for(descriptor);
        let results = self
            .classifier
            .classify(std::slice::from_ref(&hypothesis), &candidates)
            .await?;
        let (value, score) = results
            .first()
            .and_then(|c| c.top())
            .ok_or(ClassifierError::EmptyResult)?;

        Ok((value.to_string(), clamp_confidence(score)))
    }

    /// `(value, confidence)` for one field. Never fails: classifier errors
    /// are logged and yield `("", 0.0)`.
    pub async fn map(
        &self,
        descriptor: &FormFieldDescriptor,
        profile: &CandidateProfile,
    ) -> (String, f64) {
        match self.try_map(descriptor, profile).await {
            Ok(mapped) => {
                debug!(field = %descriptor.identity, value = %mapped.0, confidence = mapped.1, "field mapped");
                mapped
            }
            Err(e) => {
                warn!(field = %descriptor.identity, error = %e, "field mapping failed");
                (String::new(), 0.0)
            }
        }
    }

    /// Maps every descriptor concurrently and returns the results in input
    /// order. File fields are returned empty without a classifier call.
    pub async fn map_all(
        &self,
        descriptors: Vec<FormFieldDescriptor>,
        profile: Arc<CandidateProfile>,
    ) -> Vec<MappedField> {
        let mut slots: Vec<Option<MappedField>> = vec![None; descriptors.len()];
        let mut tasks = JoinSet::new();

        for (index, descriptor) in descriptors.iter().enumerate() {
            if descriptor.field_type == FieldType::File {
                slots[index] = Some(MappedField::empty(descriptor.clone()));
                continue;
            }
            let mapper = self.clone();
            let profile = Arc::clone(&profile);
            let descriptor = descriptor.clone();
            tasks.spawn(async move {
                let (value, confidence) = mapper.map(&descriptor, &profile).await;
                (index, MappedField::new(descriptor, value, confidence))
            });
        }

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, mapped)) => slots[index] = Some(mapped),
                Err(e) => warn!(error = %e, "mapping task failed"),
            }
        }

        slots
            .into_iter()
            .zip(descriptors)
            .map(|(slot, descriptor)| slot.unwrap_or_else(|| MappedField::empty(descriptor)))
            .collect()
    }
}
