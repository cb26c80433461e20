use std::sync::Arc;

use crate::classifier::ZeroShotClassifier;
use crate::config::Config;
use crate::extraction::{DocumentExtractor, ExtractionContext};
use crate::mapping::FieldMapper;
use crate::storage::{ApplicationStore, ProfileStore};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Pluggable classifier. Default: HttpClassifier against CLASSIFIER_URL.
    pub classifier: Arc<dyn ZeroShotClassifier>,
    pub documents: Arc<dyn DocumentExtractor>,
    pub store: Arc<dyn ProfileStore>,
    pub applications: Arc<dyn ApplicationStore>,
}

impl AppState {
    pub fn extraction_context(&self) -> ExtractionContext {
        ExtractionContext {
            classifier: self.classifier.clone(),
            strategy: self.config.section_strategy,
        }
    }

    pub fn field_mapper(&self) -> FieldMapper {
        FieldMapper::new(self.classifier.clone())
    }
}
