// Profile extraction: raw document text in, CandidateProfile out.
// Normalize, segment, run the per-section extractors, assemble.
// Only basic_info talks to the classifier; everything else is pure text work.

pub mod assembler;
pub mod basic_info;
pub mod dates;
pub mod document;
pub mod education;
pub mod experience;
pub mod handlers;
pub mod languages;
pub mod listing;
pub mod normalizer;
pub mod pipeline;
pub mod segmenter;
pub mod skills;

pub use document::{DocumentExtractor, PdfTextExtractor, RawDocumentText};
pub use pipeline::{extract_profile, ExtractionContext, ExtractionReport};

/// Records produced by one extractor plus the number of entries it dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct Extracted<T> {
    pub records: Vec<T>,
    pub dropped: usize,
}

impl<T> Default for Extracted<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            dropped: 0,
        }
    }
}
