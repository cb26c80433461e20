// Field mapping: chooses a profile value for each form field.
// All scoring goes through the ZeroShotClassifier trait; see classifier/.

pub mod handlers;
pub mod hypothesis;
pub mod mapper;

pub use mapper::FieldMapper;
