//! AutoApply: turns a professional-profile export into a structured
//! candidate profile, then fills arbitrary web forms from it behind a human
//! approval step.

pub mod classifier;
pub mod config;
pub mod errors;
pub mod extraction;
pub mod history;
pub mod mapping;
pub mod models;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;
pub mod verification;
