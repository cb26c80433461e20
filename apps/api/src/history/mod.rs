//! Application history: records of submitted forms and their follow-up
//! status. Records are written by whoever runs a form session
//! (`ApplicationOutcome::to_record`); the HTTP side only reads and updates.

pub mod handlers;
