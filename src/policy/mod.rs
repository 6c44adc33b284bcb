//! Failure classification, fallback results and status reporting.

pub mod classify;
pub mod fallback;
pub mod status;
