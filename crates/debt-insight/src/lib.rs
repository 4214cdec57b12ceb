//! Financial behavior self-assessment: questionnaire scoring, report
//! composition, and paginated report export.

pub mod assessment;
pub mod config;
pub mod error;
pub mod export;
pub mod telemetry;
