// Reporting Module
// Renders finished runs for terminals and CI systems

pub mod reporter;

// Re-export key types
pub use reporter::{outcome_summary, ReportFormat, RunReporter};
