// Presentation layer - reporting of migration results
pub mod status_report;
