pub mod dashboard;
pub mod import;
pub mod report;
