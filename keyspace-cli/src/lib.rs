//! CLI library for testing purposes

pub mod config;
pub mod formats;
pub mod project;
pub mod validation;

pub use config::Config;
pub use formats::{PolicyArg, ReportFormat};
pub use project::Project;
