//! Application runtime plumbing: layered configuration and logging setup.

pub mod config;
pub mod logging;

pub use config::{AppConfig, CliArgs, LoggingConfig, ProblemConfig, Section, ServerConfig};
