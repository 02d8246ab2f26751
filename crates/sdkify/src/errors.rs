//! Error types for the sdkify command line

use sdkify_config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that stop a run before any project is migrated
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Path not found: {}", .0.display())]
    RootNotFound(PathBuf),

    #[error("Not a .csproj file: {}", .0.display())]
    NotAProject(PathBuf),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Failed to serialize report: {0}")]
    Report(#[from] serde_json::Error),
}
