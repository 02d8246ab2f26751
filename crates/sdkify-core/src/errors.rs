use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while migrating a single project
#[derive(Error, Debug)]
pub enum MigrateError {
    #[error("File not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Malformed XML in {}: {message}", .path.display())]
    Malformed { path: PathBuf, message: String },

    #[error("Missing required field '{field}' in {}", .path.display())]
    MissingField { path: PathBuf, field: String },

    #[error("<{element}> element without '{attribute}' attribute in {}", .path.display())]
    MissingAttribute {
        path: PathBuf,
        element: String,
        attribute: String,
    },

    #[error("{} is {size} bytes, over the {limit} byte input limit", .path.display())]
    InputTooLarge { path: PathBuf, size: u64, limit: u64 },

    #[error("IO error reading {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl MigrateError {
    /// Stable identifier for reports
    pub fn kind(&self) -> &'static str {
        match self {
            MigrateError::NotFound(_) => "not_found",
            MigrateError::Malformed { .. } => "malformed_input",
            MigrateError::MissingField { .. } => "missing_field",
            MigrateError::MissingAttribute { .. } => "missing_attribute",
            MigrateError::InputTooLarge { .. } => "input_too_large",
            MigrateError::Read { .. } => "read",
            MigrateError::Write { .. } => "write",
        }
    }
}
