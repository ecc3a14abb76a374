use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RenameError {
    #[error("Missing required configuration value '{key}'")]
    MissingConfiguration { key: String },

    #[error("Configuration file {path:?} could not be loaded: {reason}")]
    InvalidConfig { path: PathBuf, reason: String },

    #[error("Row source '{source_name}' is unavailable: {reason}")]
    RowSourceUnavailable { source_name: String, reason: String },

    #[error("Row sink '{target}' failed: {reason}")]
    RowSinkFailed { target: String, reason: String },

    #[error("Label '{label}' of field '{original_name}' has no usable characters")]
    InvalidLabel { original_name: String, label: String },
}

impl RenameError {
    pub fn source_unavailable(source_name: impl Into<String>, reason: impl ToString) -> Self {
        RenameError::RowSourceUnavailable {
            source_name: source_name.into(),
            reason: reason.to_string(),
        }
    }

    pub fn sink_failed(target: impl Into<String>, reason: impl ToString) -> Self {
        RenameError::RowSinkFailed {
            target: target.into(),
            reason: reason.to_string(),
        }
    }
}

pub type Result<T, E = RenameError> = std::result::Result<T, E>;
