//! Error types shared by every layer of the study companion.
//!
//! Corrupt persisted state has no variant here; the storage layer recovers
//! from it and logs a warning.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StudyError {
    #[error("Storage error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid content document: {0}")]
    Content(String),

    #[error("Field '{field}' is required and cannot be empty")]
    Validation { field: &'static str },

    #[error("Unknown section '{0}'")]
    UnknownSection(String),

    #[error("Fiche '{fiche}' does not belong to section '{section}'")]
    UnknownFiche { section: String, fiche: String },

    #[error("Reset requires explicit confirmation (pass --yes)")]
    ResetNotConfirmed,
}

impl StudyError {
    /// Errors caused by user input, shown inline and retried.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            StudyError::Validation { .. }
                | StudyError::UnknownSection(_)
                | StudyError::UnknownFiche { .. }
                | StudyError::ResetNotConfirmed
        )
    }
}

pub type Result<T> = std::result::Result<T, StudyError>;
