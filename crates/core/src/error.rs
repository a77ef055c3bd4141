//! Error types for the vitals core.
//!
//! Each layer has its own error enum. Scoring and classification are total over validated
//! input and have no error type at all.

use crate::ids::{PatientId, RecordId};
use std::fmt;

/// A single field-scoped validation failure.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FieldError {
    /// The offending input field, using the wire name (e.g. `"oxygen_saturation"`).
    pub field: String,
    /// Human-readable reason.
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Every field that failed validation for one submission.
///
/// Never empty when returned as an error.
#[derive(Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ValidationErrors {
    pub errors: Vec<FieldError>,
}

impl ValidationErrors {
    pub fn push(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(FieldError::new(field, message));
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the names of the offending fields, in the order they were checked.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    pub fn contains(&self, field: &str) -> bool {
        self.errors.iter().any(|e| e.field == field)
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .errors
            .iter()
            .map(|e| format!("{}: {}", e.field, e.message))
            .collect();
        write!(f, "invalid measurement ({})", parts.join("; "))
    }
}

impl std::error::Error for ValidationErrors {}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("vitals store unavailable: {0}")]
    Unavailable(String),
    #[error("failed to write vitals record: {0}")]
    Write(std::io::Error),
    #[error("failed to read vitals record: {0}")]
    Read(std::io::Error),
    #[error("corrupt vitals record at {path}: {source}", path = path.display())]
    Corrupt {
        path: std::path::PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to serialize vitals record: {0}")]
    Serialization(serde_json::Error),
    #[error("record {0} already exists")]
    AlreadyExists(String),
}

pub type StoreResult<T> = std::result::Result<T, StoreError>;

#[derive(Debug, thiserror::Error)]
pub enum EvaluationError {
    #[error(transparent)]
    Validation(#[from] ValidationErrors),
    #[error("unknown patient: {0}")]
    UnknownPatient(PatientId),
    #[error("unknown vitals record: {0}")]
    UnknownRecord(RecordId),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type EvaluationResult<T> = std::result::Result<T, EvaluationError>;

/// Failure of the optional interpretation step. Never fatal to a submission.
#[derive(Debug, thiserror::Error)]
pub enum InterpretationError {
    #[error("interpretation timed out after {0:?}")]
    Timeout(std::time::Duration),
    #[error("interpretation unavailable: {0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
#[error("alert sink rejected notification: {0}")]
pub struct AlertError(pub String);

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    InvalidValue { name: &'static str, reason: String },
    #[error("data directory is not a directory: {0}")]
    DataDirNotDirectory(std::path::PathBuf),
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
