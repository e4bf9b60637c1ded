use std::result::Result as StdResult;

use thiserror::Error;
use uuid::Uuid;

/// Unified error type for catalog, ledger, and storage layers.
#[derive(Error, Debug)]
pub enum TrackerError {
    #[error("Tracker not found: {0}")]
    TrackerNotFound(Uuid),
    #[error("Category not found: {0}")]
    CategoryNotFound(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Category `{name}` is still used by {trackers} tracker(s)")]
    CategoryInUse { name: String, trackers: usize },
    #[error("Persistence error: {0}")]
    Storage(String),
    #[error("Configuration error: {0}")]
    Config(String),
}

/// Coarse classification of [`TrackerError`] values for callers that only
/// care about the failure class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    NotFound,
    Validation,
    InUse,
    Storage,
    Config,
}

impl TrackerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackerError::TrackerNotFound(_) | TrackerError::CategoryNotFound(_) => {
                ErrorKind::NotFound
            }
            TrackerError::Validation(_) => ErrorKind::Validation,
            TrackerError::CategoryInUse { .. } => ErrorKind::InUse,
            TrackerError::Storage(_) => ErrorKind::Storage,
            TrackerError::Config(_) => ErrorKind::Config,
        }
    }
}

pub type Result<T> = StdResult<T, TrackerError>;

impl From<std::io::Error> for TrackerError {
    fn from(err: std::io::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for TrackerError {
    fn from(err: serde_json::Error) -> Self {
        TrackerError::Storage(err.to_string())
    }
}
