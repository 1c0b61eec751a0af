use domain_outages::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by subscriber storage and subscription services.
#[derive(Debug, Error)]
pub enum SubscriberError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to serialize subscriber record: {0}")]
    Serialization(String),

    #[error("Invalid subscriber record {path}: {reason}")]
    InvalidRecord { path: PathBuf, reason: String },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Street directory error: {0}")]
    StreetDirectory(String),
}

pub type SubscriberResult<T> = Result<T, SubscriberError>;

impl SubscriberError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SubscriberError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn invalid(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        SubscriberError::InvalidRecord {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

impl From<serde_yaml_ng::Error> for SubscriberError {
    fn from(err: serde_yaml_ng::Error) -> Self {
        SubscriberError::Serialization(err.to_string())
    }
}

impl From<csv::Error> for SubscriberError {
    fn from(err: csv::Error) -> Self {
        SubscriberError::StreetDirectory(err.to_string())
    }
}
