//! Error types for the outages domain.

use chrono::{DateTime, FixedOffset};
use thiserror::Error;

/// Result type for value-object construction.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Result type for outage feed operations.
pub type FetchResult<T> = Result<T, FetchError>;

/// Malformed address or period rejected at construction time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Street ID must be positive, got {0}")]
    InvalidStreetId(i64),

    #[error("Street name cannot be empty")]
    EmptyStreetName,

    #[error("Buildings must be a non-empty list of non-blank names")]
    EmptyBuildings,

    #[error("Building number cannot be empty")]
    EmptyBuilding,

    #[error("Invalid building number format: '{0}'")]
    InvalidBuildingFormat(String),

    #[error("Outage start {start} is after its end {end}")]
    InvalidPeriod {
        start: DateTime<FixedOffset>,
        end: DateTime<FixedOffset>,
    },
}

impl ValidationError {
    /// Text shown to a subscriber when their input is rejected.
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::InvalidStreetId(_) => "Невірний ідентифікатор вулиці",
            ValidationError::EmptyStreetName => "Назва вулиці не може бути порожньою",
            ValidationError::EmptyBuilding => "Невірний формат номера будинку",
            ValidationError::InvalidBuildingFormat(_) => {
                "Невірний формат номера будинку. Приклад: 13 або 13-А"
            }
            ValidationError::EmptyBuildings | ValidationError::InvalidPeriod { .. } => {
                "Некоректні дані про відключення"
            }
        }
    }
}

/// The outage feed could not be reached or decoded. Fatal to a dispatch run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Outage feed request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Outage feed returned HTTP status {0}")]
    Status(u16),

    #[error("Failed to parse outage feed: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for FetchError {
    fn from(err: serde_json::Error) -> Self {
        FetchError::Parse(err.to_string())
    }
}
