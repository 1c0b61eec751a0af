use async_trait::async_trait;
use std::path::Path;
use tracing::debug;

use crate::error::{SubscriberError, SubscriberResult};
use crate::models::Street;

/// Read access to the city street directory.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait StreetRepository: Send + Sync {
    async fn all_streets(&self) -> SubscriberResult<Vec<Street>>;
}

/// Street directory loaded once from a CSV file with an `id,name` header.
#[derive(Debug, Clone, Default)]
pub struct CsvStreetRepository {
    streets: Vec<Street>,
}

impl CsvStreetRepository {
    pub fn open(path: impl AsRef<Path>) -> SubscriberResult<Self> {
        let path = path.as_ref();
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_path(path)
            .map_err(|e| SubscriberError::StreetDirectory(format!("{}: {e}", path.display())))?;

        let repo = Self::from_reader(reader)?;
        debug!(file = %path.display(), count = repo.streets.len(), "Loaded street directory");
        Ok(repo)
    }

    /// Parse CSV content; rows with fewer than two columns are skipped.
    pub fn from_reader<R: std::io::Read>(mut reader: csv::Reader<R>) -> SubscriberResult<Self> {
        let mut streets = Vec::new();

        for row in reader.records() {
            let row = row?;
            if row.len() < 2 {
                continue;
            }

            let raw_id = &row[0];
            let id = raw_id.trim().parse::<i64>().map_err(|e| {
                SubscriberError::StreetDirectory(format!("invalid street id {raw_id:?}: {e}"))
            })?;
            streets.push(Street::new(id, &row[1]));
        }

        Ok(Self { streets })
    }

    pub fn with_streets(streets: Vec<Street>) -> Self {
        Self { streets }
    }
}

#[async_trait]
impl StreetRepository for CsvStreetRepository {
    async fn all_streets(&self) -> SubscriberResult<Vec<Street>> {
        Ok(self.streets.clone())
    }
}
