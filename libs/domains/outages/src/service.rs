//! Fetch stage of a dispatch run: provider records in, deduplicated outages out.

use std::sync::Arc;
use tracing::{info, instrument};

use crate::error::FetchResult;
use crate::ingestion::{OutageRecord, ingest};
use crate::models::Outage;
use crate::providers::OutageProvider;

/// Service wrapping an [`OutageProvider`] with ingestion.
pub struct OutageFetchService<P: OutageProvider> {
    provider: Arc<P>,
}

impl<P: OutageProvider> OutageFetchService<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider: Arc::new(provider),
        }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Raw provider records, duplicates and malformed rows included.
    pub async fn fetch_records(&self) -> FetchResult<Vec<OutageRecord>> {
        self.provider.fetch_outages().await
    }

    /// Deduplicated, validated outages in provider order.
    #[instrument(skip(self), fields(provider = self.provider.name()))]
    pub async fn fetch(&self) -> FetchResult<Vec<Outage>> {
        let records = self.provider.fetch_outages().await?;
        let received = records.len();
        let outages = ingest(records);

        info!(received, kept = outages.len(), "Ingested outage records");
        Ok(outages)
    }
}

impl<P: OutageProvider> Clone for OutageFetchService<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::providers::MockOutageProvider;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, comment: &str) -> OutageRecord {
        OutageRecord {
            id,
            start: Utc.with_ymd_and_hms(2024, 1, 1, 8, 0, 0).unwrap().fixed_offset(),
            end: Utc.with_ymd_and_hms(2024, 1, 1, 16, 0, 0).unwrap().fixed_offset(),
            city: "Львів".to_string(),
            street_id: 1,
            street_name: "Стрийська".to_string(),
            buildings: vec!["10".to_string()],
            comment: comment.to_string(),
        }
    }

    #[tokio::test]
    async fn test_fetch_deduplicates() {
        let mut provider = MockOutageProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_fetch_outages()
            .times(1)
            .returning(|| Ok(vec![record(1, "a"), record(2, "b")]));

        let service = OutageFetchService::new(provider);
        let outages = service.fetch().await.unwrap();

        assert_eq!(outages.len(), 1);
        assert_eq!(outages[0].id, 2);
        assert_eq!(outages[0].description.as_str(), "b");
    }

    #[tokio::test]
    async fn test_fetch_propagates_provider_error() {
        let mut provider = MockOutageProvider::new();
        provider.expect_name().return_const("mock");
        provider
            .expect_fetch_outages()
            .returning(|| Err(FetchError::Status(502)));

        let service = OutageFetchService::new(provider);
        let result = service.fetch().await;

        assert!(matches!(result, Err(FetchError::Status(502))));
    }
}
