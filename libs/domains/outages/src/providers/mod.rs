//! Outage feed providers
//!
//! This module contains the `OutageProvider` port and the implementation for
//! the Lviv regional power company feed.

pub mod loe;

use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, Utc};

use crate::error::FetchResult;
use crate::ingestion::OutageRecord;

pub use loe::LoeOutageProvider;

/// Trait for outage feed providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OutageProvider: Send + Sync {
    /// Fetch the current list of outage records.
    ///
    /// Rows the provider cannot normalize are skipped; an unreachable or
    /// unparsable feed is an error.
    async fn fetch_outages(&self) -> FetchResult<Vec<OutageRecord>>;

    /// Provider name for logging
    fn name(&self) -> &'static str;
}

/// Source of "now", used when the feed omits a timestamp.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in UTC.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Utc::now().fixed_offset()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<FixedOffset>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}
