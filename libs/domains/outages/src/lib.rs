//! Outages Domain
//!
//! Value objects and decision logic for matching power outages to subscriber
//! addresses.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │ OutageProvider  │  ← LOE feed (loosely typed JSON)
//! └────────┬────────┘
//!          │ OutageRecord
//! ┌────────▼────────┐
//! │   Ingestion     │  ← validate, drop malformed, dedup (last write wins in place)
//! └────────┬────────┘
//!          │ Outage
//! ┌────────▼────────┐
//! │     Finder      │  ← first covering outage, unless already notified
//! └─────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_outages::{LoeOutageProvider, OutageFetchService};
//! use std::time::Duration;
//!
//! # async fn run() -> domain_outages::FetchResult<()> {
//! let provider = LoeOutageProvider::new("https://example.invalid/feed", Duration::from_secs(30))?;
//! let service = OutageFetchService::new(provider);
//! let outages = service.fetch().await?;
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod finder;
pub mod ingestion;
pub mod models;
pub mod providers;
pub mod service;
pub mod user;

// Re-export commonly used types
pub use error::{FetchError, FetchResult, ValidationError, ValidationResult};
pub use finder::find_outage_for_notification;
pub use ingestion::{OutageRecord, ingest};
pub use models::{Outage, OutageAddress, OutageDescription, OutageInfo, OutagePeriod, covers};
pub use providers::{Clock, FixedClock, LoeOutageProvider, OutageProvider, SystemClock};
pub use service::OutageFetchService;
pub use user::{ChatId, User, UserAddress, already_notified};
