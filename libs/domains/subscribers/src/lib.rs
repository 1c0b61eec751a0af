//! Subscribers Domain
//!
//! Persistence for subscribers and the street directory, plus the
//! subscription use cases the bot front-end drives.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────┐
//! │ SubscriptionService      │  ← save / show / unsubscribe
//! │ StreetSearch             │  ← street lookup by name
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │ UserRepository           │  ← InMemory / File (YAML per chat)
//! │ StreetRepository         │  ← CSV directory
//! └────────────┬─────────────┘
//!              │
//! ┌────────────▼─────────────┐
//! │ domain_outages::User     │
//! └──────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_subscribers::{FileUserRepository, SubscriptionService};
//!
//! # async fn run() -> domain_subscribers::SubscriberResult<()> {
//! let repository = FileUserRepository::open("data/users").await?;
//! let service = SubscriptionService::new(repository);
//!
//! let outcome = service.save(12345, 1, "Стрийська", "10-А").await;
//! println!("{}", outcome.message());
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod file_repository;
pub mod models;
pub mod repository;
pub mod service;
pub mod streets;

pub use error::{SubscriberError, SubscriberResult};
pub use file_repository::FileUserRepository;
pub use models::{Street, UserRecord};
pub use repository::{InMemoryUserRepository, UserRepository};
pub use service::{
    GENERIC_ERROR_MESSAGE, SaveOutcome, StreetSearch, StreetSearchResult, SubscriptionService,
    UnsubscribeOutcome,
};
pub use streets::{CsvStreetRepository, StreetRepository};

#[cfg(any(test, feature = "mock"))]
pub use repository::MockUserRepository;
#[cfg(any(test, feature = "mock"))]
pub use streets::MockStreetRepository;
