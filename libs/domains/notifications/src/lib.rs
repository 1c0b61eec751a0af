//! Notifications Domain
//!
//! Delivers outage notifications to subscribers and keeps their stored
//! state in step with what was actually delivered.
//!
//! # Features
//!
//! - First-match outage selection per subscriber
//! - Idempotent dispatch: a repeated outage is never sent twice
//! - Automatic unsubscription when a recipient blocks the bot
//! - Telegram Bot API sender (HTML messages)
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────┐
//! │ NotificationService │  ← dispatch(&[Outage]) -> DispatchReport
//! └──────┬───────┬──────┘
//!        │       │
//! ┌──────▼─────┐ │ ┌────────────────┐
//! │  Sender    │ └─► UserRepository │  ← save / remove per outcome
//! │ (Telegram) │   └────────────────┘
//! └────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_notifications::{NotificationService, providers::TelegramSender};
//! use domain_subscribers::FileUserRepository;
//!
//! # async fn run(outages: Vec<domain_outages::Outage>) -> Result<(), Box<dyn std::error::Error>> {
//! let sender = TelegramSender::new("123:token", "https://api.telegram.org")?;
//! let repository = FileUserRepository::open("data/users").await?;
//! let service = NotificationService::new(sender, repository);
//!
//! let report = service.dispatch(&outages).await?;
//! println!("notified {}", report.notified);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod models;
pub mod providers;
pub mod service;
pub mod templates;

pub use error::{DeliveryFailure, NotificationError, NotificationResult, SendError};
pub use models::{ChatInfo, DispatchReport, OutageNotification};
pub use providers::{ChatDirectory, NotificationSender, TelegramSender};
pub use service::NotificationService;
pub use templates::TemplateEngine;
