//! Messaging provider implementations.
//!
//! This module contains the `NotificationSender` port used by dispatch and
//! the `ChatDirectory` port used by admin tooling.

mod telegram;

pub use telegram::TelegramSender;

use crate::error::{NotificationResult, SendError};
use crate::models::{ChatInfo, OutageNotification};
use async_trait::async_trait;
use domain_outages::ChatId;

/// Delivers one notification to one chat.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn send(&self, notification: &OutageNotification) -> Result<(), SendError>;

    /// Get the provider name for logging.
    fn name(&self) -> &'static str;
}

/// Looks up public chat details.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatDirectory: Send + Sync {
    async fn chat_info(&self, chat_id: ChatId) -> NotificationResult<ChatInfo>;
}
