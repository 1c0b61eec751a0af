//! Error types for the notifications domain.

use domain_outages::ChatId;
use domain_subscribers::SubscriberError;
use thiserror::Error;

/// Result type for notification operations.
pub type NotificationResult<T> = Result<T, NotificationError>;

/// How a failed delivery affects the subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryFailure {
    /// The recipient blocked the bot or is gone; the subscription is removed.
    Blocked,
    /// Anything else; the subscriber is kept and retried next run.
    Transient,
}

/// A single message could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Failed to notify chat {chat_id} (code {code:?}): {message}")]
pub struct SendError {
    pub chat_id: ChatId,
    /// Transport status code; `None` when no response was received.
    pub code: Option<i64>,
    pub message: String,
}

impl SendError {
    pub fn new(chat_id: ChatId, code: Option<i64>, message: impl Into<String>) -> Self {
        Self {
            chat_id,
            code,
            message: message.into(),
        }
    }

    /// Code 403, or a message mentioning "forbidden" in any case, means blocked.
    pub fn failure(&self) -> DeliveryFailure {
        if self.code == Some(403) || self.message.to_lowercase().contains("forbidden") {
            DeliveryFailure::Blocked
        } else {
            DeliveryFailure::Transient
        }
    }

    pub fn is_blocked(&self) -> bool {
        self.failure() == DeliveryFailure::Blocked
    }
}

/// Errors that abort a notification operation as a whole.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// Subscribers could not be listed.
    #[error("Subscriber repository error: {0}")]
    Repository(#[from] SubscriberError),

    /// The messaging provider failed outside of a single delivery.
    #[error("Notification provider error: {0}")]
    Provider(String),

    /// A message template failed to register or render.
    #[error("Template rendering error: {0}")]
    Template(String),
}

impl From<handlebars::RenderError> for NotificationError {
    fn from(err: handlebars::RenderError) -> Self {
        NotificationError::Template(err.to_string())
    }
}

impl From<reqwest::Error> for NotificationError {
    fn from(err: reqwest::Error) -> Self {
        NotificationError::Provider(err.to_string())
    }
}
