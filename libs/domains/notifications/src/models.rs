//! Notification payloads and recipient details.

use chrono::{DateTime, FixedOffset};
use domain_outages::{ChatId, Outage};

/// Everything a sender needs to tell one subscriber about one outage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutageNotification {
    pub chat_id: ChatId,
    pub city: Option<String>,
    pub street_name: String,
    pub buildings: Vec<String>,
    pub start: DateTime<FixedOffset>,
    pub end: DateTime<FixedOffset>,
    pub comment: String,
}

impl OutageNotification {
    pub fn new(chat_id: ChatId, outage: &Outage) -> Self {
        Self {
            chat_id,
            city: outage.address.city().map(str::to_string),
            street_name: outage.address.street_name().to_string(),
            buildings: outage.address.buildings().to_vec(),
            start: outage.period.start(),
            end: outage.period.end(),
            comment: outage.description.as_str().to_string(),
        }
    }
}

/// Public profile of a chat as reported by the messenger.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChatInfo {
    pub chat_id: ChatId,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Counts from one dispatch run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    /// Subscribers successfully notified.
    pub notified: usize,
    /// Subscribers removed because they blocked the bot.
    pub blocked_removed: usize,
    /// Deliveries that failed and will be retried next run.
    pub transient_failures: usize,
    /// Saves or removals that failed after a delivery attempt.
    pub persistence_failures: usize,
    /// Subscribers with nothing to send.
    pub skipped: usize,
}
