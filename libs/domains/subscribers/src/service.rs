//! Subscription use cases behind the bot conversation.

use domain_outages::{ChatId, User, UserAddress, ValidationError};
use std::cmp::Ordering;
use std::sync::Arc;
use tracing::{info, warn};

use crate::error::SubscriberResult;
use crate::models::Street;
use crate::repository::UserRepository;
use crate::streets::StreetRepository;

/// Reply used whenever storage fails underneath a bot command.
pub const GENERIC_ERROR_MESSAGE: &str = "Сталася помилка. Спробуйте пізніше.";

const NO_SUBSCRIPTION_MESSAGE: &str = "Ви не маєте активної підписки.";
const ASK_STREET_MESSAGE: &str = "Будь ласка, введіть назву вулиці:";

/// Result of [`SubscriptionService::save`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    Subscribed { street_name: String, building: String },
    Rejected(ValidationError),
    Failed,
}

impl SaveOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, SaveOutcome::Subscribed { .. })
    }

    pub fn message(&self) -> String {
        match self {
            SaveOutcome::Subscribed {
                street_name,
                building,
            } => format!(
                "Ви підписалися на сповіщення про відключення електроенергії для вулиці {street_name}, будинок {building}."
            ),
            SaveOutcome::Rejected(e) => e.user_message().to_string(),
            SaveOutcome::Failed => GENERIC_ERROR_MESSAGE.to_string(),
        }
    }
}

/// Result of [`SubscriptionService::unsubscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnsubscribeOutcome {
    Removed,
    NotSubscribed,
}

impl UnsubscribeOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            UnsubscribeOutcome::Removed => {
                "Ви успішно відписалися від сповіщень про відключення електроенергії."
            }
            UnsubscribeOutcome::NotSubscribed => NO_SUBSCRIPTION_MESSAGE,
        }
    }
}

/// Service layer for subscribe / show / unsubscribe
pub struct SubscriptionService<R: UserRepository> {
    repository: Arc<R>,
}

impl<R: UserRepository> Clone for SubscriptionService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<R: UserRepository> SubscriptionService<R> {
    pub fn new(repository: R) -> Self {
        Self::with_shared(Arc::new(repository))
    }

    /// Build on a repository that other services also hold.
    pub fn with_shared(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Subscribe (or resubscribe) a chat. Any stored notification marker is reset.
    pub async fn save(
        &self,
        chat_id: ChatId,
        street_id: i64,
        street_name: &str,
        building: &str,
    ) -> SaveOutcome {
        let address = match UserAddress::new(street_id, street_name, building) {
            Ok(address) => address,
            Err(e) => {
                info!(chat_id, error = %e, "Rejected subscription input");
                return SaveOutcome::Rejected(e);
            }
        };

        if let Err(e) = self.repository.save(&User::new(chat_id, address)).await {
            warn!(chat_id, error = %e, "Failed to save subscription");
            return SaveOutcome::Failed;
        }

        info!(chat_id, street_id, building, "Subscription saved");
        SaveOutcome::Subscribed {
            street_name: street_name.to_string(),
            building: building.to_string(),
        }
    }

    /// Current subscription followed by a prompt to change it.
    ///
    /// Storage errors are treated as "no subscription".
    pub async fn show(&self, chat_id: ChatId) -> String {
        match self.repository.find(chat_id).await {
            Ok(Some(user)) => format!(
                "{}\n\nБудь ласка, введіть нову назву вулиці для оновлення підписки:",
                describe(&user)
            ),
            Ok(None) => ASK_STREET_MESSAGE.to_string(),
            Err(e) => {
                warn!(chat_id, error = %e, "Failed to load subscription");
                ASK_STREET_MESSAGE.to_string()
            }
        }
    }

    /// Current subscription without the prompt; errors are returned.
    pub async fn show_current(&self, chat_id: ChatId) -> SubscriberResult<String> {
        Ok(match self.repository.find(chat_id).await? {
            Some(user) => describe(&user),
            None => NO_SUBSCRIPTION_MESSAGE.to_string(),
        })
    }

    pub async fn unsubscribe(&self, chat_id: ChatId) -> SubscriberResult<UnsubscribeOutcome> {
        let removed = self.repository.remove(chat_id).await?;
        if removed {
            info!(chat_id, "Subscription removed");
            Ok(UnsubscribeOutcome::Removed)
        } else {
            Ok(UnsubscribeOutcome::NotSubscribed)
        }
    }

    /// All subscribers, most recently notified outage first; never notified last.
    pub async fn list_by_last_notified(&self) -> SubscriberResult<Vec<User>> {
        let mut users = self.repository.find_all().await?;
        users.sort_by(by_last_notified);
        Ok(users)
    }
}

fn describe(user: &User) -> String {
    format!(
        "Ваша поточна підписка:\nВулиця: {}\nБудинок: {}",
        user.address.street_name(),
        user.address.building()
    )
}

fn by_last_notified(a: &User, b: &User) -> Ordering {
    let start = |u: &User| u.outage_info.as_ref().map(|i| i.period.start());
    match (start(a), start(b)) {
        (Some(a), Some(b)) => b.cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Outcome of a street lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreetSearchResult {
    EmptyQuery,
    NotFound,
    Selected(Street),
    Options(Vec<Street>),
}

impl StreetSearchResult {
    pub fn message(&self) -> String {
        match self {
            StreetSearchResult::EmptyQuery => "Введіть назву вулиці.".to_string(),
            StreetSearchResult::NotFound => "Вулицю не знайдено. Спробуйте ще раз.".to_string(),
            StreetSearchResult::Selected(street) => format!(
                "Ви обрали вулицю: {}\nБудь ласка, введіть номер будинку:",
                street.name
            ),
            StreetSearchResult::Options(_) => "Будь ласка, оберіть вулицю:".to_string(),
        }
    }
}

/// Case-insensitive street lookup over the directory.
pub struct StreetSearch<S: StreetRepository> {
    streets: Arc<S>,
}

impl<S: StreetRepository> StreetSearch<S> {
    pub fn new(streets: S) -> Self {
        Self {
            streets: Arc::new(streets),
        }
    }

    /// An exact name match wins immediately; otherwise substring matches
    /// are returned as a single selection or a list of options.
    pub async fn search(&self, query: &str) -> SubscriberResult<StreetSearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(StreetSearchResult::EmptyQuery);
        }

        let query = query.to_lowercase();
        let mut matches = Vec::new();
        for street in self.streets.all_streets().await? {
            if street.name_equals(&query) {
                return Ok(StreetSearchResult::Selected(street));
            }
            if street.name_contains(&query) {
                matches.push(street);
            }
        }

        Ok(match matches.len() {
            0 => StreetSearchResult::NotFound,
            1 => StreetSearchResult::Selected(matches.remove(0)),
            _ => StreetSearchResult::Options(matches),
        })
    }
}
