use async_trait::async_trait;
use domain_outages::{ChatId, User};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::error::SubscriberResult;

/// Repository trait for subscriber persistence
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// All subscribers in a stable order. Unreadable entries are skipped.
    async fn find_all(&self) -> SubscriberResult<Vec<User>>;

    /// Get a subscriber by chat id
    async fn find(&self, id: ChatId) -> SubscriberResult<Option<User>>;

    /// Insert or replace a subscriber
    async fn save(&self, user: &User) -> SubscriberResult<()>;

    /// Delete a subscriber; `false` when there was nothing to delete
    async fn remove(&self, id: ChatId) -> SubscriberResult<bool>;
}

/// In-memory implementation of UserRepository (for development/testing)
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<BTreeMap<ChatId, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Repository pre-populated with `users`.
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let users = users.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn find_all(&self) -> SubscriberResult<Vec<User>> {
        let users = self.users.read().await;
        Ok(users.values().cloned().collect())
    }

    async fn find(&self, id: ChatId) -> SubscriberResult<Option<User>> {
        let users = self.users.read().await;
        Ok(users.get(&id).cloned())
    }

    async fn save(&self, user: &User) -> SubscriberResult<()> {
        let mut users = self.users.write().await;
        users.insert(user.id, user.clone());

        tracing::debug!(chat_id = user.id, "Saved subscriber");
        Ok(())
    }

    async fn remove(&self, id: ChatId) -> SubscriberResult<bool> {
        let mut users = self.users.write().await;
        Ok(users.remove(&id).is_some())
    }
}
