//! Dispatch orchestrator: one reconciliation pass per fetch cycle.

use domain_outages::{Outage, User, find_outage_for_notification};
use domain_subscribers::UserRepository;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::error::{DeliveryFailure, NotificationResult, SendError};
use crate::models::{DispatchReport, OutageNotification};
use crate::providers::NotificationSender;

/// Sends each subscriber at most one outage per run and reconciles their
/// stored state with the delivery outcome.
pub struct NotificationService<S: NotificationSender, R: UserRepository> {
    sender: Arc<S>,
    repository: Arc<R>,
}

impl<S: NotificationSender, R: UserRepository> Clone for NotificationService<S, R> {
    fn clone(&self) -> Self {
        Self {
            sender: Arc::clone(&self.sender),
            repository: Arc::clone(&self.repository),
        }
    }
}

impl<S: NotificationSender, R: UserRepository> NotificationService<S, R> {
    pub fn new(sender: S, repository: R) -> Self {
        Self::with_shared(Arc::new(sender), Arc::new(repository))
    }

    /// Build on a sender and repository that other services also hold.
    pub fn with_shared(sender: Arc<S>, repository: Arc<R>) -> Self {
        Self { sender, repository }
    }

    /// Run one pass over all subscribers against `outages`.
    ///
    /// Subscribers are processed sequentially. Per-subscriber failures are
    /// logged and counted; only a failure to list subscribers is returned.
    #[instrument(skip_all, fields(outages = outages.len(), provider = self.sender.name()))]
    pub async fn dispatch(&self, outages: &[Outage]) -> NotificationResult<DispatchReport> {
        let users = self.repository.find_all().await?;
        let mut report = DispatchReport::default();

        for user in users {
            let Some(outage) = find_outage_for_notification(&user, outages) else {
                report.skipped += 1;
                continue;
            };

            let notification = OutageNotification::new(user.id, outage);
            match self.sender.send(&notification).await {
                Ok(()) => {
                    report.notified += 1;
                    self.mark_notified(&user, outage, &mut report).await;
                }
                Err(e) => self.handle_failure(&user, e, &mut report).await,
            }
        }

        info!(
            notified = report.notified,
            blocked_removed = report.blocked_removed,
            transient_failures = report.transient_failures,
            persistence_failures = report.persistence_failures,
            skipped = report.skipped,
            "Dispatch pass complete"
        );
        Ok(report)
    }

    async fn mark_notified(&self, user: &User, outage: &Outage, report: &mut DispatchReport) {
        let updated = user.with_notified_outage(outage);
        match self.repository.save(&updated).await {
            Ok(()) => debug!(chat_id = user.id, outage_id = outage.id, "Subscriber notified"),
            Err(e) => {
                report.persistence_failures += 1;
                warn!(chat_id = user.id, error = %e, "Failed to save notified subscriber");
            }
        }
    }

    async fn handle_failure(&self, user: &User, error: SendError, report: &mut DispatchReport) {
        match error.failure() {
            DeliveryFailure::Blocked => match self.repository.remove(user.id).await {
                Ok(_) => {
                    report.blocked_removed += 1;
                    info!(chat_id = user.id, error = %error.message, "Removed subscriber who blocked the bot");
                }
                Err(e) => {
                    report.persistence_failures += 1;
                    warn!(chat_id = user.id, error = %e, "Failed to remove blocked subscriber");
                }
            },
            DeliveryFailure::Transient => {
                report.transient_failures += 1;
                warn!(
                    chat_id = user.id,
                    code = ?error.code,
                    error = %error.message,
                    "Notification failed, will retry next run"
                );
            }
        }
    }
}
