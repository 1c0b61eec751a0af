//! Fetch-and-dispatch cycles: once, on an interval, or on a cron schedule.

use domain_notifications::{DispatchReport, NotificationSender, NotificationService};
use domain_outages::{OutageFetchService, OutageProvider};
use domain_subscribers::UserRepository;
use eyre::{Result, WrapErr};
use observability::NotifierMetrics;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::{Mutex, watch};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{error, info, warn};

/// One notifier pipeline. Cycles never overlap.
pub struct Notifier<P, S, R>
where
    P: OutageProvider,
    S: NotificationSender,
    R: UserRepository,
{
    fetch: OutageFetchService<P>,
    dispatch: NotificationService<S, R>,
    cycle_lock: Arc<Mutex<()>>,
}

impl<P, S, R> Clone for Notifier<P, S, R>
where
    P: OutageProvider,
    S: NotificationSender,
    R: UserRepository,
{
    fn clone(&self) -> Self {
        Self {
            fetch: self.fetch.clone(),
            dispatch: self.dispatch.clone(),
            cycle_lock: Arc::clone(&self.cycle_lock),
        }
    }
}

impl<P, S, R> Notifier<P, S, R>
where
    P: OutageProvider + 'static,
    S: NotificationSender + 'static,
    R: UserRepository + 'static,
{
    pub fn new(fetch: OutageFetchService<P>, dispatch: NotificationService<S, R>) -> Self {
        Self {
            fetch,
            dispatch,
            cycle_lock: Arc::new(Mutex::new(())),
        }
    }

    /// Fetch outages and dispatch them. A fetch failure aborts the cycle.
    pub async fn run_cycle(&self) -> Result<DispatchReport> {
        let _guard = self.cycle_lock.lock().await;
        self.cycle().await
    }

    /// Like [`Self::run_cycle`], but returns `None` when a cycle is already running.
    pub async fn try_run_cycle(&self) -> Option<Result<DispatchReport>> {
        let _guard = self.cycle_lock.try_lock().ok()?;
        Some(self.cycle().await)
    }

    async fn cycle(&self) -> Result<DispatchReport> {
        let started = Instant::now();
        let result = self.fetch_and_dispatch().await;
        NotifierMetrics::record_cycle(started.elapsed(), result.is_ok());
        result
    }

    async fn fetch_and_dispatch(&self) -> Result<DispatchReport> {
        let outages = self
            .fetch
            .fetch()
            .await
            .wrap_err("Failed to fetch outages")?;
        NotifierMetrics::record_outages_fetched(outages.len());

        let report = self
            .dispatch
            .dispatch(&outages)
            .await
            .wrap_err("Failed to dispatch notifications")?;
        NotifierMetrics::record_dispatch(
            report.notified,
            report.blocked_removed,
            report.transient_failures,
            report.persistence_failures,
        );

        Ok(report)
    }

    /// Run cycles back to back with `interval` between them until Ctrl-C.
    ///
    /// A cycle in progress is allowed to finish; errors are logged, not fatal.
    pub async fn run_every(&self, interval: Duration) -> Result<()> {
        info!(interval = %humantime::format_duration(interval), "Starting notifier loop");
        let mut shutdown = shutdown_signal();

        loop {
            log_cycle(self.run_cycle().await);

            tokio::select! {
                _ = tokio::time::sleep(interval) => {}
                _ = shutdown.changed() => {}
            }
            if *shutdown.borrow() {
                info!("Shutdown requested, stopping notifier loop");
                return Ok(());
            }
        }
    }

    /// Run cycles on a cron schedule until Ctrl-C. Overlapping ticks are skipped.
    pub async fn run_scheduled(&self, cron_expr: &str) -> Result<()> {
        info!(cron = cron_expr, "Starting scheduled notifier");

        let mut sched = JobScheduler::new().await?;

        let notifier = self.clone();
        let job = Job::new_async(cron_expr, move |_uuid, _l| {
            let notifier = notifier.clone();

            Box::pin(async move {
                match notifier.try_run_cycle().await {
                    Some(result) => log_cycle(result),
                    None => warn!("Previous cycle still running, skipping this tick"),
                }
            })
        })
        .wrap_err_with(|| format!("Invalid cron expression '{cron_expr}'"))?;

        sched.add(job).await?;
        sched.start().await?;

        info!("Scheduler started, waiting for jobs...");
        let mut shutdown = shutdown_signal();
        while !*shutdown.borrow() {
            if shutdown.changed().await.is_err() {
                break;
            }
        }

        info!("Shutdown requested, stopping scheduler");
        let _guard = self.cycle_lock.lock().await;
        sched.shutdown().await?;
        Ok(())
    }
}

fn log_cycle(result: Result<DispatchReport>) {
    match result {
        Ok(report) => info!(
            notified = report.notified,
            blocked_removed = report.blocked_removed,
            transient_failures = report.transient_failures,
            "Notifier cycle complete"
        ),
        Err(e) => error!(error = ?e, "Notifier cycle failed"),
    }
}

/// Flips to `true` on Ctrl-C. The handler is installed immediately, so a
/// signal during a cycle is observed once the cycle ends.
fn shutdown_signal() -> watch::Receiver<bool> {
    let (tx, rx) = watch::channel(false);
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                let _ = tx.send(true);
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for Ctrl-C");
                // Keep the sender alive so receivers do not see a closed channel.
                std::future::pending::<()>().await;
            }
        }
    });
    rx
}
