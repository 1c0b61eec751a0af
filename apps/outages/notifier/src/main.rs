//! Outage Notifier
//!
//! Fetches the current power outages for Lviv and notifies subscribed
//! Telegram chats about outages at their address. Runs once, in a loop,
//! or on a cron schedule, and carries a few operator commands.

use clap::{Parser, Subcommand};
use core_config::tracing::{init_tracing, install_color_eyre};
use core_config::{FromEnv, TelegramConfig};
use domain_notifications::{NotificationService, TelegramSender};
use domain_outages::{LoeOutageProvider, OutageFetchService};
use domain_subscribers::{
    CsvStreetRepository, FileUserRepository, StreetSearch, StreetSearchResult, SubscriptionService,
};
use eyre::{Result, bail};
use std::time::Duration;
use tracing::info;

mod admin;
mod config;
mod runner;

use config::Config;
use runner::Notifier;

#[derive(Parser)]
#[command(name = "outages-notifier")]
#[command(about = "Notify Telegram subscribers about power outages at their address")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Fetch outages and notify affected subscribers
    Notify {
        /// Repeat with this pause between cycles (e.g. "5m"). Runs once when omitted.
        #[arg(short, long, value_parser = humantime::parse_duration)]
        interval: Option<Duration>,
    },

    /// Run notification cycles on a cron schedule
    Schedule {
        /// Cron expression with seconds (default: every 10 minutes)
        #[arg(short, long, default_value = "0 */10 * * * *")]
        cron: String,
    },

    /// Print the current deduplicated outages
    Outages,

    /// Print subscribers with their Telegram profile
    Users,

    /// Look up streets in the directory
    Streets {
        /// Street name or part of it
        query: String,
    },

    /// Subscribe a chat to an address
    Subscribe {
        #[arg(long, allow_hyphen_values = true)]
        chat_id: i64,

        /// Street name; must resolve to a single street
        #[arg(long)]
        street: String,

        #[arg(long)]
        building: String,
    },

    /// Remove a chat's subscription
    Unsubscribe {
        #[arg(long, allow_hyphen_values = true)]
        chat_id: i64,
    },

    /// Show a chat's subscription
    Show {
        #[arg(long, allow_hyphen_values = true)]
        chat_id: i64,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    install_color_eyre();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    init_tracing(&config.environment);

    match cli.command {
        Commands::Notify { interval } => {
            let notifier = build_notifier(&config).await?;
            match interval {
                Some(interval) => notifier.run_every(interval).await?,
                None => {
                    let report = notifier.run_cycle().await?;
                    info!(notified = report.notified, "Successfully dispatched outages");
                }
            }
        }

        Commands::Schedule { cron } => {
            let notifier = build_notifier(&config).await?;
            notifier.run_scheduled(&cron).await?;
        }

        Commands::Outages => {
            let fetch = outage_fetch_service(&config)?;
            let outages = fetch.fetch().await?;
            println!("{}", admin::render_outages(&outages));
        }

        Commands::Users => {
            let sender = telegram_sender()?;
            let subscriptions = SubscriptionService::new(open_users(&config).await?);
            let users = subscriptions.list_by_last_notified().await?;
            println!("{}", admin::render_users(&users, &sender).await);
        }

        Commands::Streets { query } => {
            let search = StreetSearch::new(CsvStreetRepository::open(config.storage.streets_file())?);
            let result = search.search(&query).await?;
            println!("{}", result.message());
            if let StreetSearchResult::Options(streets) = result {
                for street in streets {
                    println!("{}\t{}", street.id, street.name);
                }
            }
        }

        Commands::Subscribe {
            chat_id,
            street,
            building,
        } => {
            let search = StreetSearch::new(CsvStreetRepository::open(config.storage.streets_file())?);
            let street = match search.search(&street).await? {
                StreetSearchResult::Selected(street) => street,
                other => bail!("{}", other.message()),
            };

            let subscriptions = SubscriptionService::new(open_users(&config).await?);
            let outcome = subscriptions
                .save(chat_id, street.id, &street.name, &building)
                .await;
            if !outcome.is_success() {
                bail!("{}", outcome.message());
            }
            println!("{}", outcome.message());
        }

        Commands::Unsubscribe { chat_id } => {
            let subscriptions = SubscriptionService::new(open_users(&config).await?);
            println!("{}", subscriptions.unsubscribe(chat_id).await?.message());
        }

        Commands::Show { chat_id } => {
            let subscriptions = SubscriptionService::new(open_users(&config).await?);
            println!("{}", subscriptions.show_current(chat_id).await?);
        }
    }

    Ok(())
}

type TelegramNotifier = Notifier<LoeOutageProvider, TelegramSender, FileUserRepository>;

async fn build_notifier(config: &Config) -> Result<TelegramNotifier> {
    observability::init_metrics(config.metrics_addr)?;

    let fetch = outage_fetch_service(config)?;
    let dispatch = NotificationService::new(telegram_sender()?, open_users(config).await?);
    Ok(Notifier::new(fetch, dispatch))
}

fn outage_fetch_service(config: &Config) -> Result<OutageFetchService<LoeOutageProvider>> {
    let provider = LoeOutageProvider::new(&config.outage_feed.url, config.outage_feed.timeout)?;
    Ok(OutageFetchService::new(provider))
}

fn telegram_sender() -> Result<TelegramSender> {
    let telegram = TelegramConfig::from_env()?;
    Ok(TelegramSender::new(telegram.token, telegram.api_url)?)
}

async fn open_users(config: &Config) -> Result<FileUserRepository> {
    let users_dir = config.storage.users_dir();
    info!(dir = %users_dir.display(), "Opening subscriber store");
    Ok(FileUserRepository::open(users_dir).await?)
}
