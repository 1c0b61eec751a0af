//! Configuration for the outage notifier

use core_config::{Environment, FromEnv, OutageFeedConfig, StorageConfig};
use eyre::{Result, WrapErr};
use std::net::SocketAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub storage: StorageConfig,
    pub outage_feed: OutageFeedConfig,
    /// Prometheus scrape endpoint; metrics are only recorded in-process when unset
    pub metrics_addr: Option<SocketAddr>,
}

impl Config {
    /// Load configuration from environment variables
    ///
    /// The Telegram token is loaded separately by the commands that need it.
    pub fn from_env() -> Result<Self> {
        let metrics_addr = match std::env::var("METRICS_ADDR") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                raw.trim()
                    .parse()
                    .wrap_err_with(|| format!("Invalid METRICS_ADDR '{raw}'"))?,
            ),
            _ => None,
        };

        Ok(Config {
            environment: Environment::from_env(),
            storage: StorageConfig::from_env()?,
            outage_feed: OutageFeedConfig::from_env()?,
            metrics_addr,
        })
    }
}
