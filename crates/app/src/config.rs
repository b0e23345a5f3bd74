//! Client configuration
//!
//! Read from command-line flags, falling back to environment variables and a `.env` file.

use std::{path::PathBuf, time::Duration};

use clap::{Args, Parser};
use rust_decimal::Decimal;

use crate::api::ApiConfig;

/// Log output format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum LogFormat {
    /// Compact, human-readable logs.
    Compact,

    /// Structured JSON logs.
    Json,
}

/// Logging settings.
#[derive(Debug, Clone, Args)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "RUST_LOG", default_value = "warn", global = true)]
    pub log_level: String,

    /// Log format (compact, json)
    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Compact, global = true)]
    pub log_format: LogFormat,
}

/// SwiftShop client configuration
#[derive(Debug, Clone, Parser)]
#[command(name = "swiftshop", about = "SwiftShop storefront client", long_about = None)]
pub struct ClientConfig {
    /// Storefront API base URL
    #[arg(
        long,
        env = "SWIFTSHOP_API_URL",
        default_value = "http://localhost:8888",
        global = true
    )]
    pub api_url: String,

    /// Request timeout in seconds
    #[arg(long, env = "SWIFTSHOP_TIMEOUT_SECS", default_value_t = 10, global = true)]
    pub timeout_secs: u64,

    /// File holding the session token and local favourites
    #[arg(
        long,
        env = "SWIFTSHOP_STORAGE",
        default_value = ".swiftshop/storage.json",
        global = true
    )]
    pub storage_path: PathBuf,

    /// Meticais per US dollar for PayPal payments
    #[arg(long, env = "SWIFTSHOP_USD_RATE", default_value = "63", global = true)]
    pub usd_rate: Decimal,

    /// Delay between support message polls, in milliseconds
    #[arg(
        long,
        env = "SWIFTSHOP_POLL_INTERVAL_MS",
        default_value_t = 3_000,
        global = true
    )]
    pub poll_interval_ms: u64,

    /// Logging output settings.
    #[command(flatten)]
    pub logging: LoggingConfig,
}

impl ClientConfig {
    /// Load configuration from environment and CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be parsed
    pub fn load() -> Result<Self, clap::Error> {
        // Load .env file if present (ignore if missing)
        _ = dotenvy::dotenv();

        Self::try_parse()
    }

    /// Settings for the REST client.
    #[must_use]
    pub fn api_config(&self) -> ApiConfig {
        ApiConfig {
            base_url: self.api_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }

    /// Delay between support message polls.
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
