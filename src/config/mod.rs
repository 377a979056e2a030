//! Run configuration. Every option has a flag; credentials can also come from the environment.

use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use derive_more::{Display, Error};

use crate::clock::{parse_timestamp, Resolution, TimeWindow};
use crate::source::signed::{DEFAULT_BASE_URL, DEFAULT_HEADER_PREFIX};
use crate::source::{Credentials, SignedClientConfig};
use crate::stats::per_period_rate;

#[derive(Debug, Display, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[display("api key and secret are required unless running with --offline")]
    MissingCredentials,
    #[display("at least one market is required")]
    NoMarkets,
}

#[derive(Parser, Debug, Clone)]
#[command(
    name = "frontier",
    version,
    about = "Samples random portfolios across perpetual futures markets and prints the weights with the best Sharpe ratio"
)]
pub struct Config {
    /// Market to allocate across. Repeat the flag or separate with commas.
    #[arg(long = "market", value_delimiter = ',', default_values = ["BTC-PERP", "ETH-PERP", "ADA-PERP"])]
    pub markets: Vec<String>,

    /// Candle width in seconds
    #[arg(long, default_value_t = 3600)]
    pub resolution: u64,

    /// Start of the window, Unix seconds or RFC 3339
    #[arg(long, default_value = "2021-10-01T00:00:00Z")]
    pub start: String,

    /// End of the window, Unix seconds or RFC 3339
    #[arg(long, default_value = "2021-10-31T23:00:00Z")]
    pub end: String,

    /// Number of random portfolios to draw
    #[arg(long, default_value_t = 5000)]
    pub samples: usize,

    /// Annual risk-free rate, converted to the candle period before use
    #[arg(long, default_value_t = 0.05)]
    pub annual_risk_free_rate: f64,

    /// Where to write the frontier plot. An empty path skips plotting.
    #[arg(long, default_value = "efficient_frontier.png")]
    pub plot: String,

    /// Skip the frontier plot
    #[arg(long)]
    pub no_plot: bool,

    /// Seed for the sampler and for generated candles
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Prefix of the KEY/SIGN/TS request headers
    #[arg(long, default_value = DEFAULT_HEADER_PREFIX)]
    pub header_prefix: String,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    #[arg(long, env = "FRONTIER_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    #[arg(long, env = "FRONTIER_API_SECRET", hide_env_values = true)]
    pub api_secret: Option<String>,

    /// Use generated candles instead of calling the exchange
    #[arg(long)]
    pub offline: bool,

    /// Print the allocation as JSON
    #[arg(long)]
    pub json: bool,
}

impl Config {
    pub fn markets(&self) -> Result<&[String]> {
        if self.markets.is_empty() {
            return Err(ConfigError::NoMarkets.into());
        }
        Ok(&self.markets)
    }

    pub fn resolution(&self) -> Result<Resolution> {
        Resolution::try_from(self.resolution)
    }

    pub fn window(&self) -> Result<TimeWindow> {
        TimeWindow::new(parse_timestamp(&self.start)?, parse_timestamp(&self.end)?)
    }

    /// Risk-free rate for a single candle period.
    pub fn risk_free_rate(&self) -> Result<f64> {
        Ok(per_period_rate(
            self.annual_risk_free_rate,
            self.resolution()?.periods_per_year(),
        ))
    }

    pub fn plot_target(&self) -> Option<&Path> {
        if self.no_plot || self.plot.is_empty() {
            None
        } else {
            Some(Path::new(&self.plot))
        }
    }

    pub fn credentials(&self) -> Result<Credentials> {
        match (&self.api_key, &self.api_secret) {
            (Some(key), Some(secret)) => Ok(Credentials::new(key, secret)),
            _ => Err(ConfigError::MissingCredentials.into()),
        }
    }

    pub fn client_config(&self) -> Result<SignedClientConfig> {
        Ok(SignedClientConfig::new(self.credentials()?)
            .with_base_url(&self.base_url)
            .with_header_prefix(&self.header_prefix)
            .with_timeout(Duration::from_secs(self.timeout_secs)))
    }
}
