//! Application configuration
//!
//! Defaults mirror the stock demo setup (100k paper cash, two seed
//! positions, a 1.5s feed cadence). An optional YAML file overrides any
//! field; environment variables are loaded by `main` via dotenvy before the
//! CLI runs.

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use crate::market::FeedConfig;
use crate::portfolio::{Holding, LedgerConfig};

/// Top-level application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Paper money starting balance
    pub starting_cash: Decimal,
    /// Positions seeded into the ledger at startup
    pub seed_holdings: Vec<SeedHolding>,
    pub feed: FeedSettings,
    pub ledger: LedgerSettings,
}

/// One seeded position
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedHolding {
    pub symbol: String,
    pub shares: u64,
    pub avg_price: Decimal,
    pub current_price: Decimal,
}

/// Mock feed tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedSettings {
    pub tick_interval_ms: u64,
    pub update_probability: f64,
    pub upward_bias: f64,
    pub volatility: f64,
    pub price_floor: Decimal,
    /// Starting prices for well-known tickers
    pub seed_prices: BTreeMap<String, Decimal>,
}

/// Simulated backing-store latencies
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerSettings {
    pub read_latency_ms: u64,
    pub order_latency_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            starting_cash: Decimal::from(100_000),
            seed_holdings: vec![
                SeedHolding {
                    symbol: "AAPL".to_string(),
                    shares: 50,
                    avg_price: Decimal::new(15000, 2),
                    current_price: Decimal::new(17500, 2),
                },
                SeedHolding {
                    symbol: "TSLA".to_string(),
                    shares: 10,
                    avg_price: Decimal::new(22000, 2),
                    current_price: Decimal::new(20000, 2),
                },
            ],
            feed: FeedSettings::default(),
            ledger: LedgerSettings::default(),
        }
    }
}

impl Default for FeedSettings {
    fn default() -> Self {
        let defaults = FeedConfig::default();
        Self {
            tick_interval_ms: defaults.tick_interval.as_millis() as u64,
            update_probability: defaults.update_probability,
            upward_bias: defaults.upward_bias,
            volatility: defaults.volatility,
            price_floor: defaults.price_floor,
            seed_prices: defaults.seed_prices.into_iter().collect(),
        }
    }
}

impl Default for LedgerSettings {
    fn default() -> Self {
        Self {
            read_latency_ms: 500,
            order_latency_ms: 800,
        }
    }
}

impl AppConfig {
    /// Load configuration: defaults, overridden by a YAML file when present.
    /// An explicitly requested file that cannot be read is an error; the
    /// default path is allowed to be absent.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).with_context(|| {
                    format!("Failed to read config file: {}", path.display())
                })?;
                let config: AppConfig = serde_yaml::from_str(&raw)
                    .with_context(|| {
                        format!("Failed to parse config file: {}", path.display())
                    })?;
                info!(config_file = %path.display(), "Configuration loaded");
                Ok(config)
            }
            None => Ok(AppConfig::default()),
        }
    }

    /// Feed configuration derived from these settings
    pub fn feed_config(&self) -> FeedConfig {
        FeedConfig {
            tick_interval: Duration::from_millis(self.feed.tick_interval_ms),
            update_probability: self.feed.update_probability,
            upward_bias: self.feed.upward_bias,
            volatility: self.feed.volatility,
            price_floor: self.feed.price_floor,
            seed_prices: self
                .feed
                .seed_prices
                .iter()
                .map(|(s, p)| (s.clone(), *p))
                .collect(),
            ..FeedConfig::default()
        }
    }

    /// Ledger configuration derived from these settings
    pub fn ledger_config(&self) -> LedgerConfig {
        LedgerConfig {
            starting_cash: self.starting_cash,
            seed_holdings: self
                .seed_holdings
                .iter()
                .map(|h| Holding {
                    symbol: h.symbol.clone(),
                    shares: h.shares,
                    avg_price: h.avg_price,
                    current_price: h.current_price,
                })
                .collect(),
            read_latency: Duration::from_millis(self.ledger.read_latency_ms),
            order_latency: Duration::from_millis(self.ledger.order_latency_ms),
        }
    }
}
