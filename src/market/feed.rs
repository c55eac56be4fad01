//! Mock real-time market data feed
//!
//! Generates a bounded random walk for a dynamic set of watched symbols on a
//! fixed cadence, without any external data source. Prices move by at most a
//! small fraction per tick, carry a slight upward bias, and are clamped to a
//! strictly positive floor. Not every watched symbol moves on every tick,
//! mimicking the sparse updates of a throttled live feed.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::market::PriceBatch;

/// Configuration for the mock feed
#[derive(Debug, Clone)]
pub struct FeedConfig {
    /// Tick cadence
    pub tick_interval: Duration,
    /// Chance that a given watched symbol moves on a given tick
    pub update_probability: f64,
    /// Chance that a moving symbol moves up rather than down
    pub upward_bias: f64,
    /// Maximum per-tick move as a fraction of current price
    pub volatility: f64,
    /// Prices never fall below this
    pub price_floor: Decimal,
    /// Prices seeded at construction for well-known tickers
    pub seed_prices: Vec<(String, Decimal)>,
    /// Buffer size for the batch broadcast channel
    pub batch_buffer_size: usize,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(1500),
            update_probability: 0.5,
            upward_bias: 0.52,
            volatility: 0.0015,
            price_floor: Decimal::new(1, 2), // 0.01
            seed_prices: default_seed_prices(),
            batch_buffer_size: 1000,
        }
    }
}

/// Realistic starting prices for common tickers
fn default_seed_prices() -> Vec<(String, Decimal)> {
    vec![
        ("AAPL".to_string(), Decimal::new(17500, 2)),
        ("TSLA".to_string(), Decimal::new(20000, 2)),
        ("NVDA".to_string(), Decimal::new(85000, 2)),
        ("AMD".to_string(), Decimal::new(16000, 2)),
        ("MSFT".to_string(), Decimal::new(41000, 2)),
        ("GOOGL".to_string(), Decimal::new(17000, 2)),
    ]
}

/// Mock market data feed with a connect/disconnect lifecycle
///
/// All price state lives behind sync locks; the tick body never awaits while
/// holding one, so a tick and a concurrent reader cannot observe a
/// half-applied batch.
pub struct MockMarketFeed {
    config: FeedConfig,
    prices: RwLock<HashMap<String, Decimal>>,
    watched: RwLock<HashSet<String>>,
    market_open: AtomicBool,
    rng: Mutex<StdRng>,
    batch_tx: broadcast::Sender<PriceBatch>,
    tick_task: Mutex<Option<JoinHandle<()>>>,
}

impl MockMarketFeed {
    /// Create a feed with an OS-seeded random source
    pub fn new(config: FeedConfig) -> Arc<Self> {
        Self::with_rng(config, StdRng::from_os_rng())
    }

    /// Create a feed with an injected random source (deterministic in tests)
    pub fn with_rng(config: FeedConfig, rng: StdRng) -> Arc<Self> {
        let (batch_tx, _) = broadcast::channel(config.batch_buffer_size);
        let prices: HashMap<String, Decimal> =
            config.seed_prices.iter().cloned().collect();

        Arc::new(Self {
            config,
            prices: RwLock::new(prices),
            watched: RwLock::new(HashSet::new()),
            market_open: AtomicBool::new(true),
            rng: Mutex::new(rng),
            batch_tx,
            tick_task: Mutex::new(None),
        })
    }

    /// Start the periodic tick task. Idempotent: calling while already
    /// connected is a no-op.
    pub fn connect(self: &Arc<Self>) {
        let mut task = self.tick_task.lock().expect("tick task lock poisoned");
        if task.is_some() {
            debug!("Feed already connected, ignoring connect()");
            return;
        }

        info!(
            interval_ms = self.config.tick_interval.as_millis() as u64,
            "Connecting to market feed (simulated)"
        );

        let feed = Arc::clone(self);
        *task = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(feed.config.tick_interval);
            // The first interval tick completes immediately; skip it so the
            // first batch lands one full cadence after connect.
            interval.tick().await;
            loop {
                interval.tick().await;
                if let Some(batch) = feed.tick_once() {
                    if feed.batch_tx.send(batch).is_err() {
                        debug!("No listeners for feed batch");
                    }
                }
            }
        }));
    }

    /// Stop ticking. Idempotent; no tick fires after this returns. A tick
    /// already executing completes (its body holds no await points), but no
    /// new one is scheduled.
    pub fn disconnect(&self) {
        let mut task = self.tick_task.lock().expect("tick task lock poisoned");
        if let Some(handle) = task.take() {
            handle.abort();
            info!("Disconnected from market feed");
        }
    }

    /// Whether the tick task is currently running
    pub fn is_connected(&self) -> bool {
        self.tick_task
            .lock()
            .expect("tick task lock poisoned")
            .is_some()
    }

    /// Open or close the simulated market. A closed market keeps the tick
    /// task alive but generates no updates.
    pub fn set_market_open(&self, open: bool) {
        self.market_open.store(open, Ordering::Relaxed);
        info!(open, "Market open flag changed");
    }

    /// Run one update cycle over the watched set. Returns the batch of moved
    /// symbols, or `None` when nothing moved (empty batches are suppressed).
    pub(crate) fn tick_once(&self) -> Option<PriceBatch> {
        if !self.market_open.load(Ordering::Relaxed) {
            return None;
        }

        let watched: Vec<String> = {
            let guard = self.watched.read().expect("watched lock poisoned");
            guard.iter().cloned().collect()
        };
        if watched.is_empty() {
            return None;
        }

        let mut rng = self.rng.lock().expect("rng lock poisoned");
        let mut prices = self.prices.write().expect("price lock poisoned");
        let mut batch = PriceBatch::new();

        for symbol in watched {
            // Not everything moves at once
            if !rng.random_bool(self.config.update_probability) {
                continue;
            }

            let current = *prices
                .entry(symbol.clone())
                .or_insert_with(|| seed_price(&mut rng));

            let direction = if rng.random_bool(self.config.upward_bias) {
                1.0
            } else {
                -1.0
            };
            let change_pct = rng.random_range(0.0..self.config.volatility) * direction;
            let change = Decimal::from_f64(change_pct).unwrap_or_default() * current;

            let new_price = (current + change).max(self.config.price_floor);
            prices.insert(symbol.clone(), new_price);
            batch.insert(symbol, new_price);
        }

        if batch.is_empty() {
            None
        } else {
            Some(batch)
        }
    }

    /// Last known price for a symbol, seeding a plausible value on first
    /// touch. The seeded value is remembered and stable thereafter.
    pub fn get_or_create_price(&self, symbol: &str) -> Decimal {
        if let Some(price) = self.get_price(symbol) {
            return price;
        }
        let mut rng = self.rng.lock().expect("rng lock poisoned");
        let mut prices = self.prices.write().expect("price lock poisoned");
        *prices
            .entry(symbol.to_string())
            .or_insert_with(|| seed_price(&mut rng))
    }

    /// Side-effect-free price read; `None` for symbols never seen
    pub fn get_price(&self, symbol: &str) -> Option<Decimal> {
        let prices = self.prices.read().expect("price lock poisoned");
        prices.get(symbol).copied()
    }

    /// Replace the watched set atomically. Symbols absent from the new set
    /// stop moving even if a listener still references them.
    pub fn set_watched_symbols<I, S>(&self, symbols: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let new_set: HashSet<String> = symbols.into_iter().map(Into::into).collect();
        let mut watched = self.watched.write().expect("watched lock poisoned");
        debug!(count = new_set.len(), "Watched symbol set replaced");
        *watched = new_set;
    }

    /// Add symbols to the watched set, seeding prices for unseen ones. Used
    /// by the subscription hub; never shrinks the set.
    pub fn watch_symbols(&self, symbols: &[String]) {
        for symbol in symbols {
            self.get_or_create_price(symbol);
        }
        let mut watched = self.watched.write().expect("watched lock poisoned");
        for symbol in symbols {
            watched.insert(symbol.clone());
        }
    }

    /// Symbols currently generating movement
    pub fn watched_symbols(&self) -> Vec<String> {
        let watched = self.watched.read().expect("watched lock poisoned");
        let mut symbols: Vec<String> = watched.iter().cloned().collect();
        symbols.sort();
        symbols
    }

    /// Receiver of raw tick batches. The subscription hub consumes this;
    /// direct use is fine in tests.
    pub fn batch_stream(&self) -> broadcast::Receiver<PriceBatch> {
        self.batch_tx.subscribe()
    }
}

impl Drop for MockMarketFeed {
    fn drop(&mut self) {
        if let Ok(mut task) = self.tick_task.lock() {
            if let Some(handle) = task.take() {
                handle.abort();
                warn!("Feed dropped while connected; tick task aborted");
            }
        }
    }
}

/// Plausible starting price for a never-seen symbol: uniform in [100, 150)
fn seed_price(rng: &mut StdRng) -> Decimal {
    Decimal::from_f64(rng.random_range(100.0..150.0))
        .unwrap_or(Decimal::ONE_HUNDRED)
        .round_dp(2)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn seeded_feed(config: FeedConfig) -> Arc<MockMarketFeed> {
        MockMarketFeed::with_rng(config, StdRng::seed_from_u64(42))
    }

    #[test]
    fn test_seed_prices_present() {
        let feed = seeded_feed(FeedConfig::default());
        assert_eq!(feed.get_price("AAPL"), Some(dec!(175.00)));
        assert_eq!(feed.get_price("NVDA"), Some(dec!(850.00)));
    }

    #[test]
    fn test_get_price_does_not_seed() {
        let feed = seeded_feed(FeedConfig::default());
        assert_eq!(feed.get_price("ZZZZ"), None);
        // Still unseeded after the read
        assert_eq!(feed.get_price("ZZZZ"), None);
    }

    #[test]
    fn test_get_or_create_price_seeds_once() {
        let feed = seeded_feed(FeedConfig::default());
        let first = feed.get_or_create_price("ZZZZ");
        assert!(first >= dec!(100) && first < dec!(150));
        // Stable on repeated touch
        assert_eq!(feed.get_or_create_price("ZZZZ"), first);
        assert_eq!(feed.get_price("ZZZZ"), Some(first));
    }

    #[test]
    fn test_prices_never_reach_zero() {
        // Worst-case walk: every symbol moves every tick, always down, from
        // a price already at the floor.
        let config = FeedConfig {
            update_probability: 1.0,
            upward_bias: 0.0,
            volatility: 0.01,
            seed_prices: vec![("PENNY".to_string(), dec!(0.02))],
            ..FeedConfig::default()
        };
        let feed = seeded_feed(config);
        feed.watch_symbols(&["PENNY".to_string()]);

        let mut min_seen = dec!(0.02);
        for _ in 0..10_000 {
            feed.tick_once();
            let price = feed.get_price("PENNY").unwrap();
            min_seen = min_seen.min(price);
        }
        assert!(min_seen > Decimal::ZERO);
        assert!(min_seen >= dec!(0.01));
    }

    #[test]
    fn test_tick_suppresses_empty_batches() {
        let config = FeedConfig {
            update_probability: 0.0,
            ..FeedConfig::default()
        };
        let feed = seeded_feed(config);
        feed.watch_symbols(&["AAPL".to_string()]);
        assert!(feed.tick_once().is_none());
    }

    #[test]
    fn test_tick_without_watched_symbols() {
        let feed = seeded_feed(FeedConfig::default());
        assert!(feed.tick_once().is_none());
    }

    #[test]
    fn test_closed_market_emits_nothing() {
        let config = FeedConfig {
            update_probability: 1.0,
            ..FeedConfig::default()
        };
        let feed = seeded_feed(config);
        feed.watch_symbols(&["AAPL".to_string()]);
        feed.set_market_open(false);
        assert!(feed.tick_once().is_none());

        feed.set_market_open(true);
        assert!(feed.tick_once().is_some());
    }

    #[test]
    fn test_set_watched_symbols_replaces() {
        let config = FeedConfig {
            update_probability: 1.0,
            ..FeedConfig::default()
        };
        let feed = seeded_feed(config);
        feed.watch_symbols(&["AAPL".to_string(), "TSLA".to_string()]);
        feed.set_watched_symbols(["TSLA"]);

        assert_eq!(feed.watched_symbols(), vec!["TSLA".to_string()]);
        let batch = feed.tick_once().unwrap();
        assert!(batch.contains_key("TSLA"));
        assert!(!batch.contains_key("AAPL"));
    }

    #[test]
    fn test_moves_are_bounded_by_volatility() {
        let config = FeedConfig {
            update_probability: 1.0,
            volatility: 0.0015,
            ..FeedConfig::default()
        };
        let feed = seeded_feed(config);
        feed.watch_symbols(&["AAPL".to_string()]);

        for _ in 0..1_000 {
            let before = feed.get_price("AAPL").unwrap();
            feed.tick_once();
            let after = feed.get_price("AAPL").unwrap();
            let max_move = before * dec!(0.0015);
            assert!((after - before).abs() <= max_move);
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_connect_is_idempotent_and_disconnect_stops() {
        let config = FeedConfig {
            update_probability: 1.0,
            ..FeedConfig::default()
        };
        let feed = seeded_feed(config);
        feed.watch_symbols(&["AAPL".to_string()]);
        let mut rx = feed.batch_stream();

        // Double connect must not start a second tick task
        feed.connect();
        feed.connect();
        assert!(feed.is_connected());

        let batch = tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("expected a tick batch")
            .expect("feed channel closed");
        assert!(batch.contains_key("AAPL"));

        // One disconnect fully stops ticking
        feed.disconnect();
        assert!(!feed.is_connected());
        // Drain anything emitted before the stop
        while rx.try_recv().is_ok() {}

        let after = tokio::time::timeout(Duration::from_secs(10), rx.recv()).await;
        assert!(after.is_err(), "no batch may arrive after disconnect");

        // Redundant disconnect is a no-op
        feed.disconnect();
    }
}
