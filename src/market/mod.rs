//! Simulated market data: mock price feed and subscription fan-out

pub mod feed;
pub mod hub;

use rust_decimal::Decimal;
use std::collections::HashMap;

/// One batch of price updates emitted by a feed tick, symbol -> new price.
/// Ephemeral: batches are delivered to listeners and never persisted.
pub type PriceBatch = HashMap<String, Decimal>;

pub use feed::{FeedConfig, MockMarketFeed};
pub use hub::{SubscriptionHub, SubscriptionId};
