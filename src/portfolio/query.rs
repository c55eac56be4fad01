//! Read seam over the ledger
//!
//! External consumers (CLI, chat tooling) depend on [`TradingProvider`] and
//! [`PortfolioQuery`] rather than on ledger internals, so the paper backend
//! can be swapped for a real brokerage adapter without touching callers.

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;

use crate::market::PriceBatch;
use crate::portfolio::ledger::PaperLedger;
use crate::portfolio::types::{LedgerError, OrderSide, Portfolio};

/// Contract a trading backend must implement
#[async_trait]
pub trait TradingProvider: Send + Sync {
    /// Full portfolio snapshot
    async fn get_portfolio(&self) -> Portfolio;

    /// Execute a market order, returning the post-state snapshot
    async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: u64,
        price: Decimal,
    ) -> Result<Portfolio, LedgerError>;

    /// Sync cached prices from a feed batch
    fn update_live_prices(&self, updates: &PriceBatch);
}

#[async_trait]
impl TradingProvider for PaperLedger {
    async fn get_portfolio(&self) -> Portfolio {
        PaperLedger::get_portfolio(self).await
    }

    async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: u64,
        price: Decimal,
    ) -> Result<Portfolio, LedgerError> {
        PaperLedger::place_order(self, symbol, side, quantity, price).await
    }

    fn update_live_prices(&self, updates: &PriceBatch) {
        PaperLedger::update_live_prices(self, updates)
    }
}

/// Read-only accessor over a trading provider. No state of its own.
#[derive(Clone)]
pub struct PortfolioQuery {
    provider: Arc<dyn TradingProvider>,
}

impl PortfolioQuery {
    pub fn new(provider: Arc<dyn TradingProvider>) -> Self {
        Self { provider }
    }

    /// Snapshot of the underlying portfolio
    pub async fn get_portfolio(&self) -> Portfolio {
        self.provider.get_portfolio().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::portfolio::ledger::LedgerConfig;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[test]
    fn test_query_delegates_to_ledger() {
        tokio_test::block_on(async {
            let ledger = Arc::new(PaperLedger::new(LedgerConfig {
                starting_cash: dec!(5000),
                read_latency: Duration::ZERO,
                order_latency: Duration::ZERO,
                ..LedgerConfig::default()
            }));
            let query = PortfolioQuery::new(ledger.clone());

            let portfolio = query.get_portfolio().await;
            assert_eq!(portfolio.cash, dec!(5000));
            assert!(portfolio.holdings.is_empty());

            ledger
                .place_order("AAPL", OrderSide::Buy, 10, dec!(100.00))
                .await
                .unwrap();
            let portfolio = query.get_portfolio().await;
            assert_eq!(portfolio.cash, dec!(4000));
            assert_eq!(portfolio.holding("AAPL").unwrap().shares, 10);
        });
    }
}
