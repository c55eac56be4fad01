//! Paper-trading ledger: the single source of truth for cash, holdings, and
//! equity
//!
//! Every mutation runs as one transaction behind a single lock: read current
//! values, compute, write, recompute equity, snapshot. There are no await
//! points inside a critical section, so a concurrent price sync and order
//! placement serialize instead of interleaving. The simulated backing-store
//! latencies sleep *before* the lock is taken.

use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::sync::Mutex;
use std::time::Duration;
use tracing::{debug, info};

use crate::market::PriceBatch;
use crate::portfolio::types::{Holding, LedgerError, OrderSide, Portfolio};

/// Configuration for the paper ledger
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// Paper money starting balance
    pub starting_cash: Decimal,
    /// Positions present at process start
    pub seed_holdings: Vec<Holding>,
    /// Simulated round-trip for snapshot reads
    pub read_latency: Duration,
    /// Simulated round-trip for order execution
    pub order_latency: Duration,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            starting_cash: Decimal::from(100_000),
            seed_holdings: Vec::new(),
            read_latency: Duration::from_millis(500),
            order_latency: Duration::from_millis(800),
        }
    }
}

struct LedgerState {
    cash: Decimal,
    holdings: BTreeMap<String, Holding>,
    total_equity: Decimal,
}

impl LedgerState {
    /// Re-derive equity from cash and mark-to-market holdings. Called after
    /// every mutation; `total_equity` is never assigned any other way.
    fn recompute_equity(&mut self) {
        let holdings_value: Decimal =
            self.holdings.values().map(|h| h.market_value()).sum();
        self.total_equity = self.cash + holdings_value;
    }

    fn snapshot(&self) -> Portfolio {
        Portfolio {
            cash: self.cash,
            holdings: self.holdings.values().cloned().collect(),
            total_equity: self.total_equity,
        }
    }
}

/// In-memory paper-trading ledger
///
/// Constructed once at process start and shared by handle; lives for the
/// process lifetime (no persistence).
pub struct PaperLedger {
    state: Mutex<LedgerState>,
    read_latency: Duration,
    order_latency: Duration,
}

impl PaperLedger {
    pub fn new(config: LedgerConfig) -> Self {
        let holdings: BTreeMap<String, Holding> = config
            .seed_holdings
            .into_iter()
            .filter(|h| h.shares > 0)
            .map(|h| (h.symbol.clone(), h))
            .collect();

        let mut state = LedgerState {
            cash: config.starting_cash,
            holdings,
            total_equity: Decimal::ZERO,
        };
        state.recompute_equity();

        Self {
            state: Mutex::new(state),
            read_latency: config.read_latency,
            order_latency: config.order_latency,
        }
    }

    /// Consistent snapshot of the portfolio
    ///
    /// Returns a defensive copy; callers cannot reach internal state through
    /// it. Models a round-trip to a backing store.
    pub async fn get_portfolio(&self) -> Portfolio {
        tokio::time::sleep(self.read_latency).await;

        let mut state = self.state.lock().expect("ledger lock poisoned");
        state.recompute_equity();
        state.snapshot()
    }

    /// Execute a market order against the ledger
    ///
    /// All-or-nothing: on any validation failure the ledger is left exactly
    /// as it was. Returns the full post-state snapshot.
    pub async fn place_order(
        &self,
        symbol: &str,
        side: OrderSide,
        quantity: u64,
        price: Decimal,
    ) -> Result<Portfolio, LedgerError> {
        if quantity == 0 {
            return Err(LedgerError::InvalidOrder(
                "quantity must be positive".to_string(),
            ));
        }
        if price <= Decimal::ZERO {
            return Err(LedgerError::InvalidOrder(
                "price must be positive".to_string(),
            ));
        }

        // Simulated execution latency, outside the critical section
        tokio::time::sleep(self.order_latency).await;

        let mut state = self.state.lock().expect("ledger lock poisoned");
        match side {
            OrderSide::Buy => Self::apply_buy(&mut state, symbol, quantity, price)?,
            OrderSide::Sell => Self::apply_sell(&mut state, symbol, quantity, price)?,
        }
        state.recompute_equity();

        info!(
            %side,
            symbol,
            quantity,
            %price,
            cash = %state.cash,
            equity = %state.total_equity,
            "Paper order executed"
        );
        Ok(state.snapshot())
    }

    fn apply_buy(
        state: &mut LedgerState,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        let cost = Decimal::from(quantity) * price;
        if cost > state.cash {
            return Err(LedgerError::InsufficientFunds {
                required: cost,
                available: state.cash,
            });
        }

        state.cash -= cost;
        match state.holdings.get_mut(symbol) {
            Some(holding) => {
                // Fold the fill into the weighted-average cost basis
                let total_cost = holding.cost_basis() + cost;
                let total_shares = holding.shares + quantity;
                holding.avg_price = total_cost / Decimal::from(total_shares);
                holding.shares = total_shares;
                // The order moves the last-known price
                holding.current_price = price;
            }
            None => {
                state.holdings.insert(
                    symbol.to_string(),
                    Holding {
                        symbol: symbol.to_string(),
                        shares: quantity,
                        avg_price: price,
                        current_price: price,
                    },
                );
            }
        }
        Ok(())
    }

    fn apply_sell(
        state: &mut LedgerState,
        symbol: &str,
        quantity: u64,
        price: Decimal,
    ) -> Result<(), LedgerError> {
        let holding = state.holdings.get_mut(symbol).ok_or_else(|| {
            LedgerError::InsufficientShares {
                symbol: symbol.to_string(),
                requested: quantity,
                held: 0,
            }
        })?;
        if holding.shares < quantity {
            return Err(LedgerError::InsufficientShares {
                symbol: symbol.to_string(),
                requested: quantity,
                held: holding.shares,
            });
        }

        state.cash += Decimal::from(quantity) * price;
        holding.shares -= quantity;
        // Cost basis of the remaining shares is unchanged by a sell
        holding.current_price = price;

        if holding.shares == 0 {
            state.holdings.remove(symbol);
        }
        Ok(())
    }

    /// Sync cached prices from a feed batch
    ///
    /// Overwrites `current_price` for held symbols present in the batch;
    /// updates for symbols not held are dropped, not cached. Fire-and-forget:
    /// synchronous and infallible.
    pub fn update_live_prices(&self, updates: &PriceBatch) {
        let mut state = self.state.lock().expect("ledger lock poisoned");

        let mut touched = 0usize;
        for holding in state.holdings.values_mut() {
            if let Some(price) = updates.get(&holding.symbol) {
                holding.current_price = *price;
                touched += 1;
            }
        }

        if touched > 0 {
            state.recompute_equity();
            debug!(touched, equity = %state.total_equity, "Live prices synced");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    /// Zero-latency config so tests don't sleep
    fn test_config() -> LedgerConfig {
        LedgerConfig {
            read_latency: Duration::ZERO,
            order_latency: Duration::ZERO,
            ..LedgerConfig::default()
        }
    }

    fn seeded_ledger() -> PaperLedger {
        PaperLedger::new(LedgerConfig {
            seed_holdings: vec![
                Holding {
                    symbol: "AAPL".to_string(),
                    shares: 50,
                    avg_price: dec!(150.00),
                    current_price: dec!(175.00),
                },
                Holding {
                    symbol: "TSLA".to_string(),
                    shares: 10,
                    avg_price: dec!(220.00),
                    current_price: dec!(200.00),
                },
            ],
            ..test_config()
        })
    }

    fn assert_equity_invariant(portfolio: &Portfolio) {
        assert_eq!(
            portfolio.total_equity,
            portfolio.cash + portfolio.holdings_value()
        );
    }

    #[tokio::test]
    async fn test_seeded_snapshot() {
        let ledger = seeded_ledger();
        let portfolio = ledger.get_portfolio().await;

        assert_eq!(portfolio.cash, dec!(100000));
        assert_eq!(portfolio.holdings.len(), 2);
        // 100_000 + 50*175 + 10*200
        assert_eq!(portfolio.total_equity, dec!(110750));
        assert_equity_invariant(&portfolio);
    }

    #[tokio::test]
    async fn test_buy_sequence_drains_cash_exactly() {
        let ledger = PaperLedger::new(test_config());

        ledger
            .place_order("AAPL", OrderSide::Buy, 100, dec!(175.00))
            .await
            .unwrap();
        let portfolio = ledger
            .place_order("MSFT", OrderSide::Buy, 50, dec!(410.00))
            .await
            .unwrap();

        // 100_000 - 17_500 - 20_500
        assert_eq!(portfolio.cash, dec!(62000));
        assert!(portfolio.cash >= Decimal::ZERO);
        assert_equity_invariant(&portfolio);
    }

    #[tokio::test]
    async fn test_buy_existing_holding_weights_cost_basis() {
        let ledger = seeded_ledger();
        let portfolio = ledger
            .place_order("AAPL", OrderSide::Buy, 10, dec!(175.00))
            .await
            .unwrap();

        let aapl = portfolio.holding("AAPL").unwrap();
        assert_eq!(aapl.shares, 60);
        // (50*150 + 10*175) / 60 = 154.17 at two decimal places
        assert_eq!(aapl.avg_price.round_dp(2), dec!(154.17));
        assert_eq!(aapl.current_price, dec!(175.00));
        assert_equity_invariant(&portfolio);
    }

    #[tokio::test]
    async fn test_buy_new_symbol_creates_holding() {
        let ledger = PaperLedger::new(test_config());
        let portfolio = ledger
            .place_order("NVDA", OrderSide::Buy, 5, dec!(850.00))
            .await
            .unwrap();

        let nvda = portfolio.holding("NVDA").unwrap();
        assert_eq!(nvda.shares, 5);
        assert_eq!(nvda.avg_price, dec!(850.00));
        assert_eq!(nvda.current_price, dec!(850.00));
        assert_eq!(portfolio.cash, dec!(95750));
        assert_equity_invariant(&portfolio);
    }

    #[tokio::test]
    async fn test_partial_sell_keeps_cost_basis() {
        let ledger = seeded_ledger();
        let portfolio = ledger
            .place_order("AAPL", OrderSide::Sell, 20, dec!(160.00))
            .await
            .unwrap();

        let aapl = portfolio.holding("AAPL").unwrap();
        assert_eq!(aapl.shares, 30);
        assert_eq!(aapl.avg_price, dec!(150.00));
        assert_eq!(aapl.current_price, dec!(160.00));
        assert_eq!(portfolio.cash, dec!(103200));
        assert_equity_invariant(&portfolio);
    }

    #[tokio::test]
    async fn test_full_sell_removes_holding() {
        let ledger = seeded_ledger();
        let portfolio = ledger
            .place_order("TSLA", OrderSide::Sell, 10, dec!(210.00))
            .await
            .unwrap();

        assert!(portfolio.holding("TSLA").is_none());
        assert_eq!(portfolio.cash, dec!(102100));
        assert_equity_invariant(&portfolio);

        // A later query still shows no entry
        let again = ledger.get_portfolio().await;
        assert!(again.holding("TSLA").is_none());
    }

    #[tokio::test]
    async fn test_buy_exceeding_cash_rejected_atomically() {
        let ledger = PaperLedger::new(LedgerConfig {
            starting_cash: dec!(100),
            ..test_config()
        });
        let before = ledger.get_portfolio().await;

        let err = ledger
            .place_order("AAPL", OrderSide::Buy, 10, dec!(50.00))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientFunds {
                required: dec!(500.00),
                available: dec!(100),
            }
        );

        let after = ledger.get_portfolio().await;
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn test_oversell_rejected_atomically() {
        let ledger = seeded_ledger();
        let before = ledger.get_portfolio().await;

        let err = ledger
            .place_order("TSLA", OrderSide::Sell, 11, dec!(200.00))
            .await
            .unwrap_err();
        assert_eq!(
            err,
            LedgerError::InsufficientShares {
                symbol: "TSLA".to_string(),
                requested: 11,
                held: 10,
            }
        );

        // Selling a symbol that was never bought
        let err = ledger
            .place_order("NVDA", OrderSide::Sell, 1, dec!(850.00))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientShares { held: 0, .. }));

        assert_eq!(ledger.get_portfolio().await, before);
    }

    #[tokio::test]
    async fn test_invalid_orders_rejected() {
        let ledger = seeded_ledger();

        let err = ledger
            .place_order("AAPL", OrderSide::Buy, 0, dec!(175.00))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOrder(_)));

        let err = ledger
            .place_order("AAPL", OrderSide::Buy, 1, dec!(0))
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::InvalidOrder(_)));
    }

    #[tokio::test]
    async fn test_live_prices_update_held_symbols_only() {
        let ledger = seeded_ledger();

        let mut updates = PriceBatch::new();
        updates.insert("AAPL".to_string(), dec!(180.00));
        updates.insert("NVDA".to_string(), dec!(900.00)); // not held
        ledger.update_live_prices(&updates);

        let portfolio = ledger.get_portfolio().await;
        assert_eq!(
            portfolio.holding("AAPL").unwrap().current_price,
            dec!(180.00)
        );
        // The unheld symbol was dropped, not cached: buying it later uses
        // the execution price, not 900
        assert!(portfolio.holding("NVDA").is_none());
        assert_equity_invariant(&portfolio);

        let bought = ledger
            .place_order("NVDA", OrderSide::Buy, 1, dec!(850.00))
            .await
            .unwrap();
        assert_eq!(
            bought.holding("NVDA").unwrap().current_price,
            dec!(850.00)
        );
    }

    #[tokio::test]
    async fn test_equity_tracks_price_sync() {
        let ledger = seeded_ledger();

        let mut updates = PriceBatch::new();
        updates.insert("AAPL".to_string(), dec!(200.00));
        updates.insert("TSLA".to_string(), dec!(250.00));
        ledger.update_live_prices(&updates);

        let portfolio = ledger.get_portfolio().await;
        // 100_000 + 50*200 + 10*250
        assert_eq!(portfolio.total_equity, dec!(112500));
    }

    #[tokio::test]
    async fn test_rebuy_after_full_close_resets_basis() {
        let ledger = seeded_ledger();
        ledger
            .place_order("TSLA", OrderSide::Sell, 10, dec!(210.00))
            .await
            .unwrap();
        let portfolio = ledger
            .place_order("TSLA", OrderSide::Buy, 4, dec!(190.00))
            .await
            .unwrap();

        let tsla = portfolio.holding("TSLA").unwrap();
        // Basis restarts at the new execution price, not the old 220 average
        assert_eq!(tsla.avg_price, dec!(190.00));
        assert_eq!(tsla.shares, 4);
    }

    #[tokio::test]
    async fn test_concurrent_orders_and_price_sync_serialize() {
        use std::sync::Arc;

        let ledger = Arc::new(PaperLedger::new(test_config()));
        let mut tasks = Vec::new();

        for i in 0..10u64 {
            let ledger = Arc::clone(&ledger);
            tasks.push(tokio::spawn(async move {
                ledger
                    .place_order("AAPL", OrderSide::Buy, 10, dec!(100.00))
                    .await
                    .unwrap();
                let mut updates = PriceBatch::new();
                updates.insert(
                    "AAPL".to_string(),
                    dec!(100.00) + Decimal::from(i),
                );
                ledger.update_live_prices(&updates);
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let portfolio = ledger.get_portfolio().await;
        let aapl = portfolio.holding("AAPL").unwrap();
        assert_eq!(aapl.shares, 100);
        assert_eq!(aapl.avg_price, dec!(100.00));
        assert_eq!(portfolio.cash, dec!(90000));
        assert_equity_invariant(&portfolio);
    }
}
