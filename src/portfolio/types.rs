//! Portfolio type definitions with strong typing

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by ledger order placement
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LedgerError {
    #[error("Insufficient buying power: order costs {required} but only {available} cash available")]
    InsufficientFunds {
        required: Decimal,
        available: Decimal,
    },
    #[error("Insufficient shares of {symbol}: tried to sell {requested} but only {held} held")]
    InsufficientShares {
        symbol: String,
        requested: u64,
        held: u64,
    },
    #[error("Invalid order: {0}")]
    InvalidOrder(String),
}

/// Order side
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderSide::Buy => write!(f, "BUY"),
            OrderSide::Sell => write!(f, "SELL"),
        }
    }
}

/// A single position in the paper portfolio
///
/// `avg_price` is the volume-weighted cost basis of every BUY accumulated
/// since the position was last fully closed. `current_price` is the last
/// price observed from either the market feed or an executed order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Holding {
    pub symbol: String,
    pub shares: u64,
    pub avg_price: Decimal,
    pub current_price: Decimal,
}

impl Holding {
    /// Mark-to-market value of the position
    pub fn market_value(&self) -> Decimal {
        Decimal::from(self.shares) * self.current_price
    }

    /// Total amount paid for the currently-held shares
    pub fn cost_basis(&self) -> Decimal {
        Decimal::from(self.shares) * self.avg_price
    }

    /// Unrealized P&L at the current price
    pub fn unrealized_pnl(&self) -> Decimal {
        self.market_value() - self.cost_basis()
    }
}

/// Immutable snapshot of the paper portfolio
///
/// `total_equity` is derived: cash plus the mark-to-market value of all
/// holdings. It is recomputed by the ledger after every mutation and never
/// assigned independently.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Portfolio {
    pub cash: Decimal,
    pub holdings: Vec<Holding>,
    pub total_equity: Decimal,
}

impl Portfolio {
    /// Look up a holding by symbol
    pub fn holding(&self, symbol: &str) -> Option<&Holding> {
        self.holdings.iter().find(|h| h.symbol == symbol)
    }

    /// Symbols currently held, in snapshot order
    pub fn symbols(&self) -> Vec<String> {
        self.holdings.iter().map(|h| h.symbol.clone()).collect()
    }

    /// Combined mark-to-market value of all holdings
    pub fn holdings_value(&self) -> Decimal {
        self.holdings.iter().map(|h| h.market_value()).sum()
    }
}
