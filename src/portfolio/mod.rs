//! Paper-trading portfolio: ledger, read seam, types, and display

pub mod display;
pub mod ledger;
pub mod query;
pub mod types;

pub use ledger::{LedgerConfig, PaperLedger};
pub use query::{PortfolioQuery, TradingProvider};
pub use types::{Holding, LedgerError, OrderSide, Portfolio};
