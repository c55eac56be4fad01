use anyhow::Result;
use clap::Args;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::portfolio::display::render_portfolio;
use crate::portfolio::{OrderSide, PaperLedger};

#[derive(Args, Clone)]
pub struct SellArgs {
    /// Ticker symbol
    pub symbol: String,

    /// Number of shares
    #[arg(long)]
    pub quantity: u64,

    /// Limit price per share (e.g. 160.00)
    #[arg(long)]
    pub price: Decimal,

    /// Confirm order placement
    #[arg(long)]
    pub yes: bool,
}

pub struct SellCommand {
    args: SellArgs,
}

impl SellCommand {
    pub fn new(args: SellArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        if !self.args.yes {
            warn!("⚠️  Order confirmation required. Use --yes to confirm.");
            return Ok(());
        }

        info!(
            symbol = %self.args.symbol,
            quantity = self.args.quantity,
            price = %self.args.price,
            "Placing paper SELL order"
        );

        let ledger = Arc::new(PaperLedger::new(config.ledger_config()));
        let portfolio = ledger
            .place_order(
                &self.args.symbol,
                OrderSide::Sell,
                self.args.quantity,
                self.args.price,
            )
            .await?;

        println!("{}", render_portfolio(&portfolio));
        Ok(())
    }
}
