use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::portfolio::{PaperLedger, PortfolioQuery};
use crate::risk::{calculate_position_size, PositionInputs};

#[derive(Args, Clone)]
pub struct SizeArgs {
    /// Account equity; defaults to the paper portfolio's total equity
    #[arg(long)]
    pub account: Option<Decimal>,

    /// Max risk as a percentage of the account (e.g. 1.0)
    #[arg(long, default_value = "1.0")]
    pub risk_pct: Decimal,

    /// Planned entry price
    #[arg(long)]
    pub entry: Decimal,

    /// Stop-loss price
    #[arg(long)]
    pub stop: Decimal,

    /// Print the result as JSON (the tool contract shape)
    #[arg(long)]
    pub json: bool,
}

pub struct SizeCommand {
    args: SizeArgs,
}

impl SizeCommand {
    pub fn new(args: SizeArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        let account_size = match self.args.account {
            Some(account) => account,
            None => {
                // No explicit account size: size against current paper equity
                let ledger = Arc::new(PaperLedger::new(config.ledger_config()));
                let portfolio = PortfolioQuery::new(ledger).get_portfolio().await;
                info!(equity = %portfolio.total_equity, "Using portfolio equity as account size");
                portfolio.total_equity
            }
        };

        let result = calculate_position_size(&PositionInputs {
            account_size,
            max_risk_pct: self.args.risk_pct,
            entry_price: self.args.entry,
            stop_price: self.args.stop,
        });

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else if result.is_valid {
            println!("{}", result.summary.bright_white());
            println!(
                "{} {}",
                "Position size:".bright_yellow(),
                format!("{} shares", result.position_size_shares).bright_green()
            );
        } else {
            println!("{}", result.summary.bright_red());
        }
        Ok(())
    }
}
