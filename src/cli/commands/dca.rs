use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::config::AppConfig;
use crate::risk::{calculate_dca, DcaInputs};

#[derive(Args, Clone)]
pub struct DcaArgs {
    /// Shares currently held
    #[arg(long)]
    pub shares: u64,

    /// Current average price
    #[arg(long)]
    pub avg_price: Decimal,

    /// Planned buy price
    #[arg(long)]
    pub price: Decimal,

    /// Amount to invest
    #[arg(long)]
    pub amount: Decimal,

    /// Print the result as JSON (the tool contract shape)
    #[arg(long)]
    pub json: bool,
}

pub struct DcaCommand {
    args: DcaArgs,
}

impl DcaCommand {
    pub fn new(args: DcaArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, _config: &AppConfig) -> Result<()> {
        let result = calculate_dca(&DcaInputs {
            current_shares: self.args.shares,
            current_avg_price: self.args.avg_price,
            new_price: self.args.price,
            invest_amount: self.args.amount,
        });

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&result)?);
        } else {
            println!("{}", result.summary.bright_white());
            println!(
                "{} {} shares at {} average",
                "New position:".bright_yellow(),
                result.new_total_shares.to_string().bright_green(),
                format!("${:.2}", result.new_avg_price).bright_green()
            );
        }
        Ok(())
    }
}
