use anyhow::Result;
use clap::Args;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::portfolio::display::render_portfolio;
use crate::portfolio::{PaperLedger, PortfolioQuery};

#[derive(Args, Clone)]
pub struct PortfolioArgs {
    /// Print the snapshot as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

pub struct PortfolioCommand {
    args: PortfolioArgs,
}

impl PortfolioCommand {
    pub fn new(args: PortfolioArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        info!("Fetching portfolio snapshot");

        let ledger = Arc::new(PaperLedger::new(config.ledger_config()));
        let query = PortfolioQuery::new(ledger);
        let portfolio = query.get_portfolio().await;

        if self.args.json {
            println!("{}", serde_json::to_string_pretty(&portfolio)?);
        } else {
            println!("{}", render_portfolio(&portfolio));
        }
        Ok(())
    }
}
