use anyhow::Result;
use clap::Args;
use futures::StreamExt;
use owo_colors::OwoColorize;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio_stream::wrappers::UnboundedReceiverStream;
use tracing::info;

use crate::config::AppConfig;
use crate::market::{MockMarketFeed, SubscriptionHub};
use crate::portfolio::display::render_portfolio;
use crate::portfolio::{PaperLedger, PortfolioQuery};

#[derive(Args, Clone)]
pub struct WatchArgs {
    /// Extra symbols to watch in addition to current holdings
    pub symbols: Vec<String>,

    /// How long to stream before printing the final snapshot
    #[arg(long, default_value_t = 30)]
    pub duration_secs: u64,
}

pub struct WatchCommand {
    args: WatchArgs,
}

impl WatchCommand {
    pub fn new(args: WatchArgs) -> Self {
        Self { args }
    }

    pub async fn execute(&self, config: &AppConfig) -> Result<()> {
        let feed = MockMarketFeed::new(config.feed_config());
        let ledger = Arc::new(PaperLedger::new(config.ledger_config()));
        let query = PortfolioQuery::new(ledger.clone());

        // Watch exactly the held symbols plus anything asked for
        let portfolio = query.get_portfolio().await;
        let mut symbols = portfolio.symbols();
        for symbol in &self.args.symbols {
            let symbol = symbol.to_uppercase();
            if !symbols.contains(&symbol) {
                symbols.push(symbol);
            }
        }
        if symbols.is_empty() {
            println!("{}", "Nothing to watch: no holdings and no symbols given".bright_black());
            return Ok(());
        }

        feed.set_watched_symbols(symbols.clone());
        let hub = SubscriptionHub::new(feed.clone());
        let (subscription, rx) = hub.subscribe(&symbols);
        let mut batches = UnboundedReceiverStream::new(rx);
        feed.connect();

        info!(
            symbols = symbols.len(),
            duration_secs = self.args.duration_secs,
            "Streaming simulated prices"
        );
        println!(
            "{} {}",
            "🔌 NASDAQ feed (simulated):".bright_white(),
            symbols.join(", ").bright_cyan()
        );

        let mut last_seen: HashMap<String, Decimal> = HashMap::new();
        let deadline = tokio::time::sleep(Duration::from_secs(self.args.duration_secs));
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                _ = &mut deadline => break,
                batch = batches.next() => {
                    let Some(batch) = batch else { break };
                    // Sync the ledger first so a subsequent order sees fresh
                    // prices, then render the movement
                    ledger.update_live_prices(&batch);

                    let mut lines: Vec<(&String, &Decimal)> = batch.iter().collect();
                    lines.sort_by(|a, b| a.0.cmp(b.0));
                    for (symbol, price) in lines {
                        let arrow = match last_seen.get(symbol) {
                            Some(prev) if price < prev => "▼".bright_red().to_string(),
                            Some(prev) if price > prev => "▲".bright_green().to_string(),
                            _ => "•".bright_black().to_string(),
                        };
                        println!("  {} {} ${:.2}", arrow, symbol.bright_white(), price);
                        last_seen.insert(symbol.clone(), *price);
                    }
                }
            }
        }

        hub.unsubscribe(subscription);
        feed.disconnect();

        println!();
        println!("{}", render_portfolio(&query.get_portfolio().await));
        Ok(())
    }
}
