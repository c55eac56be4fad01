//! Portfolio display formatting for the CLI

use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use rust_decimal::Decimal;

use crate::portfolio::types::Portfolio;

/// Render a full snapshot: account summary plus holdings table
pub fn render_portfolio(portfolio: &Portfolio) -> String {
    let mut output = String::new();

    output.push_str(&format!("{}\n", "ACCOUNT SUMMARY".bright_yellow()));
    output.push_str(&format!("{}\n", "─".repeat(50).bright_black()));
    output.push_str(&format!(
        "💵 Cash: {}\n",
        format!("${:.2}", portfolio.cash).bright_green()
    ));
    output.push_str(&format!(
        "📈 Holdings Value: {}\n",
        format!("${:.2}", portfolio.holdings_value()).bright_green()
    ));
    output.push_str(&format!(
        "💰 Total Equity: {}\n",
        format!("${:.2}", portfolio.total_equity).bright_cyan()
    ));

    output.push_str(&format!("\n{}\n", "HOLDINGS".bright_yellow()));
    if portfolio.holdings.is_empty() {
        output.push_str(&format!(
            "{}\n",
            "No open positions".bright_black().italic()
        ));
        return output;
    }

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Symbol", "Shares", "Avg Price", "Last Price", "Value", "P&L",
        ]);

    for holding in &portfolio.holdings {
        let pnl = holding.unrealized_pnl();
        let pnl_display = if pnl >= Decimal::ZERO {
            format!("+{:.2}", pnl).bright_green().to_string()
        } else {
            format!("{:.2}", pnl).bright_red().to_string()
        };

        table.add_row(vec![
            holding.symbol.clone(),
            holding.shares.to_string(),
            format!("${:.2}", holding.avg_price),
            format!("${:.2}", holding.current_price),
            format!("${:.2}", holding.market_value()),
            pnl_display,
        ]);
    }

    output.push_str(&format!("{}\n", table));
    output
}
