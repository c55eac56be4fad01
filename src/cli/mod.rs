//! CLI module for tradesizer
//!
//! Command-line interface for the paper-trading toolkit. Uses clap for
//! argument parsing and a structured command pattern: each subcommand owns
//! an Args struct and a Command struct with an `execute` method.

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub mod commands;

use crate::config::AppConfig;
use crate::data_paths::{DataPaths, DEFAULT_DATA_DIR};
use crate::logging::{self, LogMode, LoggingConfig};

use commands::buy::{BuyArgs, BuyCommand};
use commands::dca::{DcaArgs, DcaCommand};
use commands::portfolio::{PortfolioArgs, PortfolioCommand};
use commands::sell::{SellArgs, SellCommand};
use commands::size::{SizeArgs, SizeCommand};
use commands::watch::{WatchArgs, WatchCommand};

#[derive(Parser)]
#[command(name = "tradesizer")]
#[command(version)]
#[command(about = "Paper trading, position sizing, and DCA planning", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Data directory path (default: ./data)
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Config file path (YAML; defaults are used when omitted)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show the paper portfolio snapshot
    Portfolio(PortfolioArgs),

    /// Place a paper BUY order
    Buy(BuyArgs),

    /// Place a paper SELL order
    Sell(SellArgs),

    /// Stream simulated live prices into the portfolio
    Watch(WatchArgs),

    /// Size a position by risk percentage
    Size(SizeArgs),

    /// Plan a dollar-cost-averaging buy
    Dca(DcaArgs),
}

impl Cli {
    pub async fn execute(self) -> Result<()> {
        if self.verbose > 0 && std::env::var("RUST_LOG").is_err() {
            std::env::set_var("RUST_LOG", "debug");
        }

        let data_paths = DataPaths::new(&self.data_dir);
        logging::init_logging(LoggingConfig::new(
            LogMode::ConsoleAndFile,
            data_paths.clone(),
        ))?;

        let config = AppConfig::load(self.config.as_deref())?;

        match self.command {
            Commands::Portfolio(args) => {
                PortfolioCommand::new(args).execute(&config).await
            }
            Commands::Buy(args) => BuyCommand::new(args).execute(&config).await,
            Commands::Sell(args) => SellCommand::new(args).execute(&config).await,
            Commands::Watch(args) => WatchCommand::new(args).execute(&config).await,
            Commands::Size(args) => SizeCommand::new(args).execute(&config).await,
            Commands::Dca(args) => DcaCommand::new(args).execute(&config).await,
        }
    }
}
