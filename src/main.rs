//! Bank Ledger CLI
//!
//! Command-line interface for applying account operations from CSV files.
//!
//! # Usage
//!
//! ```bash
//! cargo run -- operations.csv > balances.csv
//! cargo run -- --strategy sync operations.csv > balances.csv
//! cargo run -- --oracle fixed --oracle-value 50 operations.csv > balances.csv
//! cargo run -- --strategy async --batch-size 2000 --max-concurrent 8 operations.csv > balances.csv
//! RUST_LOG=info cargo run -- --oracle-seed 7 operations.csv
//! ```
//!
//! The program reads operation records from the input CSV file, applies them
//! using the selected processing strategy, and writes the final balances to
//! stdout. Diagnostics go to stderr through `tracing`; the level defaults to
//! `warn` and can be changed with `RUST_LOG`.
//!
//! # Processing Strategies
//!
//! - **sync**: Sequential processing on a single thread
//! - **async**: Batched processing with parallel account groups (default)
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Error (invalid configuration, file not found, file not readable, etc.)

use rust_bank_ledger::cli;
use rust_bank_ledger::strategy;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let args = cli::parse_args();

    let oracle = match args.to_oracle_config().and_then(|config| config.build()) {
        Ok(oracle) => oracle,
        Err(e) => {
            tracing::error!(error = %e, "invalid oracle configuration");
            process::exit(1);
        }
    };

    let strategy = {
        let config = if matches!(args.strategy, cli::StrategyType::Async) {
            Some(args.to_batch_config())
        } else {
            None
        };
        strategy::create_strategy(args.strategy, config, oracle)
    };

    let mut output = std::io::stdout();
    if let Err(e) = strategy.process(&args.input_file, &mut output) {
        tracing::error!(error = %e, "processing failed");
        process::exit(1);
    }
}
