use crate::core::{OracleConfig, RandomOracleConfig};
use crate::strategy::BatchConfig;
use crate::types::ConfigError;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Apply account operations from a CSV file and print the final balances
#[derive(Parser, Debug)]
#[command(name = "bank-ledger")]
#[command(about = "Apply account operations from a CSV file and print the final balances", long_about = None)]
pub struct CliArgs {
    /// Input CSV file path containing operation records
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Processing strategy
    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "async",
        help = "Processing strategy: 'sync' for sequential or 'async' for batched parallel"
    )]
    pub strategy: StrategyType,

    /// Number of records per batch (async mode only)
    #[arg(
        long = "batch-size",
        value_name = "SIZE",
        help = "Number of records per batch (default: 1000)"
    )]
    pub batch_size: Option<usize>,

    /// Number of worker threads (async mode only)
    #[arg(
        long = "max-concurrent",
        value_name = "COUNT",
        help = "Number of worker threads (default: CPU cores)"
    )]
    pub max_concurrent_batches: Option<usize>,

    /// Balance oracle used by `sync` records
    #[arg(
        long = "oracle",
        value_name = "KIND",
        env = "LEDGER_ORACLE",
        default_value = "random",
        help = "Balance oracle: 'random', 'fixed' or 'unavailable'"
    )]
    pub oracle: OracleKind,

    /// Balance reported by the fixed oracle
    #[arg(
        long = "oracle-value",
        value_name = "AMOUNT",
        env = "LEDGER_ORACLE_VALUE",
        help = "Balance reported by the fixed oracle (required with --oracle fixed)"
    )]
    pub oracle_value: Option<Decimal>,

    /// Probability that the random oracle reports no value
    #[arg(
        long = "oracle-failure-rate",
        value_name = "RATE",
        env = "LEDGER_ORACLE_FAILURE_RATE",
        default_value_t = 0.5,
        help = "Probability between 0 and 1 that the random oracle fails"
    )]
    pub oracle_failure_rate: f64,

    /// Largest balance the random oracle reports
    #[arg(
        long = "oracle-max-balance",
        value_name = "AMOUNT",
        env = "LEDGER_ORACLE_MAX_BALANCE",
        default_value_t = 100,
        help = "Random oracle balances are drawn from 0 to this value inclusive"
    )]
    pub oracle_max_balance: u32,

    /// Simulated oracle latency in milliseconds
    #[arg(
        long = "oracle-delay-ms",
        value_name = "MILLIS",
        env = "LEDGER_ORACLE_DELAY_MS",
        default_value_t = 0,
        help = "Delay before the random oracle answers"
    )]
    pub oracle_delay_ms: u64,

    /// Seed for the random oracle
    #[arg(
        long = "oracle-seed",
        value_name = "SEED",
        env = "LEDGER_ORACLE_SEED",
        help = "Seed for the random oracle; runs are reproducible with --strategy sync"
    )]
    pub oracle_seed: Option<u64>,
}

/// Available processing strategies
#[derive(Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

/// Available balance oracles
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OracleKind {
    Random,
    Fixed,
    Unavailable,
}

impl CliArgs {
    /// Create a BatchConfig from CLI arguments
    ///
    /// Uses the provided values where given and the defaults otherwise.
    /// Invalid values are replaced by their defaults with a warning.
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Create an OracleConfig from CLI arguments
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `--oracle fixed` is selected without `--oracle-value`
    /// - The random oracle's failure rate is outside `0.0..=1.0`
    pub fn to_oracle_config(&self) -> Result<OracleConfig, ConfigError> {
        match self.oracle {
            OracleKind::Random => {
                let config = RandomOracleConfig {
                    failure_rate: self.oracle_failure_rate,
                    max_balance: self.oracle_max_balance,
                    delay_ms: self.oracle_delay_ms,
                    seed: self.oracle_seed,
                };
                config.validate()?;
                Ok(OracleConfig::Random(config))
            }
            OracleKind::Fixed => self
                .oracle_value
                .map(OracleConfig::Fixed)
                .ok_or(ConfigError::MissingFixedBalance),
            OracleKind::Unavailable => Ok(OracleConfig::Unavailable),
        }
    }
}
