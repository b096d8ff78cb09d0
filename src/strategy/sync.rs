//! Sequential processing strategy
//!
//! This module provides a single-threaded implementation of the
//! ProcessingStrategy trait. It coordinates the SyncReader (for CSV input)
//! and the Ledger (for account operations).
//!
//! # Design
//!
//! The SyncProcessingStrategy focuses on orchestration, delegating:
//! - CSV parsing to `SyncReader` (iterator interface)
//! - Account operations to `Ledger`
//! - CSV output to `csv_format::write_balances_csv`
//!
//! Synchronization queries the oracle asynchronously, so records are applied
//! inside a current-thread tokio runtime, one at a time and in input order.
//!
//! # Memory Efficiency
//!
//! CSV records are streamed one at a time; memory usage is O(accounts), not
//! O(records).

use crate::core::{BalanceOracle, Ledger};
use crate::io::csv_format::write_balances_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::ProcessingStrategy;
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Sequential processing strategy
///
/// # Examples
///
/// ```no_run
/// use rust_bank_ledger::core::FixedBalanceOracle;
/// use rust_bank_ledger::strategy::{ProcessingStrategy, SyncProcessingStrategy};
/// use rust_decimal::Decimal;
/// use std::path::Path;
/// use std::sync::Arc;
///
/// let oracle = Arc::new(FixedBalanceOracle::new(Decimal::from(50)));
/// let strategy = SyncProcessingStrategy::new(oracle);
/// let mut output = std::io::stdout();
///
/// strategy.process(Path::new("operations.csv"), &mut output)
///     .expect("Processing failed");
/// ```
#[derive(Debug, Clone)]
pub struct SyncProcessingStrategy {
    /// Oracle handed to every account opened while processing
    oracle: Arc<dyn BalanceOracle>,
}

impl SyncProcessingStrategy {
    /// Create a new SyncProcessingStrategy using `oracle` for synchronization
    pub fn new(oracle: Arc<dyn BalanceOracle>) -> Self {
        Self { oracle }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    /// Process operations from input file and write balances to output
    ///
    /// This method:
    /// 1. Creates a SyncReader to stream records from the CSV file
    /// 2. Creates a fresh Ledger sharing this strategy's oracle
    /// 3. Applies each record in order, logging rejected ones
    /// 4. Writes the final balances using csv_format::write_balances_csv
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, runtime or output errors) are returned
    /// immediately. Individual record errors are logged and processing
    /// continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_time()
            .build()
            .map_err(|e| LedgerError::Runtime {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let mut ledger = Ledger::new(Arc::clone(&self.oracle));
        let reader = SyncReader::new(input_path)?;

        let (applied, rejected) = runtime.block_on(async {
            let mut applied = 0usize;
            let mut rejected = 0usize;

            for result in reader {
                match result {
                    Ok(record) => match ledger.apply(record).await {
                        Ok(()) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            warn!(error = %e, "operation rejected");
                        }
                    },
                    Err(e) => {
                        rejected += 1;
                        warn!(error = %e, "skipping invalid record");
                    }
                }
            }

            (applied, rejected)
        });

        info!(
            applied,
            rejected,
            accounts = ledger.len(),
            "sequential processing finished"
        );

        write_balances_csv(&ledger.snapshots(), output)
    }
}
