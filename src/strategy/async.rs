//! Asynchronous batch processing strategy
//!
//! This module provides a multi-threaded implementation of the
//! ProcessingStrategy trait. It applies operation records in batches, with
//! records of unrelated accounts running in parallel.
//!
//! # Architecture
//!
//! ```text
//! AsyncProcessingStrategy
//!     ├── BatchConfig (batch_size, max_concurrent_batches)
//!     ├── AsyncReader (batch CSV reading)
//!     ├── BatchProcessor (account-group partitioning + tasks)
//!     └── AsyncLedger (DashMap of shared account handles)
//! ```
//!
//! # Ordering
//!
//! - Batches are processed one after another
//! - Within a batch, records are split into groups of connected accounts
//! - Each group runs sequentially in its own task; groups run in parallel
//!
//! The final balances therefore match a sequential run over the same input
//! whenever the oracle is deterministic. A seeded random oracle hands out the
//! same draws as in a sequential run, but which account receives which draw
//! depends on how parallel groups are scheduled.

use crate::core::r#async::{AsyncLedger, BatchProcessor};
use crate::core::BalanceOracle;
use crate::io::async_reader::AsyncReader;
use crate::io::csv_format::write_balances_csv;
use crate::strategy::ProcessingStrategy;
use crate::types::LedgerError;
use std::io::{ErrorKind, Write};
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Configuration for batch processing
///
/// Controls how records are batched and the number of worker threads for
/// parallel processing within each batch.
#[derive(Clone, Debug)]
pub struct BatchConfig {
    /// Number of records per batch
    pub batch_size: usize,
    /// Number of runtime worker threads
    pub max_concurrent_batches: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            batch_size: 1000,
            max_concurrent_batches: num_cpus::get(),
        }
    }
}

impl BatchConfig {
    /// Create a new BatchConfig with custom values
    ///
    /// A zero value falls back to the default with a warning.
    pub fn new(batch_size: usize, max_concurrent_batches: usize) -> Self {
        let default = Self::default();

        let batch_size = if batch_size == 0 {
            warn!(
                batch_size,
                default = default.batch_size,
                "invalid batch size, using default"
            );
            default.batch_size
        } else {
            batch_size
        };

        let max_concurrent_batches = if max_concurrent_batches == 0 {
            warn!(
                max_concurrent_batches,
                default = default.max_concurrent_batches,
                "invalid worker count, using default"
            );
            default.max_concurrent_batches
        } else {
            max_concurrent_batches
        };

        Self {
            batch_size,
            max_concurrent_batches,
        }
    }
}

/// Asynchronous batch processing strategy
///
/// # Configuration
///
/// The strategy accepts a BatchConfig with:
/// - `batch_size`: Number of records per batch (default: 1000)
/// - `max_concurrent_batches`: Number of worker threads (default: CPU cores)
#[derive(Debug, Clone)]
pub struct AsyncProcessingStrategy {
    /// Batch processing configuration
    config: BatchConfig,

    /// Oracle handed to every account opened while processing
    oracle: Arc<dyn BalanceOracle>,
}

impl AsyncProcessingStrategy {
    /// Create a new AsyncProcessingStrategy
    ///
    /// # Arguments
    ///
    /// * `config` - BatchConfig with batch_size and max_concurrent_batches
    /// * `oracle` - Balance oracle used by `sync` records
    pub fn new(config: BatchConfig, oracle: Arc<dyn BalanceOracle>) -> Self {
        Self { config, oracle }
    }

    /// The batch configuration in use
    pub fn config(&self) -> &BatchConfig {
        &self.config
    }
}

impl ProcessingStrategy for AsyncProcessingStrategy {
    /// Process operations from input file and write balances to output
    ///
    /// This method:
    /// 1. Creates a multi-threaded tokio runtime
    /// 2. Creates a fresh AsyncLedger and a BatchProcessor over it
    /// 3. Reads records in batches using AsyncReader
    /// 4. Processes each batch to completion before reading the next
    /// 5. Writes the final balances using csv_format::write_balances_csv
    ///
    /// # Error Handling
    ///
    /// Fatal errors (file not found, runtime or output errors) are returned
    /// immediately. Individual record errors are logged and processing
    /// continues.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.config.max_concurrent_batches)
            .enable_time()
            .build()
            .map_err(|e| LedgerError::Runtime {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        runtime.block_on(async {
            let ledger = Arc::new(AsyncLedger::new(Arc::clone(&self.oracle)));
            let processor = BatchProcessor::new(Arc::clone(&ledger));

            let file = tokio::fs::File::open(input_path)
                .await
                .map_err(|e| match e.kind() {
                    ErrorKind::NotFound => LedgerError::FileNotFound {
                        path: input_path.display().to_string(),
                    },
                    _ => LedgerError::IoError {
                        message: format!("Failed to open file '{}': {}", input_path.display(), e),
                    },
                })?;

            // Wrap tokio file in a compatibility layer for csv-async
            let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
            let mut reader = AsyncReader::new(compat_file);

            let mut applied = 0usize;
            let mut rejected = 0usize;
            let mut batches = 0usize;

            loop {
                let batch = reader.read_batch(self.config.batch_size).await;
                if batch.is_empty() {
                    break;
                }
                batches += 1;
                debug!(batch = batches, records = batch.len(), "processing batch");

                // Wait for the whole batch before reading the next one so that
                // accounts spanning batches keep their input order.
                for outcome in processor.process_batch(batch).await {
                    match outcome.result {
                        Ok(()) => applied += 1,
                        Err(e) => {
                            rejected += 1;
                            warn!(
                                operation = %outcome.record.op_type,
                                account = outcome.record.account,
                                error = %e,
                                "operation rejected"
                            );
                        }
                    }
                }
            }

            info!(
                applied,
                rejected,
                batches,
                accounts = ledger.len(),
                "batch processing finished"
            );

            write_balances_csv(&ledger.snapshots(), output)
        })
    }
}
