//! Processing strategy module for ledger processing
//!
//! This module defines the Strategy pattern for complete processing pipelines,
//! encompassing both CSV parsing and applying operations to a ledger. This
//! allows different implementations (sequential, concurrent batch) to be
//! selected at runtime.

use crate::cli::StrategyType;
use crate::core::BalanceOracle;
use crate::types::LedgerError;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

/// Processing strategy trait for complete ledger pipelines
///
/// Each strategy reads operation records from a CSV file, applies them to a
/// fresh ledger and writes the final balances to output.
pub trait ProcessingStrategy: Send + Sync {
    /// Process operations from input file and write balances to output
    ///
    /// # Arguments
    ///
    /// * `input_path` - Path to the input CSV file containing operation records
    /// * `output` - Writer receiving the final balances
    ///
    /// # Returns
    ///
    /// * `Ok(())` if processing completed (possibly with rejected records)
    /// * `Err(LedgerError)` if a fatal error occurred
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The input file cannot be opened (file not found, permission denied)
    /// - The async runtime cannot be created
    /// - Output cannot be written
    ///
    /// Rejected records (unknown account, insufficient funds, failed
    /// synchronization, malformed rows) are logged at `warn` level and do not
    /// stop processing.
    fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), LedgerError>;
}

/// Create a processing strategy based on the specified strategy type
///
/// # Arguments
///
/// * `strategy_type` - The type of processing strategy to create (Sync or Async)
/// * `config` - Optional configuration for async batch processing (ignored for sync)
/// * `oracle` - Balance oracle handed to every account the strategy opens
///
/// # Returns
///
/// A boxed trait object implementing the ProcessingStrategy trait
pub fn create_strategy(
    strategy_type: StrategyType,
    config: Option<BatchConfig>,
    oracle: Arc<dyn BalanceOracle>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(oracle)),
        StrategyType::Async => {
            let config = config.unwrap_or_default();
            Box::new(AsyncProcessingStrategy::new(config, oracle))
        }
    }
}
