//! Core business logic module
//!
//! This module contains the account model and the components built on it:
//! - `traits` - The balance oracle capability
//! - `oracle` - Oracle implementations and their configuration
//! - `bank_account` - The shared account handle and its operations
//! - `ledger` - Keyed account collection for sequential processing
//! - `async` - Concurrent ledger and batch processor

pub mod bank_account;
pub mod ledger;
pub mod oracle;
pub mod r#async;
pub mod traits;

pub use bank_account::BankAccount;
pub use ledger::Ledger;
pub use oracle::{
    FixedBalanceOracle, FnBalanceOracle, OracleConfig, RandomBalanceOracle, RandomOracleConfig,
    ScriptedBalanceOracle, UnavailableBalanceOracle,
};
pub use r#async::{AsyncLedger, BatchProcessor, ProcessingResult};
pub use traits::{BalanceOracle, FetchedBalance};
