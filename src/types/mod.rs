//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identifiers and snapshots
//! - `operation`: Operation types and records
//! - `error`: Error types for accounts, the ledger and configuration

pub mod account;
pub mod error;
pub mod operation;

pub use account::{AccountId, AccountKey, AccountSnapshot};
pub use error::{AccountError, ConfigError, LedgerError};
pub use operation::{OperationRecord, OperationType};
