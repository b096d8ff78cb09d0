//! Rust Bank Ledger Library
//! # Overview
//!
//! This library models bank accounts with a mutable balance and an injected
//! source of authoritative balances, and a streaming CSV processor that applies
//! account operations with either a sequential or a batched parallel strategy.
//!
//! # Architecture
//!
//! The system is organized into several key components:
//!
//! - [`types`] - Core data types (keys, operation records, errors)
//! - [`cli`] - CLI arguments parsing
//! - [`core`] - Business logic components:
//!   - [`core::bank_account`] - Shared account handle with deposit, withdraw,
//!     transfer and balance synchronization
//!   - [`core::traits`] - The balance oracle capability
//!   - [`core::oracle`] - Random, fixed, unavailable and scripted oracles
//!   - [`core::ledger`] - Keyed account collection
//!   - [`core::r#async`] - Concurrent ledger and batch processor
//! - [`io`] - CSV input and balance output
//! - [`strategy`] - Complete processing pipelines
//!
//! # Operations
//!
//! - **Open**: Register an account with a non-negative initial balance
//! - **Deposit**: Credit a positive amount
//! - **Withdraw**: Debit a positive amount not exceeding the balance
//! - **Transfer**: Move a positive amount to a different account, atomically
//! - **Sync**: Overwrite the balance with the value reported by the oracle
//!
//! # Example
//!
//! ```
//! use rust_bank_ledger::core::{BankAccount, UnavailableBalanceOracle};
//! use rust_decimal::Decimal;
//! use std::sync::Arc;
//!
//! let oracle = Arc::new(UnavailableBalanceOracle);
//! let a = BankAccount::with_oracle(Decimal::from(1000), oracle.clone()).unwrap();
//! let b = BankAccount::with_oracle(Decimal::from(100), oracle).unwrap();
//!
//! a.withdraw(Decimal::from(200)).unwrap();
//! a.transfer(Decimal::from(500), &b).unwrap();
//!
//! assert_eq!(a.balance(), Decimal::from(300));
//! assert_eq!(b.balance(), Decimal::from(600));
//! assert!(a.transfer(Decimal::from(1), &a).is_err());
//! ```

pub mod cli;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{AsyncLedger, BalanceOracle, BankAccount, FetchedBalance, Ledger};
pub use io::write_balances_csv;
pub use types::{
    AccountError, AccountId, AccountKey, AccountSnapshot, ConfigError, LedgerError,
    OperationRecord, OperationType,
};
