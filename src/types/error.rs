//! Error types for the Rust Bank Ledger
//!
//! This module defines all error types that can occur while operating on
//! accounts and ledgers. Errors are designed to be descriptive and
//! user-friendly for CLI output.
//!
//! # Error Categories
//!
//! - **Account Errors**: the closed set of failures of a single account
//!   operation ([`AccountError`])
//! - **Ledger Errors**: unknown or duplicate accounts, malformed operation
//!   records, file I/O and CSV parsing ([`LedgerError`])
//! - **Configuration Errors**: invalid balance oracle settings ([`ConfigError`])

use super::account::{AccountId, AccountKey};
use rust_decimal::Decimal;
use thiserror::Error;

/// Failure of a single account operation
///
/// Every mutating account operation either succeeds completely or fails with
/// exactly one of these variants, leaving the balance untouched. Callers are
/// expected to treat them as recoverable outcomes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// The amount is not positive, or cannot be applied to the balance
    #[error("Invalid amount {amount}: must be positive and representable in the balance")]
    InvalidAmount {
        /// The rejected amount
        amount: Decimal,
    },

    /// The requested decrease exceeds the available balance
    #[error("Insufficient funds in account {account}: available {available}, requested {requested}")]
    InsufficientFunds {
        /// Account that would have been debited
        account: AccountId,
        /// Balance at the time of the request
        available: Decimal,
        /// Requested amount
        requested: Decimal,
    },

    /// A transfer named its own source account as the target
    #[error("Account {account} cannot transfer to itself")]
    TransferToSelf {
        /// The account on both sides of the transfer
        account: AccountId,
    },

    /// The balance oracle reported no usable value
    #[error("Balance synchronization failed for account {account}")]
    SynchronizationFailed {
        /// Account whose synchronization failed
        account: AccountId,
    },
}

impl AccountError {
    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: Decimal) -> Self {
        AccountError::InvalidAmount { amount }
    }

    /// Create an InsufficientFunds error
    pub fn insufficient_funds(account: AccountId, available: Decimal, requested: Decimal) -> Self {
        AccountError::InsufficientFunds {
            account,
            available,
            requested,
        }
    }

    /// Create a TransferToSelf error
    pub fn transfer_to_self(account: AccountId) -> Self {
        AccountError::TransferToSelf { account }
    }

    /// Create a SynchronizationFailed error
    pub fn synchronization_failed(account: AccountId) -> Self {
        AccountError::SynchronizationFailed { account }
    }
}

/// Main error type for ledgers and the processing pipeline
///
/// This enum covers everything that can go wrong between reading an
/// operation record and applying it to an account. Each variant includes
/// relevant context to help diagnose the issue.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Unknown operation type encountered
    #[error("Invalid operation type '{op_type}' for account {account}")]
    InvalidOperationType {
        /// The invalid operation type string
        op_type: String,
        /// Account named by the record
        account: AccountKey,
    },

    /// Amount field is missing for an operation that requires it
    #[error("{op_type} operation for account {account} requires an amount")]
    MissingAmount {
        /// Operation type that requires an amount
        op_type: String,
        /// Account named by the record
        account: AccountKey,
    },

    /// Amount field could not be parsed as a number
    #[error("Malformed amount '{amount}' for account {account}")]
    MalformedAmount {
        /// The raw amount text
        amount: String,
        /// Account named by the record
        account: AccountKey,
    },

    /// Transfer record without a target account
    #[error("transfer operation for account {account} requires a target")]
    MissingTarget {
        /// Source account named by the record
        account: AccountKey,
    },

    /// No account is registered under the key
    #[error("Account {account} not found for {operation}")]
    AccountNotFound {
        /// The unknown key
        account: AccountKey,
        /// Operation that failed
        operation: String,
    },

    /// An account is already registered under the key
    #[error("Account {account} already exists")]
    DuplicateAccount {
        /// The key that is already taken
        account: AccountKey,
    },

    /// The account rejected the operation
    #[error("Account {account}: {source}")]
    Account {
        /// Ledger key of the account that rejected the operation
        account: AccountKey,
        /// The account-level failure
        source: AccountError,
    },

    /// The async runtime could not be created
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the runtime failure
        message: String,
    },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// Create an AccountNotFound error
    pub fn account_not_found(account: AccountKey, operation: &str) -> Self {
        LedgerError::AccountNotFound {
            account,
            operation: operation.to_string(),
        }
    }

    /// Create a DuplicateAccount error
    pub fn duplicate_account(account: AccountKey) -> Self {
        LedgerError::DuplicateAccount { account }
    }

    /// Wrap an account-level failure with the ledger key it happened on
    pub fn account(account: AccountKey, source: AccountError) -> Self {
        LedgerError::Account { account, source }
    }

    /// Create a MissingAmount error
    pub fn missing_amount(op_type: &str, account: AccountKey) -> Self {
        LedgerError::MissingAmount {
            op_type: op_type.to_string(),
            account,
        }
    }

    /// Create a MalformedAmount error
    pub fn malformed_amount(amount: &str, account: AccountKey) -> Self {
        LedgerError::MalformedAmount {
            amount: amount.to_string(),
            account,
        }
    }

    /// Create an InvalidOperationType error
    pub fn invalid_operation_type(op_type: &str, account: AccountKey) -> Self {
        LedgerError::InvalidOperationType {
            op_type: op_type.to_string(),
            account,
        }
    }

    /// The account-level failure behind this error, if any
    pub fn account_error(&self) -> Option<&AccountError> {
        match self {
            LedgerError::Account { source, .. } => Some(source),
            _ => None,
        }
    }
}

/// Invalid balance oracle configuration
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Failure rate outside `0.0..=1.0`
    #[error("Invalid oracle failure rate {0}: expected a value between 0 and 1")]
    InvalidFailureRate(f64),

    /// A fixed oracle was requested without a value
    #[error("The fixed oracle requires a balance value (--oracle-value)")]
    MissingFixedBalance,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal::Decimal;

    #[rstest]
    #[case::invalid_amount(
        AccountError::InvalidAmount { amount: Decimal::new(-5, 0) },
        "Invalid amount -5: must be positive and representable in the balance"
    )]
    #[case::insufficient_funds(
        AccountError::InsufficientFunds { account: AccountId::from_raw(7), available: Decimal::new(5000, 4), requested: Decimal::new(10000, 4) },
        "Insufficient funds in account #7: available 0.5000, requested 1.0000"
    )]
    #[case::transfer_to_self(
        AccountError::TransferToSelf { account: AccountId::from_raw(3) },
        "Account #3 cannot transfer to itself"
    )]
    #[case::synchronization_failed(
        AccountError::SynchronizationFailed { account: AccountId::from_raw(9) },
        "Balance synchronization failed for account #9"
    )]
    fn test_account_error_display(#[case] error: AccountError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[rstest]
    #[case::file_not_found(
        LedgerError::FileNotFound { path: "ops.csv".to_string() },
        "File not found: ops.csv"
    )]
    #[case::parse_error_with_line(
        LedgerError::ParseError { line: Some(42), message: "Invalid field".to_string() },
        "CSV parse error at line 42: Invalid field"
    )]
    #[case::parse_error_without_line(
        LedgerError::ParseError { line: None, message: "Invalid field".to_string() },
        "CSV parse error: Invalid field"
    )]
    #[case::missing_amount(
        LedgerError::missing_amount("deposit", 1),
        "deposit operation for account 1 requires an amount"
    )]
    #[case::missing_target(
        LedgerError::MissingTarget { account: 4 },
        "transfer operation for account 4 requires a target"
    )]
    #[case::account_not_found(
        LedgerError::account_not_found(12, "withdraw"),
        "Account 12 not found for withdraw"
    )]
    #[case::duplicate_account(
        LedgerError::duplicate_account(2),
        "Account 2 already exists"
    )]
    #[case::wrapped_account_error(
        LedgerError::account(5, AccountError::invalid_amount(Decimal::ZERO)),
        "Account 5: Invalid amount 0: must be positive and representable in the balance"
    )]
    fn test_ledger_error_display(#[case] error: LedgerError, #[case] expected: &str) {
        assert_eq!(error.to_string(), expected);
    }

    #[test]
    fn test_account_error_accessor() {
        let inner = AccountError::invalid_amount(Decimal::NEGATIVE_ONE);
        let error = LedgerError::account(1, inner.clone());
        assert_eq!(error.account_error(), Some(&inner));
        assert_eq!(LedgerError::duplicate_account(1).account_error(), None);
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error =
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "Permission denied");
        let error: LedgerError = io_error.into();
        assert!(matches!(error, LedgerError::IoError { .. }));
        assert_eq!(error.to_string(), "I/O error: Permission denied");
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(
            ConfigError::InvalidFailureRate(1.5).to_string(),
            "Invalid oracle failure rate 1.5: expected a value between 0 and 1"
        );
    }
}
