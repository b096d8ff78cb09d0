//! Operation-related types for the Rust Bank Ledger
//!
//! This module defines the operation types a ledger understands and the
//! record structure produced by the CSV readers.

use super::account::AccountKey;
use rust_decimal::Decimal;
use std::fmt;

/// Operations supported by the ledger
///
/// Each variant maps onto one account operation. `Open` creates the account,
/// the remaining variants act on an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationType {
    /// Create an account with an initial balance
    Open,

    /// Credit funds to an account
    Deposit,

    /// Debit funds from an account
    ///
    /// Requires sufficient balance to succeed.
    Withdraw,

    /// Move funds from one account to a different account
    ///
    /// Requires a target account and sufficient balance on the source.
    Transfer,

    /// Replace the balance with the value reported by the balance oracle
    Sync,
}

impl OperationType {
    /// Whether records of this type must carry an amount
    pub fn requires_amount(self) -> bool {
        !matches!(self, OperationType::Sync)
    }

    /// Lowercase name used in CSV input and log messages
    pub fn as_str(self) -> &'static str {
        match self {
            OperationType::Open => "open",
            OperationType::Deposit => "deposit",
            OperationType::Withdraw => "withdraw",
            OperationType::Transfer => "transfer",
            OperationType::Sync => "sync",
        }
    }
}

impl fmt::Display for OperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Input operation record
///
/// Represents a single operation as read from the input CSV file. The amount
/// is optional because `sync` records carry none, and the target is only
/// meaningful for transfers.
#[derive(Debug, Clone, PartialEq)]
pub struct OperationRecord {
    /// The operation to perform
    pub op_type: OperationType,

    /// The account the operation applies to (the source, for transfers)
    pub account: AccountKey,

    /// Operation amount, or the initial balance for `open`
    pub amount: Option<Decimal>,

    /// Receiving account of a transfer
    pub target: Option<AccountKey>,
}

impl OperationRecord {
    /// Every account key this record touches, source first
    pub fn accounts(&self) -> impl Iterator<Item = AccountKey> {
        std::iter::once(self.account).chain(self.target)
    }
}
