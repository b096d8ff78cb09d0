//! Account-related types for the Rust Bank Ledger
//!
//! This module defines the identifiers used to address accounts and the
//! snapshot structure emitted when the ledger reports final balances.

use rust_decimal::Decimal;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Ledger key for an account as it appears in operation records
///
/// Supports account keys from 0 to 65,535
pub type AccountKey = u16;

static NEXT_ACCOUNT_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque, process-unique identity of an account entity
///
/// Every [`BankAccount`](crate::core::BankAccount) receives a fresh id when it
/// is constructed. Two accounts never share an id, even when their balances
/// are equal, so the id can stand in for the entity in error messages and
/// when ordering locks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AccountId(u64);

impl AccountId {
    /// Allocate the next unused account id
    pub(crate) fn next() -> Self {
        AccountId(NEXT_ACCOUNT_ID.fetch_add(1, Ordering::Relaxed))
    }

    #[cfg(test)]
    pub(crate) fn from_raw(raw: u64) -> Self {
        AccountId(raw)
    }

    /// Raw numeric value of the id
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Point-in-time view of an account held by a ledger
///
/// Produced when the ledger reports its final state; it does not keep the
/// account alive or observe later mutations.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountSnapshot {
    /// The ledger key of the account
    pub account: AccountKey,

    /// Balance at the time the snapshot was taken
    pub balance: Decimal,
}

impl AccountSnapshot {
    /// Create a snapshot for the given key and balance
    pub fn new(account: AccountKey, balance: Decimal) -> Self {
        AccountSnapshot { account, balance }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_ids_are_unique() {
        let first = AccountId::next();
        let second = AccountId::next();
        assert_ne!(first, second);
        assert!(second > first);
    }

    #[test]
    fn test_account_id_display() {
        let id = AccountId(42);
        assert_eq!(id.to_string(), "#42");
        assert_eq!(id.get(), 42);
    }
}
