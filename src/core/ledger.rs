//! Ledger module
//!
//! This module provides the `Ledger` struct which keeps the accounts named by
//! operation records and applies those records to them.
//!
//! The Ledger is responsible for:
//! - Opening accounts under a ledger key, sharing one balance oracle
//! - Resolving keys to accounts and reporting unknown keys
//! - Routing each operation record to the matching account operation
//! - Providing sorted balance snapshots for output

use crate::core::bank_account::BankAccount;
use crate::core::traits::BalanceOracle;
use crate::types::{AccountKey, AccountSnapshot, LedgerError, OperationRecord, OperationType};
use rust_decimal::Decimal;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Keyed collection of bank accounts
///
/// Single-threaded counterpart of [`AsyncLedger`](crate::core::AsyncLedger).
/// Every account opened here is wired to the ledger's oracle.
#[derive(Debug)]
pub struct Ledger {
    /// Map of ledger keys to account handles
    accounts: HashMap<AccountKey, BankAccount>,

    /// Oracle handed to every account opened by this ledger
    oracle: Arc<dyn BalanceOracle>,
}

impl Ledger {
    /// Create an empty ledger whose accounts synchronize against `oracle`
    pub fn new(oracle: Arc<dyn BalanceOracle>) -> Self {
        Ledger {
            accounts: HashMap::new(),
            oracle,
        }
    }

    /// Open an account under `key` with an initial balance
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An account is already registered under `key`
    /// - `initial_balance` is negative
    pub fn open(
        &mut self,
        key: AccountKey,
        initial_balance: Decimal,
    ) -> Result<&BankAccount, LedgerError> {
        match self.accounts.entry(key) {
            Entry::Occupied(_) => Err(LedgerError::duplicate_account(key)),
            Entry::Vacant(entry) => {
                let account = BankAccount::with_oracle(initial_balance, Arc::clone(&self.oracle))
                    .map_err(|e| LedgerError::account(key, e))?;
                Ok(&*entry.insert(account))
            }
        }
    }

    /// Look up the account registered under `key`
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if no account uses `key`.
    pub fn account(&self, key: AccountKey, operation: &str) -> Result<&BankAccount, LedgerError> {
        self.accounts
            .get(&key)
            .ok_or_else(|| LedgerError::account_not_found(key, operation))
    }

    /// Deposit `amount` into the account under `key`
    pub fn deposit(&self, key: AccountKey, amount: Decimal) -> Result<(), LedgerError> {
        self.account(key, "deposit")?
            .deposit(amount)
            .map_err(|e| LedgerError::account(key, e))
    }

    /// Withdraw `amount` from the account under `key`
    pub fn withdraw(&self, key: AccountKey, amount: Decimal) -> Result<(), LedgerError> {
        self.account(key, "withdraw")?
            .withdraw(amount)
            .map_err(|e| LedgerError::account(key, e))
    }

    /// Transfer `amount` between the accounts under `from` and `to`
    ///
    /// Both keys resolve to account handles first; `from == to` resolves to
    /// the same entity and is rejected by the account as a self transfer.
    ///
    /// # Errors
    ///
    /// Returns an error if either key is unknown, or if the account rejects
    /// the transfer (self transfer, invalid amount, insufficient funds).
    pub fn transfer(
        &self,
        from: AccountKey,
        to: AccountKey,
        amount: Decimal,
    ) -> Result<(), LedgerError> {
        let source = self.account(from, "transfer")?;
        let target = self.account(to, "transfer")?;
        source
            .transfer(amount, target)
            .map_err(|e| LedgerError::account(from, e))
    }

    /// Synchronize the account under `key` with the oracle
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is unknown or the oracle has no value.
    pub async fn synchronize(&self, key: AccountKey) -> Result<(), LedgerError> {
        self.account(key, "sync")?
            .synchronize_balance()
            .await
            .map_err(|e| LedgerError::account(key, e))
    }

    /// Apply a single operation record
    ///
    /// Routes the record to the operation named by its type.
    ///
    /// # Errors
    ///
    /// Returns an error if the record lacks a required amount or target, or
    /// if the routed operation fails.
    pub async fn apply(&mut self, record: OperationRecord) -> Result<(), LedgerError> {
        match record.op_type {
            OperationType::Open => {
                let amount = required_amount(&record)?;
                self.open(record.account, amount).map(|_| ())
            }
            OperationType::Deposit => self.deposit(record.account, required_amount(&record)?),
            OperationType::Withdraw => self.withdraw(record.account, required_amount(&record)?),
            OperationType::Transfer => {
                let amount = required_amount(&record)?;
                let target = required_target(&record)?;
                self.transfer(record.account, target, amount)
            }
            OperationType::Sync => self.synchronize(record.account).await,
        }
    }

    /// Number of open accounts
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// Whether no account has been opened
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Balance snapshots of every account, sorted by key
    pub fn snapshots(&self) -> Vec<AccountSnapshot> {
        let mut snapshots: Vec<AccountSnapshot> = self
            .accounts
            .iter()
            .map(|(key, account)| AccountSnapshot::new(*key, account.balance()))
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.account);
        snapshots
    }
}

/// Amount of a record whose operation requires one
pub(crate) fn required_amount(record: &OperationRecord) -> Result<Decimal, LedgerError> {
    record
        .amount
        .ok_or_else(|| LedgerError::missing_amount(record.op_type.as_str(), record.account))
}

/// Target of a transfer record
pub(crate) fn required_target(record: &OperationRecord) -> Result<AccountKey, LedgerError> {
    record.target.ok_or(LedgerError::MissingTarget {
        account: record.account,
    })
}
