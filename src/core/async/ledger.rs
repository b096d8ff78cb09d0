//! Thread-safe ledger for async batch processing
//!
//! This module provides the `AsyncLedger` struct, which keeps account handles
//! in a concurrent map so that operation records for unrelated accounts can
//! be applied from several tokio tasks at once.
//!
//! # Design
//!
//! The `AsyncLedger` uses `DashMap` for fine-grained locking of the key to
//! account mapping. Balances themselves are guarded inside each
//! [`BankAccount`], so the map is only locked long enough to clone a handle.
//! No map guard is ever held across an `.await`.

use crate::core::bank_account::BankAccount;
use crate::core::ledger::{required_amount, required_target};
use crate::core::traits::BalanceOracle;
use crate::types::{AccountKey, AccountSnapshot, LedgerError, OperationRecord, OperationType};
use dashmap::DashMap;
use rust_decimal::Decimal;
use std::sync::Arc;

/// Thread-safe keyed collection of bank accounts
///
/// `AsyncLedger` offers the same operations as [`Ledger`](crate::core::Ledger)
/// through `&self`, so it can be shared behind an `Arc` by many tasks.
///
/// # Thread Safety
///
/// All methods are safe to call concurrently. Operations on one account are
/// serialized by that account's own lock. A synchronization in flight does
/// not block other operations on the same account; see
/// [`BankAccount::synchronize_balance`].
#[derive(Debug)]
pub struct AsyncLedger {
    /// Concurrent map of ledger keys to account handles
    accounts: DashMap<AccountKey, BankAccount>,

    /// Oracle handed to every account opened by this ledger
    oracle: Arc<dyn BalanceOracle>,
}

impl AsyncLedger {
    /// Create an empty ledger whose accounts synchronize against `oracle`
    pub fn new(oracle: Arc<dyn BalanceOracle>) -> Self {
        Self {
            accounts: DashMap::new(),
            oracle,
        }
    }

    /// Open an account under `key` with an initial balance
    ///
    /// If several tasks race to open the same key, exactly one succeeds and
    /// the others observe `DuplicateAccount`.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - An account is already registered under `key`
    /// - `initial_balance` is negative
    pub fn open(&self, key: AccountKey, initial_balance: Decimal) -> Result<(), LedgerError> {
        let account = BankAccount::with_oracle(initial_balance, Arc::clone(&self.oracle))
            .map_err(|e| LedgerError::account(key, e))?;

        let mut inserted = false;
        self.accounts.entry(key).or_insert_with(|| {
            inserted = true;
            account
        });

        if inserted {
            Ok(())
        } else {
            Err(LedgerError::duplicate_account(key))
        }
    }

    /// Clone the handle registered under `key`
    ///
    /// The returned handle refers to the live account; the map guard is
    /// released before this method returns.
    ///
    /// # Errors
    ///
    /// Returns `LedgerError::AccountNotFound` if no account uses `key`.
    pub fn account(&self, key: AccountKey, operation: &str) -> Result<BankAccount, LedgerError> {
        self.accounts
            .get(&key)
            .map(|entry| entry.value().clone())
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
            .transfer(amount, &target)
            .map_err(|e| LedgerError::account(from, e))
    }

    /// Synchronize the account under `key` with the oracle
    ///
    /// # Errors
    ///
    /// Returns an error if `key` is unknown or the oracle has no value.
    pub async fn synchronize(&self, key: AccountKey) -> Result<(), LedgerError> {
        let account = self.account(key, "sync")?;
        account
            .synchronize_balance()
            .await
            .map_err(|e| LedgerError::account(key, e))
    }

    /// Apply a single operation record
    ///
    /// # Errors
    ///
    /// Returns an error if the record lacks a required amount or target, or
    /// if the routed operation fails.
    pub async fn apply(&self, record: &OperationRecord) -> Result<(), LedgerError> {
        match record.op_type {
            OperationType::Open => self.open(record.account, required_amount(record)?),
            OperationType::Deposit => self.deposit(record.account, required_amount(record)?),
            OperationType::Withdraw => self.withdraw(record.account, required_amount(record)?),
            OperationType::Transfer => {
                let amount = required_amount(record)?;
                let target = required_target(record)?;
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
    ///
    /// Each balance is read at the time of the call; accounts may be opened
    /// or modified by other tasks afterwards.
    pub fn snapshots(&self) -> Vec<AccountSnapshot> {
        let mut snapshots: Vec<AccountSnapshot> = self
            .accounts
            .iter()
            .map(|entry| AccountSnapshot::new(*entry.key(), entry.value().balance()))
            .collect();
        snapshots.sort_by_key(|snapshot| snapshot.account);
        snapshots
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oracle::{FixedBalanceOracle, UnavailableBalanceOracle};
    use crate::types::AccountError;

    fn fixed_ledger() -> AsyncLedger {
        AsyncLedger::new(Arc::new(FixedBalanceOracle::new(Decimal::from(50))))
    }

    #[test]
    fn test_open_and_duplicate() {
        let ledger = fixed_ledger();

        ledger.open(1, Decimal::from(100)).unwrap();
        let err = ledger.open(1, Decimal::from(7)).unwrap_err();

        assert_eq!(err, LedgerError::duplicate_account(1));
        assert_eq!(ledger.len(), 1);
        assert_eq!(
            ledger.account(1, "test").unwrap().balance(),
            Decimal::from(100)
        );
    }

    #[test]
    fn test_open_rejects_negative_initial_balance() {
        let ledger = fixed_ledger();

        let err = ledger.open(1, Decimal::from(-10)).unwrap_err();

        assert!(matches!(
            err.account_error(),
            Some(AccountError::InvalidAmount { .. })
        ));
        assert!(ledger.is_empty());
    }

    #[test]
    fn test_handles_refer_to_live_account() {
        let ledger = fixed_ledger();
        ledger.open(1, Decimal::from(10)).unwrap();

        let handle = ledger.account(1, "test").unwrap();
        ledger.deposit(1, Decimal::from(5)).unwrap();

        assert_eq!(handle.balance(), Decimal::from(15));
    }

    #[test]
    fn test_transfer_and_self_transfer() {
        let ledger = fixed_ledger();
        ledger.open(1, Decimal::from(1000)).unwrap();
        ledger.open(2, Decimal::from(100)).unwrap();

        ledger.transfer(1, 2, Decimal::from(500)).unwrap();
        let err = ledger.transfer(2, 2, Decimal::from(1)).unwrap_err();

        assert!(matches!(
            err.account_error(),
            Some(AccountError::TransferToSelf { .. })
        ));
        assert_eq!(
            ledger.snapshots(),
            vec![
                AccountSnapshot::new(1, Decimal::from(500)),
                AccountSnapshot::new(2, Decimal::from(600)),
            ]
        );
    }

    #[test]
    fn test_unknown_accounts() {
        let ledger = fixed_ledger();

        assert_eq!(
            ledger.withdraw(4, Decimal::ONE),
            Err(LedgerError::account_not_found(4, "withdraw"))
        );
        assert!(ledger.account(4, "test").is_err());
    }

    #[tokio::test]
    async fn test_apply_and_synchronize() {
        let ledger = fixed_ledger();

        for record in [
            OperationRecord {
                op_type: OperationType::Open,
                account: 1,
                amount: Some(Decimal::from(10)),
                target: None,
            },
            OperationRecord {
                op_type: OperationType::Withdraw,
                account: 1,
                amount: Some(Decimal::from(4)),
                target: None,
            },
        ] {
            ledger.apply(&record).await.unwrap();
        }
        assert_eq!(ledger.snapshots()[0].balance, Decimal::from(6));

        ledger
            .apply(&OperationRecord {
                op_type: OperationType::Sync,
                account: 1,
                amount: None,
                target: None,
            })
            .await
            .unwrap();
        assert_eq!(ledger.snapshots()[0].balance, Decimal::from(50));
    }

    #[tokio::test]
    async fn test_synchronize_failure_keeps_balance() {
        let ledger = AsyncLedger::new(Arc::new(UnavailableBalanceOracle));
        ledger.open(2, Decimal::from(10)).unwrap();

        let err = ledger.synchronize(2).await.unwrap_err();

        assert!(matches!(
            err.account_error(),
            Some(AccountError::SynchronizationFailed { .. })
        ));
        assert_eq!(ledger.snapshots()[0].balance, Decimal::from(10));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_deposits_on_shared_account() {
        let ledger = Arc::new(fixed_ledger());
        ledger.open(1, Decimal::ZERO).unwrap();

        let mut tasks = Vec::new();
        for _ in 0..8 {
            let ledger = Arc::clone(&ledger);
            tasks.push(tokio::spawn(async move {
                for _ in 0..100 {
                    ledger.deposit(1, Decimal::ONE).unwrap();
                }
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(ledger.snapshots()[0].balance, Decimal::from(800));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_opposite_transfers_do_not_deadlock() {
        let ledger = Arc::new(fixed_ledger());
        ledger.open(1, Decimal::from(1000)).unwrap();
        ledger.open(2, Decimal::from(1000)).unwrap();

        let forward = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                for _ in 0..200 {
                    ledger.transfer(1, 2, Decimal::ONE).unwrap();
                }
            })
        };
        let backward = {
            let ledger = Arc::clone(&ledger);
            tokio::spawn(async move {
                for _ in 0..200 {
                    ledger.transfer(2, 1, Decimal::ONE).unwrap();
                }
            })
        };
        forward.await.unwrap();
        backward.await.unwrap();

        let total: Decimal = ledger.snapshots().iter().map(|s| s.balance).sum();
        assert_eq!(total, Decimal::from(2000));
    }
}
