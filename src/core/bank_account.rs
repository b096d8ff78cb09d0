//! Bank account: a single non-negative balance with validated mutations
//!
//! This module provides the `BankAccount` handle, the only component with
//! real invariants in the crate. It is responsible for:
//! - Keeping the balance non-negative across deposit, withdraw and transfer
//! - Rejecting invalid requests in full, before any mutation
//! - Detecting transfers to the same entity by handle identity
//! - Reconciling the balance with an injected [`BalanceOracle`]
//!
//! # Identity
//!
//! A `BankAccount` is a cheap, cloneable handle. Clones refer to the same
//! entity, the way two references to one object would. Two accounts created
//! separately are different entities even if their balances are equal.
//!
//! # Synchronization window
//!
//! [`BankAccount::synchronize_balance`] does not lock the balance while the
//! oracle is in flight. A deposit or withdrawal that completes during that
//! window is overwritten when the oracle resolves; callers must not
//! interleave mutations with an in-flight synchronization of the same account.

use crate::core::oracle::RandomBalanceOracle;
use crate::core::traits::{BalanceOracle, FetchedBalance};
use crate::types::{AccountError, AccountId};
use parking_lot::{Mutex, RwLock};
use rust_decimal::Decimal;
use std::fmt;
use std::sync::Arc;

struct AccountCell {
    id: AccountId,
    balance: Mutex<Decimal>,
    oracle: RwLock<Arc<dyn BalanceOracle>>,
}

/// Handle to a bank account entity
///
/// All operations take `&self`; the balance lives behind a lock shared by
/// every clone of the handle. Each mutating operation validates first and
/// mutates second, so a failed call leaves the balance exactly as it was.
///
/// # Examples
///
/// ```
/// use rust_bank_ledger::core::BankAccount;
/// use rust_bank_ledger::types::AccountError;
/// use rust_decimal::Decimal;
///
/// let source = BankAccount::new(Decimal::new(1000, 0)).unwrap();
/// let target = BankAccount::new(Decimal::new(100, 0)).unwrap();
///
/// source.transfer(Decimal::new(500, 0), &target).unwrap();
/// assert_eq!(source.balance(), Decimal::new(500, 0));
/// assert_eq!(target.balance(), Decimal::new(600, 0));
///
/// let err = source.transfer(Decimal::ONE, &source).unwrap_err();
/// assert!(matches!(err, AccountError::TransferToSelf { .. }));
/// ```
#[derive(Clone)]
pub struct BankAccount {
    inner: Arc<AccountCell>,
}

impl BankAccount {
    /// Create an account backed by the default random oracle
    ///
    /// # Arguments
    ///
    /// * `initial_balance` - Starting balance (must be non-negative)
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidAmount` if `initial_balance` is negative.
    pub fn new(initial_balance: Decimal) -> Result<Self, AccountError> {
        Self::with_oracle(initial_balance, Arc::new(RandomBalanceOracle::default()))
    }

    /// Create an account that synchronizes against the given oracle
    ///
    /// # Arguments
    ///
    /// * `initial_balance` - Starting balance (must be non-negative)
    /// * `oracle` - Balance source consulted by [`synchronize_balance`](Self::synchronize_balance)
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidAmount` if `initial_balance` is negative.
    pub fn with_oracle(
        initial_balance: Decimal,
        oracle: Arc<dyn BalanceOracle>,
    ) -> Result<Self, AccountError> {
        if initial_balance < Decimal::ZERO {
            return Err(AccountError::invalid_amount(initial_balance));
        }

        Ok(BankAccount {
            inner: Arc::new(AccountCell {
                id: AccountId::next(),
                balance: Mutex::new(initial_balance),
                oracle: RwLock::new(oracle),
            }),
        })
    }

    /// Opaque identity of the underlying entity
    pub fn id(&self) -> AccountId {
        self.inner.id
    }

    /// Whether `other` is a handle to the same entity
    ///
    /// Compares handles, never balances.
    pub fn is_same_account(&self, other: &BankAccount) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Current balance
    pub fn balance(&self) -> Decimal {
        *self.inner.balance.lock()
    }

    /// Replace the oracle consulted by future synchronizations
    pub fn set_oracle(&self, oracle: Arc<dyn BalanceOracle>) {
        *self.inner.oracle.write() = oracle;
    }

    /// The oracle currently consulted by synchronizations
    pub fn oracle(&self) -> Arc<dyn BalanceOracle> {
        self.inner.oracle.read().clone()
    }

    /// Deposit funds into the account
    ///
    /// # Arguments
    ///
    /// * `amount` - The amount to deposit (must be positive)
    ///
    /// # Errors
    ///
    /// Returns `AccountError::InvalidAmount` if:
    /// - `amount` is zero or negative
    /// - adding `amount` would overflow the balance
    pub fn deposit(&self, amount: Decimal) -> Result<(), AccountError> {
        ensure_positive(amount)?;

        let mut balance = self.inner.balance.lock();
        *balance = credit(*balance, amount)?;

        Ok(())
    }

    /// Withdraw funds from the account
    ///
    /// # Arguments
    ///
    /// * `amount` - The amount to withdraw (must be positive)
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - `amount` is zero or negative (`InvalidAmount`)
    /// - `amount` exceeds the current balance (`InsufficientFunds`)
    pub fn withdraw(&self, amount: Decimal) -> Result<(), AccountError> {
        ensure_positive(amount)?;

        let mut balance = self.inner.balance.lock();
        *balance = debit(self.id(), *balance, amount)?;

        Ok(())
    }

    /// Transfer funds to a different account
    ///
    /// Equivalent to a withdraw on `self` immediately followed by a deposit on
    /// `target`, performed while both balances are locked so no intermediate
    /// state is observable. Locks are taken in account id order.
    ///
    /// # Arguments
    ///
    /// * `amount` - The amount to transfer (must be positive)
    /// * `target` - The receiving account (must be a different entity)
    ///
    /// # Errors
    ///
    /// Returns an error if, checked in this order:
    /// - `target` is the same entity as `self` (`TransferToSelf`)
    /// - `amount` is zero or negative (`InvalidAmount`)
    /// - `amount` exceeds the source balance (`InsufficientFunds`)
    /// - the target balance would overflow (`InvalidAmount`)
    pub fn transfer(&self, amount: Decimal, target: &BankAccount) -> Result<(), AccountError> {
        if self.is_same_account(target) {
            return Err(AccountError::transfer_to_self(self.id()));
        }
        ensure_positive(amount)?;

        let (mut source_balance, mut target_balance) = if self.id() < target.id() {
            let source_guard = self.inner.balance.lock();
            let target_guard = target.inner.balance.lock();
            (source_guard, target_guard)
        } else {
            let target_guard = target.inner.balance.lock();
            let source_guard = self.inner.balance.lock();
            (source_guard, target_guard)
        };

        let new_source = debit(self.id(), *source_balance, amount)?;
        let new_target = credit(*target_balance, amount)?;

        *source_balance = new_source;
        *target_balance = new_target;

        Ok(())
    }

    /// Query the oracle once and return its answer without touching the balance
    pub async fn fetch_balance(&self) -> FetchedBalance {
        let oracle = self.oracle();
        oracle.fetch_balance().await
    }

    /// Replace the balance with the value reported by the oracle
    ///
    /// The oracle is invoked exactly once. A reported value overwrites the
    /// balance as-is (it is not added, and it is not clamped). The balance is
    /// not locked while the oracle is in flight.
    ///
    /// # Errors
    ///
    /// Returns `AccountError::SynchronizationFailed` if the oracle reports the
    /// failure sentinel; the balance is left unchanged.
    pub async fn synchronize_balance(&self) -> Result<(), AccountError> {
        match self.fetch_balance().await {
            Some(balance) => {
                *self.inner.balance.lock() = balance;
                Ok(())
            }
            None => Err(AccountError::synchronization_failed(self.id())),
        }
    }
}

impl fmt::Debug for BankAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BankAccount")
            .field("id", &self.id())
            .field("balance", &self.balance())
            .finish_non_exhaustive()
    }
}

fn ensure_positive(amount: Decimal) -> Result<(), AccountError> {
    if amount > Decimal::ZERO {
        Ok(())
    } else {
        Err(AccountError::invalid_amount(amount))
    }
}

fn credit(balance: Decimal, amount: Decimal) -> Result<Decimal, AccountError> {
    balance
        .checked_add(amount)
        .ok_or_else(|| AccountError::invalid_amount(amount))
}

fn debit(account: AccountId, balance: Decimal, amount: Decimal) -> Result<Decimal, AccountError> {
    if amount > balance {
        return Err(AccountError::insufficient_funds(account, balance, amount));
    }
    balance
        .checked_sub(amount)
        .ok_or_else(|| AccountError::invalid_amount(amount))
}
