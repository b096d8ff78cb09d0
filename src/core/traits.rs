//! Core traits for the balance oracle boundary
//!
//! This module defines the capability an account consumes when it
//! synchronizes its balance with an external source. Implementations can be
//! nondeterministic (the default random source) or deterministic test doubles,
//! and are injected into accounts rather than patched in.

use futures::future::BoxFuture;
use rust_decimal::Decimal;
use std::fmt;

/// Result of a single oracle query
///
/// `Some(balance)` is an authoritative balance; `None` is the failure
/// sentinel, the expected way for an oracle to report that it has no value.
pub type FetchedBalance = Option<Decimal>;

/// External source of authoritative account balances
///
/// The call is parameterless and asynchronous. Returning `None` is the normal
/// failure path; implementations must not panic for "no data".
///
/// # Thread Safety
///
/// Oracles are shared between accounts through `Arc<dyn BalanceOracle>` and may
/// be queried from several tokio worker threads at once, hence `Send + Sync`.
pub trait BalanceOracle: Send + Sync + fmt::Debug {
    /// Query the oracle once
    fn fetch_balance(&self) -> BoxFuture<'_, FetchedBalance>;
}
