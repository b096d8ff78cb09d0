//! Balance oracle implementations
//!
//! This module provides the default nondeterministic oracle used when nothing
//! else is injected, plus deterministic oracles for tests and for reproducible
//! CLI runs.
//!
//! - [`RandomBalanceOracle`]: random balance, random failures, optional latency
//! - [`FixedBalanceOracle`]: always the same balance
//! - [`UnavailableBalanceOracle`]: always the failure sentinel
//! - [`ScriptedBalanceOracle`]: replays a queue of results and counts calls
//! - [`FnBalanceOracle`]: adapts an async closure
//!
//! [`OracleConfig`] selects and builds one of them from configuration.

use crate::core::traits::{BalanceOracle, FetchedBalance};
use crate::types::ConfigError;
use futures::future::{self, BoxFuture, FutureExt};
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use std::collections::VecDeque;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Configuration of the random oracle
///
/// All values are validated by [`RandomOracleConfig::validate`] before an
/// oracle is built from them.
#[derive(Debug, Clone, PartialEq)]
pub struct RandomOracleConfig {
    /// Probability that a query yields the failure sentinel (0.0 - 1.0)
    pub failure_rate: f64,
    /// Upper bound (inclusive) of the generated balance
    pub max_balance: u32,
    /// Artificial latency applied to every query, in milliseconds
    pub delay_ms: u64,
    /// Seed for a reproducible draw sequence; seeded from the OS when absent
    pub seed: Option<u64>,
}

impl Default for RandomOracleConfig {
    fn default() -> Self {
        Self {
            failure_rate: 0.5,
            max_balance: 100,
            delay_ms: 0,
            seed: None,
        }
    }
}

impl RandomOracleConfig {
    /// Validate the configuration values
    ///
    /// # Errors
    ///
    /// Returns an error if `failure_rate` is not in range `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.failure_rate) {
            return Err(ConfigError::InvalidFailureRate(self.failure_rate));
        }
        Ok(())
    }
}

/// Oracle selection
#[derive(Debug, Clone, PartialEq)]
pub enum OracleConfig {
    /// Nondeterministic oracle
    Random(RandomOracleConfig),
    /// Oracle that always reports the given balance
    Fixed(Decimal),
    /// Oracle that always reports the failure sentinel
    Unavailable,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig::Random(RandomOracleConfig::default())
    }
}

impl OracleConfig {
    /// Build the configured oracle
    ///
    /// # Errors
    ///
    /// Returns an error if the random oracle configuration is invalid.
    pub fn build(&self) -> Result<Arc<dyn BalanceOracle>, ConfigError> {
        let oracle: Arc<dyn BalanceOracle> = match self {
            OracleConfig::Random(config) => Arc::new(RandomBalanceOracle::new(config.clone())?),
            OracleConfig::Fixed(balance) => Arc::new(FixedBalanceOracle::new(*balance)),
            OracleConfig::Unavailable => Arc::new(UnavailableBalanceOracle),
        };
        Ok(oracle)
    }
}

/// Nondeterministic balance source
///
/// Each query draws an integer balance uniformly from `0..=max_balance` and
/// independently decides whether the query fails, with probability
/// `failure_rate`. The random draws happen before the optional delay, so the
/// generator lock is never held across an `.await`.
///
/// A seed fixes the sequence of draws, which are handed out in call order.
/// Accounts sharing the oracle therefore get reproducible values only when
/// they query it in a fixed order, as the sequential strategy does.
pub struct RandomBalanceOracle {
    config: RandomOracleConfig,
    rng: Mutex<StdRng>,
}

impl RandomBalanceOracle {
    /// Create a random oracle from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration fails validation.
    pub fn new(config: RandomOracleConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Ok(Self {
            config,
            rng: Mutex::new(rng),
        })
    }

    /// The configuration this oracle was built from
    pub fn config(&self) -> &RandomOracleConfig {
        &self.config
    }
}

impl Default for RandomBalanceOracle {
    fn default() -> Self {
        Self {
            config: RandomOracleConfig::default(),
            rng: Mutex::new(StdRng::from_os_rng()),
        }
    }
}

impl fmt::Debug for RandomBalanceOracle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomBalanceOracle")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl BalanceOracle for RandomBalanceOracle {
    fn fetch_balance(&self) -> BoxFuture<'_, FetchedBalance> {
        let (balance, failed) = {
            let mut rng = self.rng.lock();
            let balance = rng.random_range(0..=self.config.max_balance);
            let failed = rng.random_bool(self.config.failure_rate);
            (balance, failed)
        };
        let delay = Duration::from_millis(self.config.delay_ms);

        async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            (!failed).then(|| Decimal::from(balance))
        }
        .boxed()
    }
}

/// Oracle that always reports the same balance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedBalanceOracle {
    balance: Decimal,
}

impl FixedBalanceOracle {
    pub fn new(balance: Decimal) -> Self {
        Self { balance }
    }
}

impl BalanceOracle for FixedBalanceOracle {
    fn fetch_balance(&self) -> BoxFuture<'_, FetchedBalance> {
        future::ready(Some(self.balance)).boxed()
    }
}

/// Oracle that never has a value
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnavailableBalanceOracle;

impl BalanceOracle for UnavailableBalanceOracle {
    fn fetch_balance(&self) -> BoxFuture<'_, FetchedBalance> {
        future::ready(None).boxed()
    }
}

/// Oracle that replays a fixed sequence of results
///
/// Every query pops the next scripted result; once the script is exhausted
/// the oracle reports the failure sentinel. The number of queries is
/// recorded so callers can check how often the oracle was consulted.
#[derive(Debug, Default)]
pub struct ScriptedBalanceOracle {
    script: Mutex<VecDeque<FetchedBalance>>,
    calls: AtomicUsize,
}

impl ScriptedBalanceOracle {
    /// Create an oracle that replays `results` in order
    pub fn new(results: impl IntoIterator<Item = FetchedBalance>) -> Self {
        Self {
            script: Mutex::new(results.into_iter().collect()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times the oracle has been queried
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Number of scripted results not yet consumed
    pub fn remaining(&self) -> usize {
        self.script.lock().len()
    }
}

impl BalanceOracle for ScriptedBalanceOracle {
    fn fetch_balance(&self) -> BoxFuture<'_, FetchedBalance> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().pop_front().flatten();
        future::ready(next).boxed()
    }
}

/// Adapter turning an async closure into an oracle
///
/// # Examples
///
/// ```
/// use rust_bank_ledger::core::oracle::FnBalanceOracle;
/// use rust_bank_ledger::core::BankAccount;
/// use rust_decimal::Decimal;
/// use std::sync::Arc;
///
/// let oracle = FnBalanceOracle::new(|| async { Some(Decimal::new(50, 0)) });
/// let account = BankAccount::with_oracle(Decimal::TEN, Arc::new(oracle)).unwrap();
/// assert_eq!(account.balance(), Decimal::TEN);
/// ```
pub struct FnBalanceOracle<F> {
    fetch: F,
}

impl<F, Fut> FnBalanceOracle<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = FetchedBalance> + Send + 'static,
{
    pub fn new(fetch: F) -> Self {
        Self { fetch }
    }
}

impl<F> fmt::Debug for FnBalanceOracle<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnBalanceOracle").finish_non_exhaustive()
    }
}

impl<F, Fut> BalanceOracle for FnBalanceOracle<F>
where
    F: Fn() -> Fut + Send + Sync,
    Fut: Future<Output = FetchedBalance> + Send + 'static,
{
    fn fetch_balance(&self) -> BoxFuture<'_, FetchedBalance> {
        (self.fetch)().boxed()
    }
}
