//! Asynchronous implementations of core components
//!
//! This module provides the thread-safe ledger and the batch processor used
//! by the async processing strategy.
//!
//! # Architecture
//!
//! - **AsyncLedger**: Thread-safe keyed account map using DashMap
//! - **BatchProcessor**: Applies batches grouped by connected accounts
//!
//! # Thread Safety
//!
//! - Operations on unrelated accounts proceed in parallel
//! - Operations on the same account are serialized by the account itself
//! - No global locks; map shards and per-account mutexes only

pub mod batch_processor;
pub mod ledger;

pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use ledger::AsyncLedger;
