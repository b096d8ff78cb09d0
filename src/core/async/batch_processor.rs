//! Batch processing with account-group partitioning for async ledger processing
//!
//! This module provides the `BatchProcessor` struct, which applies batches of
//! operation records concurrently while keeping the observable result equal to
//! applying them one after another in input order, whenever the balance
//! oracle is deterministic. A seeded random oracle hands out its draws in
//! call order, and calls from parallel groups interleave by scheduling.
//!
//! # Design
//!
//! A transfer touches two accounts, so partitioning by a single account key is
//! not enough: a record must run after every earlier record that touches
//! either of its accounts. The processor therefore joins accounts that appear
//! together in a record into one group (union-find), and records of different
//! groups are independent.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── Arc<AsyncLedger>  (shared account map)
//! ```
//!
//! Each group is applied sequentially inside its own tokio task; groups run in
//! parallel.

use std::any::Any;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use super::AsyncLedger;
use crate::types::{AccountKey, LedgerError, OperationRecord};

/// Result of applying a single operation record
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    /// The record that was applied
    pub record: OperationRecord,

    /// The result of applying it (success or error)
    pub result: Result<(), LedgerError>,
}

/// Batch processor with account-group partitioning
///
/// `BatchProcessor` is cheap to clone; clones share the same ledger.
#[derive(Debug, Clone)]
pub struct BatchProcessor {
    /// Shared ledger the records are applied to
    ledger: Arc<AsyncLedger>,
}

impl BatchProcessor {
    /// Create a new BatchProcessor
    ///
    /// # Arguments
    ///
    /// * `ledger` - Arc-wrapped AsyncLedger the batches are applied to
    pub fn new(ledger: Arc<AsyncLedger>) -> Self {
        Self { ledger }
    }

    /// Partition a batch into groups of records sharing accounts
    ///
    /// Two records land in the same group when they are connected through any
    /// chain of shared account keys (source or transfer target).
    ///
    /// # Arguments
    ///
    /// * `batch` - The operation records to partition
    ///
    /// # Returns
    ///
    /// The groups, ordered by the position of their first record in `batch`.
    ///
    /// # Guarantees
    ///
    /// - Each record appears in exactly one group
    /// - Records within a group keep their original relative order
    /// - No account key appears in more than one group
    pub fn partition_by_accounts(&self, batch: Vec<OperationRecord>) -> Vec<Vec<OperationRecord>> {
        let mut groups = AccountGroups::default();
        for record in &batch {
            let mut accounts = record.accounts();
            if let Some(first) = accounts.next() {
                groups.insert(first);
                for other in accounts {
                    groups.union(first, other);
                }
            }
        }

        let mut slots: HashMap<AccountKey, usize> = HashMap::new();
        let mut partitioned: Vec<Vec<OperationRecord>> = Vec::new();
        for record in batch {
            let root = groups.find(record.account);
            let slot = *slots.entry(root).or_insert_with(|| {
                partitioned.push(Vec::new());
                partitioned.len() - 1
            });
            partitioned[slot].push(record);
        }

        partitioned
    }

    /// Apply all records of one group sequentially
    ///
    /// Errors are captured in the results and do not stop the group. A record
    /// whose operation panics (for example inside a caller-supplied oracle)
    /// is reported as a `LedgerError::Runtime` failure and the group carries
    /// on with the next record.
    ///
    /// # Returns
    ///
    /// One `ProcessingResult` per record, in input order.
    pub async fn process_group(&self, records: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        let mut results = Vec::with_capacity(records.len());

        for record in records {
            let result = match AssertUnwindSafe(self.ledger.apply(&record))
                .catch_unwind()
                .await
            {
                Ok(result) => result,
                Err(panic) => {
                    let message = panic_message(panic.as_ref());
                    tracing::error!(
                        operation = %record.op_type,
                        account = record.account,
                        panic = %message,
                        "operation panicked"
                    );
                    Err(LedgerError::Runtime {
                        message: format!("{} operation panicked: {}", record.op_type, message),
                    })
                }
            };
            results.push(ProcessingResult { record, result });
        }

        results
    }

    /// Apply a batch with account-group partitioning
    ///
    /// This method:
    /// 1. Partitions the batch into independent account groups
    /// 2. Spawns one tokio task per group
    /// 3. Waits for all tasks and collects their results
    ///
    /// # Returns
    ///
    /// One `ProcessingResult` per record. Results of one group are in input
    /// order; results of different groups may interleave in any order. A
    /// group task that is cancelled by runtime shutdown yields no results;
    /// this is logged at `error` level.
    pub async fn process_batch(&self, batch: Vec<OperationRecord>) -> Vec<ProcessingResult> {
        let groups = self.partition_by_accounts(batch);

        let mut tasks = Vec::with_capacity(groups.len());
        for records in groups {
            let processor = self.clone();
            tasks.push(tokio::spawn(
                async move { processor.process_group(records).await },
            ));
        }

        let mut results = Vec::new();
        for task in tasks {
            match task.await {
                Ok(group_results) => results.extend(group_results),
                Err(e) => {
                    tracing::error!(error = %e, "account group task failed");
                }
            }
        }

        results
    }
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(message) = panic.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = panic.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Disjoint sets of account keys
#[derive(Debug, Default)]
struct AccountGroups {
    parent: HashMap<AccountKey, AccountKey>,
}

impl AccountGroups {
    fn insert(&mut self, key: AccountKey) {
        self.parent.entry(key).or_insert(key);
    }

    fn find(&mut self, key: AccountKey) -> AccountKey {
        let mut root = key;
        while let Some(&parent) = self.parent.get(&root) {
            if parent == root {
                break;
            }
            root = parent;
        }

        // path compression
        let mut current = key;
        while current != root {
            match self.parent.insert(current, root) {
                Some(next) => current = next,
                None => break,
            }
        }

        root
    }

    fn union(&mut self, a: AccountKey, b: AccountKey) {
        self.insert(a);
        self.insert(b);
        let root_a = self.find(a);
        let root_b = self.find(b);
        if root_a != root_b {
            self.parent.insert(root_b, root_a);
        }
    }
}
