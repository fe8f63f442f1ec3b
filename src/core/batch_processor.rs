//! Concurrent batch processing with account-based partitioning
//!
//! Transactions that touch a common account (or count against the same
//! donor's contribution limit) depend on each other's outcome, so they are
//! grouped and processed sequentially in input order inside one tokio task.
//! Independent groups run concurrently. Results come back in input order,
//! which makes a concurrent replay indistinguishable from a sequential one.
//!
//! # Architecture
//!
//! ```text
//! BatchProcessor
//!     └── LedgerProcessor  (shared, cloneable, thread-safe)
//! ```

use std::collections::HashMap;

use futures::future::join_all;
use tracing::error;

use super::processor::LedgerProcessor;
use crate::types::{AccountId, LedgerError, Transaction, TransactionResult};

/// Outcome of one transaction, tagged with its position in the batch
#[derive(Debug, Clone)]
pub struct ProcessingResult {
    pub index: usize,
    pub result: TransactionResult,
}

#[derive(Debug, PartialEq, Eq, Hash)]
enum GroupKey<'a> {
    Account(&'a AccountId),
    Entity(&'a str),
}

/// Disjoint-set forest over batch positions
struct Groups {
    parent: Vec<usize>,
}

impl Groups {
    fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
        }
    }

    fn find(&mut self, mut node: usize) -> usize {
        while self.parent[node] != node {
            self.parent[node] = self.parent[self.parent[node]];
            node = self.parent[node];
        }
        node
    }

    fn union(&mut self, a: usize, b: usize) {
        let (root_a, root_b) = (self.find(a), self.find(b));
        if root_a != root_b {
            // Lower index as root keeps group order stable
            let (low, high) = (root_a.min(root_b), root_a.max(root_b));
            self.parent[high] = low;
        }
    }
}

/// Union every pair of transactions that share an account or a donor
fn dependency_groups(batch: &[Transaction]) -> Groups {
    let mut groups = Groups::new(batch.len());
    let mut first_seen: HashMap<GroupKey<'_>, usize> = HashMap::new();

    for (index, transaction) in batch.iter().enumerate() {
        let keys = transaction
            .from_account()
            .into_iter()
            .chain(transaction.to_account())
            .map(GroupKey::Account)
            .chain(
                transaction
                    .related_entity_id()
                    .filter(|id| !id.is_empty())
                    .map(GroupKey::Entity),
            );

        for key in keys {
            let first = *first_seen.entry(key).or_insert(index);
            if first != index {
                groups.union(index, first);
            }
        }
    }

    groups
}

#[derive(Clone)]
pub struct BatchProcessor {
    processor: LedgerProcessor,
}

impl BatchProcessor {
    pub fn new(processor: LedgerProcessor) -> Self {
        Self { processor }
    }

    /// Split a batch into groups of mutually dependent transactions
    ///
    /// Each group keeps the input order of its members, and every
    /// transaction lands in exactly one group. Groups are ordered by their
    /// first member.
    ///
    /// # Arguments
    ///
    /// * `batch` - Transactions to partition
    ///
    /// # Returns
    ///
    /// Groups of `(input index, transaction)` pairs.
    pub fn partition(&self, batch: Vec<Transaction>) -> Vec<Vec<(usize, Transaction)>> {
        let mut groups = dependency_groups(&batch);

        let mut by_root: HashMap<usize, Vec<(usize, Transaction)>> = HashMap::new();
        let mut roots = Vec::new();
        for (index, transaction) in batch.into_iter().enumerate() {
            let root = groups.find(index);
            by_root
                .entry(root)
                .or_insert_with(|| {
                    roots.push(root);
                    Vec::new()
                })
                .push((index, transaction));
        }

        roots
            .into_iter()
            .filter_map(|root| by_root.remove(&root))
            .collect()
    }

    /// Process one group sequentially in order
    pub async fn process_group(&self, group: Vec<(usize, Transaction)>) -> Vec<ProcessingResult> {
        group
            .into_iter()
            .map(|(index, mut transaction)| ProcessingResult {
                index,
                result: self.processor.process(&mut transaction),
            })
            .collect()
    }

    /// Process a batch with independent groups running concurrently
    ///
    /// Each dependency group runs as its own tokio task; the call returns
    /// once every group has finished.
    ///
    /// # Arguments
    ///
    /// * `batch` - Pending transactions in input order
    ///
    /// # Returns
    ///
    /// Exactly one result per transaction, in input order. Transactions
    /// whose task panicked get a generic `Unknown` failure.
    pub async fn process_batch(&self, batch: Vec<Transaction>) -> Vec<TransactionResult> {
        let len = batch.len();
        let tasks = self.partition(batch).into_iter().map(|group| {
            let processor = self.clone();
            tokio::spawn(async move { processor.process_group(group).await })
        });

        let mut slots: Vec<Option<TransactionResult>> = vec![None; len];
        for joined in join_all(tasks).await {
            match joined {
                Ok(results) => {
                    for ProcessingResult { index, result } in results {
                        slots[index] = Some(result);
                    }
                }
                Err(e) => error!(error = %e, "Batch task panicked"),
            }
        }

        slots
            .into_iter()
            .enumerate()
            .map(|(index, slot)| slot.unwrap_or_else(|| lost_result(index)))
            .collect()
    }
}

fn lost_result(index: usize) -> TransactionResult {
    let error = LedgerError::RuntimeError {
        message: format!("no result for batch position {}", index),
    };
    error!(index, %error, "Transaction lost with its batch task");
    TransactionResult::from_error(&error)
}
