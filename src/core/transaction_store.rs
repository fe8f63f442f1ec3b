//! Transaction history for idempotence, refunds and investigations
//!
//! Every transaction the processor has seen is recorded here under its id,
//! whatever its outcome. The store is what turns a retry into a duplicate:
//! an id can be claimed exactly once.
//!
//! # Thread Safety
//!
//! Records live in a `DashMap`; claims go through the entry API so two
//! concurrent submissions of the same id cannot both win.

use crate::types::{LedgerError, Transaction, TransactionId};
use dashmap::DashMap;

/// Stored transaction snapshot
#[derive(Debug, Clone, PartialEq)]
pub struct StoredTransaction {
    /// Latest snapshot of the transaction, including its status
    pub transaction: Transaction,

    /// Whether the balance effect of the transaction is currently in place
    pub applied: bool,

    /// Reason given when the transaction was put under investigation
    pub investigation: Option<String>,
}

impl StoredTransaction {
    pub fn new(transaction: Transaction) -> Self {
        StoredTransaction {
            transaction,
            applied: false,
            investigation: None,
        }
    }
}

/// Transaction store keyed by transaction id
#[derive(Debug, Default)]
pub struct TransactionStore {
    transactions: DashMap<TransactionId, StoredTransaction>,
}

impl TransactionStore {
    pub fn new() -> Self {
        Self {
            transactions: DashMap::new(),
        }
    }

    /// Record a transaction id for the first time
    ///
    /// # Errors
    ///
    /// Returns `DuplicateTransaction` if the id has already been claimed.
    pub fn claim(&self, transaction: &Transaction) -> Result<(), LedgerError> {
        let mut claimed = false;
        self.transactions
            .entry(transaction.id())
            .or_insert_with(|| {
                claimed = true;
                StoredTransaction::new(transaction.clone())
            });

        if claimed {
            Ok(())
        } else {
            Err(LedgerError::duplicate_transaction(transaction.id()))
        }
    }

    /// Snapshot of a stored transaction
    pub fn get(&self, tx_id: TransactionId) -> Option<StoredTransaction> {
        self.transactions.get(&tx_id).map(|entry| entry.value().clone())
    }

    pub fn contains(&self, tx_id: TransactionId) -> bool {
        self.transactions.contains_key(&tx_id)
    }

    /// Overwrite the stored record for an already claimed id
    pub fn save(&self, record: StoredTransaction) {
        self.transactions.insert(record.transaction.id(), record);
    }

    /// Update a stored transaction using a closure
    ///
    /// The closure runs while holding the record's entry lock.
    pub fn update<F, T>(&self, tx_id: TransactionId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut StoredTransaction) -> Result<T, LedgerError>,
    {
        match self.transactions.get_mut(&tx_id) {
            Some(mut entry) => f(entry.value_mut()),
            None => Err(LedgerError::transaction_not_found(tx_id)),
        }
    }

    pub fn len(&self) -> usize {
        self.transactions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transactions.is_empty()
    }
}
