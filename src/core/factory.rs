//! Transaction factory
//!
//! Builds new `Pending` transactions with a fresh id and a timestamp taken
//! from the injected clock. Nothing is validated here: describing an intent
//! is separate from authorizing its effect, which is the processor's job.

use crate::clock::{Clock, SystemClock};
use crate::types::{Transaction, TransactionType};
use rust_decimal::Decimal;
use std::sync::Arc;

#[derive(Clone)]
pub struct TransactionFactory {
    clock: Arc<dyn Clock>,
}

impl TransactionFactory {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Create a pending transaction with empty parties and cleared flags
    pub fn create(
        &self,
        tx_type: TransactionType,
        amount: Decimal,
        description: impl Into<String>,
    ) -> Transaction {
        Transaction::new(tx_type, amount, description.into(), self.clock.now())
    }

    /// Create a pending transaction between two named parties
    pub fn create_between(
        &self,
        tx_type: TransactionType,
        amount: Decimal,
        source: impl Into<String>,
        destination: impl Into<String>,
        description: impl Into<String>,
    ) -> Transaction {
        self.create(tx_type, amount, description)
            .with_parties(source.into(), destination.into())
    }
}

impl Default for TransactionFactory {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for TransactionFactory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TransactionFactory").finish_non_exhaustive()
    }
}
