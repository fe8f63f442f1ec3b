//! Collaborator traits for the ledger processor
//!
//! The processor never owns account balances or regulatory rules directly;
//! it talks to them through these seams so game code can plug in its own
//! account storage or compliance model.

use crate::types::{AccountId, LedgerError, Transaction};
use rust_decimal::Decimal;

/// Account balance storage
///
/// Implementations must make `apply_delta` atomic per account: the balance
/// check and the update happen under one exclusive lock, with no observable
/// intermediate state.
pub trait BalanceStore: Send + Sync {
    /// Current balance, or `None` if the account does not exist
    fn get_balance(&self, account: &AccountId) -> Option<Decimal>;

    /// Whether the account exists and is frozen
    fn is_frozen(&self, account: &AccountId) -> bool;

    /// Apply a signed amount to an account and return the new balance
    ///
    /// Positive deltas open the account on demand. A negative delta that would
    /// take the balance below zero is rejected with
    /// [`LedgerError::InsufficientFunds`] and leaves the balance untouched.
    fn apply_delta(&self, account: &AccountId, delta: Decimal) -> Result<Decimal, LedgerError>;
}

/// Regulatory rule checking
pub trait ComplianceChecker: Send + Sync {
    /// Admit a transaction or describe the violation it commits
    ///
    /// Rules with cumulative state (such as contribution limits) reserve the
    /// transaction's share on admission.
    fn admit(&self, transaction: &Transaction, related_entity_id: Option<&str>)
        -> Result<(), String>;

    /// Give back whatever `admit` reserved for this transaction
    fn release(&self, _transaction: &Transaction) {}
}
