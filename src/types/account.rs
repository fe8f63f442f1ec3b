//! Account-related types for the campaign finance ledger

use super::transaction::AccountId;
use rust_decimal::Decimal;

/// Ledger account state
///
/// Accounts open with a zero balance on their first credit. A frozen
/// account keeps its balance but cannot take part in new transactions.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: AccountId,

    /// Current balance; never negative
    pub balance: Decimal,

    /// Whether the account is frozen (e.g. by a regulator in the game)
    pub frozen: bool,
}

impl Account {
    /// Create a new account with zero balance and unfrozen status
    pub fn new(id: AccountId) -> Self {
        Account {
            id,
            balance: Decimal::ZERO,
            frozen: false,
        }
    }
}
