//! Account management module
//!
//! This module provides the `AccountManager`, the in-memory [`BalanceStore`]
//! used by the processor and the replay strategies.
//!
//! # Thread Safety
//!
//! Accounts live in a `DashMap`. Each balance update runs while holding the
//! account's entry lock, so concurrent updates to the same account are
//! serialized while different accounts proceed in parallel.

use crate::core::traits::BalanceStore;
use crate::types::{Account, AccountId, LedgerError};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Manages all ledger accounts and their states
#[derive(Debug, Default)]
pub struct AccountManager {
    accounts: DashMap<AccountId, Account>,
}

impl AccountManager {
    pub fn new() -> Self {
        Self {
            accounts: DashMap::new(),
        }
    }

    /// Open an account with a starting balance, or top up an existing one
    ///
    /// # Errors
    ///
    /// Returns `InvalidOpeningBalance` for a negative amount, leaving the
    /// ledger untouched.
    pub fn open_account(&self, id: AccountId, opening_balance: Decimal) -> Result<Decimal, LedgerError> {
        if opening_balance < Decimal::ZERO {
            return Err(LedgerError::invalid_opening_balance(&id, opening_balance));
        }
        self.update(&id, |account| {
            account.balance = account
                .balance
                .checked_add(opening_balance)
                .ok_or_else(|| LedgerError::arithmetic_overflow("open_account", &account.id))?;
            Ok(account.balance)
        })
    }

    /// Snapshot of an account, if it exists
    pub fn get(&self, id: &AccountId) -> Option<Account> {
        self.accounts.get(id).map(|entry| entry.value().clone())
    }

    /// Update an account using a closure
    ///
    /// The closure runs while holding the account's entry lock; the account is
    /// created with a zero balance first if it does not exist yet.
    pub fn update<F, T>(&self, id: &AccountId, f: F) -> Result<T, LedgerError>
    where
        F: FnOnce(&mut Account) -> Result<T, LedgerError>,
    {
        let mut entry = self
            .accounts
            .entry(id.clone())
            .or_insert_with(|| Account::new(id.clone()));
        f(entry.value_mut())
    }

    /// Freeze an account. Returns `false` if the account does not exist.
    pub fn freeze(&self, id: &AccountId) -> bool {
        self.set_frozen(id, true)
    }

    /// Unfreeze an account. Returns `false` if the account does not exist.
    pub fn unfreeze(&self, id: &AccountId) -> bool {
        self.set_frozen(id, false)
    }

    fn set_frozen(&self, id: &AccountId, frozen: bool) -> bool {
        match self.accounts.get_mut(id) {
            Some(mut account) => {
                account.frozen = frozen;
                true
            }
            None => false,
        }
    }

    /// All accounts sorted by id for deterministic output
    pub fn get_all_accounts(&self) -> Vec<Account> {
        let mut accounts: Vec<Account> = self
            .accounts
            .iter()
            .map(|entry| entry.value().clone())
            .collect();
        accounts.sort_by(|a, b| a.id.cmp(&b.id));
        accounts
    }
}

impl BalanceStore for AccountManager {
    fn get_balance(&self, account: &AccountId) -> Option<Decimal> {
        self.accounts.get(account).map(|entry| entry.balance)
    }

    fn is_frozen(&self, account: &AccountId) -> bool {
        self.accounts
            .get(account)
            .is_some_and(|entry| entry.frozen)
    }

    fn apply_delta(&self, account: &AccountId, delta: Decimal) -> Result<Decimal, LedgerError> {
        if delta.is_sign_negative() {
            // Debits never open accounts
            let mut entry = self
                .accounts
                .get_mut(account)
                .ok_or_else(|| LedgerError::insufficient_funds(account, Decimal::ZERO, -delta))?;

            let required = -delta;
            if entry.balance < required {
                return Err(LedgerError::insufficient_funds(account, entry.balance, required));
            }
            entry.balance = entry
                .balance
                .checked_sub(required)
                .ok_or_else(|| LedgerError::arithmetic_overflow("debit", account))?;
            return Ok(entry.balance);
        }

        self.update(account, |entry| {
            entry.balance = entry
                .balance
                .checked_add(delta)
                .ok_or_else(|| LedgerError::arithmetic_overflow("credit", account))?;
            Ok(entry.balance)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn id(name: &str) -> AccountId {
        AccountId::new(name)
    }

    #[test]
    fn test_new_creates_empty_manager() {
        let manager = AccountManager::new();
        assert!(manager.get_all_accounts().is_empty());
        assert_eq!(manager.get_balance(&id("war_chest")), None);
    }

    #[test]
    fn test_credit_opens_account() {
        let manager = AccountManager::new();

        let balance = manager.apply_delta(&id("war_chest"), Decimal::new(10050, 2)).unwrap();

        assert_eq!(balance, Decimal::new(10050, 2));
        let account = manager.get(&id("war_chest")).unwrap();
        assert_eq!(account.balance, Decimal::new(10050, 2));
        assert!(!account.frozen);
    }

    #[test]
    fn test_debit_with_sufficient_funds() {
        let manager = AccountManager::new();
        manager.open_account(id("war_chest"), Decimal::from(100)).unwrap();

        let balance = manager.apply_delta(&id("war_chest"), Decimal::from(-40)).unwrap();

        assert_eq!(balance, Decimal::from(60));
    }

    #[test]
    fn test_debit_to_exactly_zero() {
        let manager = AccountManager::new();
        manager.open_account(id("war_chest"), Decimal::from(100)).unwrap();

        let balance = manager.apply_delta(&id("war_chest"), Decimal::from(-100)).unwrap();

        assert_eq!(balance, Decimal::ZERO);
    }

    #[test]
    fn test_debit_with_insufficient_funds_leaves_balance() {
        let manager = AccountManager::new();
        manager.open_account(id("war_chest"), Decimal::from(50)).unwrap();

        let err = manager
            .apply_delta(&id("war_chest"), Decimal::from(-100))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::insufficient_funds(&id("war_chest"), Decimal::from(50), Decimal::from(100))
        );
        assert_eq!(manager.get_balance(&id("war_chest")), Some(Decimal::from(50)));
    }

    #[test]
    fn test_debit_never_opens_account() {
        let manager = AccountManager::new();

        let err = manager.apply_delta(&id("ghost"), Decimal::from(-1)).unwrap_err();

        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        assert!(manager.get(&id("ghost")).is_none());
    }

    #[test]
    fn test_credit_overflow_is_rejected() {
        let manager = AccountManager::new();
        manager.open_account(id("war_chest"), Decimal::MAX).unwrap();

        let err = manager.apply_delta(&id("war_chest"), Decimal::ONE).unwrap_err();

        assert!(matches!(err, LedgerError::ArithmeticOverflow { .. }));
        assert_eq!(manager.get_balance(&id("war_chest")), Some(Decimal::MAX));
    }

    #[test]
    fn test_negative_opening_balance_rejected() {
        let manager = AccountManager::new();

        let err = manager
            .open_account(id("war_chest"), Decimal::from(-25))
            .unwrap_err();

        assert_eq!(
            err,
            LedgerError::invalid_opening_balance(&id("war_chest"), Decimal::from(-25))
        );
        assert_eq!(err.error_code(), crate::types::ErrorCode::InvalidAmount);
        assert!(manager.get(&id("war_chest")).is_none());
    }

    #[test]
    fn test_freeze_and_unfreeze() {
        let manager = AccountManager::new();
        manager.open_account(id("war_chest"), Decimal::ZERO).unwrap();

        assert!(manager.freeze(&id("war_chest")));
        assert!(manager.is_frozen(&id("war_chest")));

        assert!(manager.unfreeze(&id("war_chest")));
        assert!(!manager.is_frozen(&id("war_chest")));
    }

    #[test]
    fn test_freeze_missing_account() {
        let manager = AccountManager::new();
        assert!(!manager.freeze(&id("ghost")));
        assert!(!manager.is_frozen(&id("ghost")));
    }

    #[test]
    fn test_get_all_accounts_sorted() {
        let manager = AccountManager::new();
        for name in ["party_fund", "campaign", "super_pac"] {
            manager.open_account(id(name), Decimal::ONE).unwrap();
        }

        let ids: Vec<String> = manager
            .get_all_accounts()
            .into_iter()
            .map(|a| a.id.to_string())
            .collect();

        assert_eq!(ids, vec!["campaign", "party_fund", "super_pac"]);
    }

    #[test]
    fn test_concurrent_debits_never_overdraw() {
        let manager = Arc::new(AccountManager::new());
        manager.open_account(id("war_chest"), Decimal::from(100)).unwrap();

        let handles: Vec<_> = (0..10)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || manager.apply_delta(&id("war_chest"), Decimal::from(-30)).is_ok())
            })
            .collect();

        let successes = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|ok| *ok)
            .count();

        assert_eq!(successes, 3);
        assert_eq!(manager.get_balance(&id("war_chest")), Some(Decimal::from(10)));
    }

    #[test]
    fn test_concurrent_credits_are_not_lost() {
        let manager = Arc::new(AccountManager::new());

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let manager = Arc::clone(&manager);
                thread::spawn(move || {
                    for _ in 0..100 {
                        manager.apply_delta(&id("war_chest"), Decimal::ONE).unwrap();
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(manager.get_balance(&id("war_chest")), Some(Decimal::from(800)));
    }
}
