//! Per-account rate limiting
//!
//! A fixed window counter per account: the first transaction against an
//! account opens a window of `window` length, and at most `max_per_window`
//! transactions are admitted until it expires.
//!
//! The processor takes the slots for every account a transaction touches in
//! one step and hands them back if the transaction is rejected later, so
//! only applied transactions count.

use crate::clock::Clock;
use crate::config::RateLimitConfig;
use crate::types::{AccountId, LedgerError};
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use std::sync::Arc;

#[derive(Debug, Clone, Copy)]
struct Window {
    started_at: DateTime<Utc>,
    count: u32,
}

/// One transaction counted against one account's window
#[derive(Debug, Clone, PartialEq)]
pub struct RateSlot {
    account: AccountId,
    window_started_at: DateTime<Utc>,
}

pub struct RateLimiter {
    max_per_window: u32,
    window: Duration,
    clock: Arc<dyn Clock>,
    windows: DashMap<AccountId, Window>,
}

impl RateLimiter {
    pub fn new(max_per_window: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            max_per_window,
            window,
            clock,
            windows: DashMap::new(),
        }
    }

    pub fn from_config(config: &RateLimitConfig, clock: Arc<dyn Clock>) -> Self {
        let window = i64::try_from(config.window_secs)
            .ok()
            .and_then(Duration::try_seconds)
            .unwrap_or(Duration::MAX);
        Self::new(config.max_transactions, window, clock)
    }

    /// Count one transaction against `account`
    ///
    /// # Errors
    ///
    /// Returns `RateLimitExceeded` when the account's current window is full.
    /// A rejected attempt does not consume a slot.
    pub fn check(&self, account: &AccountId) -> Result<(), LedgerError> {
        self.take(account).map(|_| ())
    }

    /// Take one slot in every account's window, or none at all
    ///
    /// # Arguments
    ///
    /// * `accounts` - Every account the transaction touches
    ///
    /// # Returns
    ///
    /// The slots taken, to hand back with [`RateLimiter::release`] if the
    /// transaction is rejected later on.
    ///
    /// # Errors
    ///
    /// Returns `RateLimitExceeded` for the first full window. Slots already
    /// taken for the other accounts are given back first.
    pub fn acquire(&self, accounts: &[&AccountId]) -> Result<Vec<RateSlot>, LedgerError> {
        let mut taken = Vec::with_capacity(accounts.len());
        for account in accounts {
            match self.take(account) {
                Ok(slot) => taken.push(slot),
                Err(error) => {
                    self.release(taken);
                    return Err(error);
                }
            }
        }
        Ok(taken)
    }

    /// Give back slots from [`RateLimiter::acquire`]
    ///
    /// A slot whose window has since expired is dropped.
    pub fn release(&self, slots: Vec<RateSlot>) {
        for slot in slots {
            if let Some(mut window) = self.windows.get_mut(&slot.account) {
                if window.started_at == slot.window_started_at {
                    window.count = window.count.saturating_sub(1);
                }
            }
        }
    }

    fn take(&self, account: &AccountId) -> Result<RateSlot, LedgerError> {
        let now = self.clock.now();
        let mut window = self.windows.entry(account.clone()).or_insert(Window {
            started_at: now,
            count: 0,
        });

        if now - window.started_at >= self.window {
            *window = Window {
                started_at: now,
                count: 0,
            };
        }

        if window.count >= self.max_per_window {
            return Err(LedgerError::rate_limit_exceeded(account, self.max_per_window));
        }

        window.count += 1;
        Ok(RateSlot {
            account: account.clone(),
            window_started_at: window.started_at,
        })
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("max_per_window", &self.max_per_window)
            .field("window", &self.window)
            .field("tracked_accounts", &self.windows.len())
            .finish()
    }
}
