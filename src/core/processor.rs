//! Ledger processor
//!
//! The single component allowed to authorize a transaction and move it
//! through its lifecycle. Every operation returns a [`TransactionResult`];
//! nothing here panics or hands a `LedgerError` back to the caller.
//!
//! # Processing order
//!
//! `process` checks, in order: status is still `Pending`, the id has not
//! been seen before, the amount is positive, the accounts fit the
//! transaction's flow, none of them is frozen, the rate limit, and
//! compliance. Only then is the balance effect applied. Rate limit slots
//! and compliance reservations are handed back when a later check fails. A rejection after
//! the id is claimed moves the transaction to `Failed` and records it, so
//! a retry is always reported as a duplicate.

use crate::clock::Clock;
use crate::config::LedgerConfig;
use crate::core::compliance::RuleBasedCompliance;
use crate::core::rate_limit::{RateLimiter, RateSlot};
use crate::core::traits::{BalanceStore, ComplianceChecker};
use crate::core::transaction_store::{StoredTransaction, TransactionStore};
use crate::types::{
    AccountId, LedgerError, Transaction, TransactionId, TransactionResult, TransactionStatus,
};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Decision closing an investigation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvestigationOutcome {
    /// Nothing wrong found: the transaction goes (back) to `Completed`
    Cleared,
    /// Wrongdoing confirmed: the effect is reversed and the transaction fails
    Upheld,
}

#[derive(Clone)]
pub struct LedgerProcessor {
    accounts: Arc<dyn BalanceStore>,
    compliance: Arc<dyn ComplianceChecker>,
    transactions: Arc<TransactionStore>,
    rate_limiter: Option<Arc<RateLimiter>>,
    reporting_threshold: Option<Decimal>,
}

impl LedgerProcessor {
    pub fn new(accounts: Arc<dyn BalanceStore>, compliance: Arc<dyn ComplianceChecker>) -> Self {
        Self {
            accounts,
            compliance,
            transactions: Arc::new(TransactionStore::new()),
            rate_limiter: None,
            reporting_threshold: None,
        }
    }

    /// Build a processor enforcing `config` against `accounts`
    pub fn from_config(
        config: &LedgerConfig,
        accounts: Arc<dyn BalanceStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let compliance = Arc::new(RuleBasedCompliance::new(config.compliance.clone()));
        let mut processor = Self::new(accounts, compliance);

        if let Some(rate_limit) = &config.rate_limit {
            processor = processor.with_rate_limiter(RateLimiter::from_config(rate_limit, clock));
        }
        if let Some(threshold) = config.reporting_threshold {
            processor = processor.with_reporting_threshold(threshold);
        }
        processor
    }

    pub fn with_rate_limiter(mut self, rate_limiter: RateLimiter) -> Self {
        self.rate_limiter = Some(Arc::new(rate_limiter));
        self
    }

    /// Completed transactions at or above `threshold` are marked for reporting
    pub fn with_reporting_threshold(mut self, threshold: Decimal) -> Self {
        self.reporting_threshold = Some(threshold);
        self
    }

    /// Validate and apply a pending transaction
    ///
    /// Runs the checks in the order listed in the module docs, then applies
    /// the balance effect under the accounts' entry locks. The transaction's
    /// status is updated in place and its id is recorded whatever the
    /// outcome.
    ///
    /// # Arguments
    ///
    /// * `transaction` - The transaction to process; must still be `Pending`
    ///
    /// # Returns
    ///
    /// * A successful result carrying the primary account's new balance
    /// * A failed result with exactly one `ErrorCode` otherwise:
    ///   - `DuplicateTransaction` if the transaction is not `Pending` or its id was seen before
    ///   - `InvalidAmount` for zero or negative amounts
    ///   - `InvalidSource` / `InvalidDestination` if the accounts do not fit the flow
    ///   - `FrozenAccount`, `RateLimitExceeded`, `ComplianceViolation`, `InsufficientFunds`
    ///   - `Unknown` for internal errors such as arithmetic overflow
    pub fn process(&self, transaction: &mut Transaction) -> TransactionResult {
        if transaction.status() != TransactionStatus::Pending {
            let error = LedgerError::duplicate_transaction(transaction.id());
            return self.rejection(transaction, &error);
        }
        if let Err(error) = self.transactions.claim(transaction) {
            return self.rejection(transaction, &error);
        }

        let (result, applied) = self.settle(transaction);
        self.record(transaction, applied);
        result
    }

    /// Withdraw a pending transaction before it is processed
    pub fn cancel(&self, transaction: &mut Transaction) -> TransactionResult {
        self.divert(
            transaction,
            TransactionStatus::Cancelled,
            None,
            "Transaction cancelled",
        )
    }

    /// Park a pending transaction for review without applying it
    pub fn hold_for_investigation(
        &self,
        transaction: &mut Transaction,
        reason: impl Into<String>,
    ) -> TransactionResult {
        self.divert(
            transaction,
            TransactionStatus::UnderInvestigation,
            Some(reason.into()),
            "Transaction held for investigation",
        )
    }

    /// Reverse a completed transaction
    ///
    /// # Arguments
    ///
    /// * `tx_id` - Id of a `Completed` transaction
    ///
    /// # Returns
    ///
    /// * A successful result with the primary account's balance after the reversal
    /// * `InsufficientFunds` if the credited account has already spent the money
    /// * `Unknown` if the id is unknown or the transaction is not `Completed`
    pub fn refund(&self, tx_id: TransactionId) -> TransactionResult {
        let outcome = self.transactions.update(tx_id, |record| {
            let mut transaction = record.transaction.clone();
            transaction
                .transition(TransactionStatus::Refunded)
                .map_err(|pair| LedgerError::invalid_transition(tx_id, pair))?;

            let balance = self.reverse(&record.transaction)?;
            self.compliance.release(&record.transaction);

            record.transaction = transaction.clone();
            record.applied = false;
            Ok((transaction, balance))
        });

        match outcome {
            Ok((transaction, balance)) => {
                debug!(tx = %tx_id, account = account_label(&transaction), %balance, "Transaction refunded");
                TransactionResult::successful(transaction, balance, Some("Transaction refunded"))
            }
            Err(error) => self.operation_failed(tx_id, &error),
        }
    }

    /// Put a completed transaction under review, leaving its effect in place
    pub fn flag_for_investigation(
        &self,
        tx_id: TransactionId,
        reason: impl Into<String>,
    ) -> TransactionResult {
        let reason = reason.into();
        let outcome = self.transactions.update(tx_id, |record| {
            let mut transaction = record.transaction.clone();
            if transaction.status() != TransactionStatus::Completed {
                return Err(LedgerError::invalid_transition(
                    tx_id,
                    (transaction.status(), TransactionStatus::UnderInvestigation),
                ));
            }
            transaction
                .transition(TransactionStatus::UnderInvestigation)
                .map_err(|pair| LedgerError::invalid_transition(tx_id, pair))?;
            transaction.mark_suspicious();

            record.transaction = transaction.clone();
            record.investigation = Some(reason);
            Ok(transaction)
        });

        match outcome {
            Ok(transaction) => {
                warn!(tx = %tx_id, account = account_label(&transaction), "Transaction flagged for investigation");
                let balance = self.primary_balance(&transaction);
                TransactionResult::successful(
                    transaction,
                    balance,
                    Some("Transaction flagged for investigation"),
                )
            }
            Err(error) => self.operation_failed(tx_id, &error),
        }
    }

    /// Close an investigation
    ///
    /// A cleared transaction that was held before being applied is processed
    /// now and may still fail. An upheld one has its effect reversed and
    /// ends `Failed` with the investigation reason as the violation.
    pub fn resolve_investigation(
        &self,
        tx_id: TransactionId,
        outcome: InvestigationOutcome,
    ) -> TransactionResult {
        let resolved = self
            .transactions
            .update(tx_id, |record| self.resolve_record(record, outcome));

        match resolved {
            Ok(result) => result,
            Err(error) => self.operation_failed(tx_id, &error),
        }
    }

    /// Latest snapshot of a recorded transaction
    pub fn transaction(&self, tx_id: TransactionId) -> Option<Transaction> {
        self.transactions.get(tx_id).map(|record| record.transaction)
    }

    fn resolve_record(
        &self,
        record: &mut StoredTransaction,
        outcome: InvestigationOutcome,
    ) -> Result<TransactionResult, LedgerError> {
        let tx_id = record.transaction.id();
        let mut transaction = record.transaction.clone();
        let target = match outcome {
            InvestigationOutcome::Cleared => TransactionStatus::Completed,
            InvestigationOutcome::Upheld => TransactionStatus::Failed,
        };
        if transaction.status() != TransactionStatus::UnderInvestigation {
            return Err(LedgerError::invalid_transition(
                tx_id,
                (transaction.status(), target),
            ));
        }

        let result = match outcome {
            InvestigationOutcome::Cleared if record.applied => {
                set_status(&mut transaction, TransactionStatus::Completed);
                debug!(tx = %tx_id, account = account_label(&transaction), "Investigation cleared");
                let balance = self.primary_balance(&transaction);
                TransactionResult::successful(
                    transaction.clone(),
                    balance,
                    Some("Investigation cleared"),
                )
            }
            InvestigationOutcome::Cleared => {
                let (result, applied) = self.settle(&mut transaction);
                record.applied = applied;
                result
            }
            InvestigationOutcome::Upheld => {
                if record.applied {
                    self.reverse(&transaction)?;
                    self.compliance.release(&transaction);
                    record.applied = false;
                }
                set_status(&mut transaction, TransactionStatus::Failed);

                let reason = record
                    .investigation
                    .clone()
                    .unwrap_or_else(|| "Investigation upheld".to_string());
                warn!(tx = %tx_id, account = account_label(&transaction), %reason, "Investigation upheld");
                TransactionResult::compliance_violation(reason).with_transaction(transaction.clone())
            }
        };

        record.transaction = transaction;
        record.investigation = None;
        Ok(result)
    }

    /// Apply a transaction and move it to `Completed` or `Failed`
    ///
    /// Returns the result and whether the balance effect is in place.
    fn settle(&self, transaction: &mut Transaction) -> (TransactionResult, bool) {
        match self.execute(transaction) {
            Ok(balance) => {
                if self
                    .reporting_threshold
                    .is_some_and(|threshold| transaction.amount() >= threshold)
                {
                    transaction.mark_reporting_required();
                }
                set_status(transaction, TransactionStatus::Completed);
                debug!(
                    tx = %transaction.id(),
                    account = account_label(transaction),
                    %balance,
                    "Transaction completed"
                );
                (
                    TransactionResult::successful(transaction.clone(), balance, None),
                    true,
                )
            }
            Err(error) => {
                set_status(transaction, TransactionStatus::Failed);
                (self.rejection(transaction, &error), false)
            }
        }
    }

    fn execute(&self, transaction: &Transaction) -> Result<Decimal, LedgerError> {
        let amount = transaction.amount();
        if amount <= Decimal::ZERO {
            return Err(LedgerError::invalid_amount(transaction.id(), amount));
        }

        let (debit, credit) = self.resolve_accounts(transaction)?;

        for account in debit.iter().chain(credit.iter()) {
            if self.accounts.is_frozen(account) {
                return Err(LedgerError::account_frozen(account));
            }
        }

        let involved: Vec<&AccountId> = debit.into_iter().chain(credit).collect();
        let slots = match &self.rate_limiter {
            Some(limiter) => limiter.acquire(&involved)?,
            None => Vec::new(),
        };

        if let Err(violation) = self
            .compliance
            .admit(transaction, transaction.related_entity_id())
        {
            self.release_slots(slots);
            return Err(LedgerError::compliance_violation(transaction.id(), violation));
        }

        match self.move_funds(debit, credit, amount) {
            Ok((debited, credited)) => debited.or(credited).ok_or_else(|| {
                LedgerError::invalid_destination(transaction.id(), "transaction moves no money")
            }),
            Err(error) => {
                self.compliance.release(transaction);
                self.release_slots(slots);
                Err(error)
            }
        }
    }

    fn release_slots(&self, slots: Vec<RateSlot>) {
        if let Some(limiter) = &self.rate_limiter {
            limiter.release(slots);
        }
    }

    /// Accounts debited and credited by a transaction, validated against its flow
    fn resolve_accounts<'a>(
        &self,
        transaction: &'a Transaction,
    ) -> Result<(Option<&'a AccountId>, Option<&'a AccountId>), LedgerError> {
        let tx_id = transaction.id();
        let flow = transaction.flow();

        let debit = if flow.debits() {
            let from = transaction
                .from_account()
                .ok_or_else(|| LedgerError::invalid_source(tx_id, "no source account"))?;
            if self.accounts.get_balance(from).is_none() {
                return Err(LedgerError::invalid_source(
                    tx_id,
                    format!("account {} does not exist", from),
                ));
            }
            Some(from)
        } else {
            None
        };

        let credit = if flow.credits() {
            let to = transaction
                .to_account()
                .ok_or_else(|| LedgerError::invalid_destination(tx_id, "no destination account"))?;
            if debit == Some(to) {
                return Err(LedgerError::invalid_destination(
                    tx_id,
                    "source and destination are the same account",
                ));
            }
            Some(to)
        } else {
            None
        };

        Ok((debit, credit))
    }

    /// Debit then credit, undoing the debit if the credit fails
    fn move_funds(
        &self,
        debit: Option<&AccountId>,
        credit: Option<&AccountId>,
        amount: Decimal,
    ) -> Result<(Option<Decimal>, Option<Decimal>), LedgerError> {
        let debited = match debit {
            Some(account) => Some(self.accounts.apply_delta(account, -amount)?),
            None => None,
        };

        let credited = match credit {
            Some(account) => match self.accounts.apply_delta(account, amount) {
                Ok(balance) => Some(balance),
                Err(error) => {
                    if let Some(from) = debit {
                        self.restore(from, amount);
                    }
                    return Err(error);
                }
            },
            None => None,
        };

        Ok((debited, credited))
    }

    /// Undo an applied transaction and return the primary account balance
    fn reverse(&self, transaction: &Transaction) -> Result<Decimal, LedgerError> {
        let flow = transaction.flow();
        let debit = transaction.from_account().filter(|_| flow.debits());
        let credit = transaction.to_account().filter(|_| flow.credits());

        // Money goes back the other way
        let (from_credit, to_debit) = self.move_funds(credit, debit, transaction.amount())?;
        let primary = if flow.debits() { to_debit } else { from_credit };
        primary.ok_or_else(|| {
            LedgerError::invalid_source(transaction.id(), "transaction has no account to reverse")
        })
    }

    fn restore(&self, account: &AccountId, amount: Decimal) {
        if let Err(error) = self.accounts.apply_delta(account, amount) {
            error!(account = %account, %amount, %error, "Failed to roll back debit");
        }
    }

    /// Move a pending transaction to a state that skips processing
    fn divert(
        &self,
        transaction: &mut Transaction,
        status: TransactionStatus,
        investigation: Option<String>,
        message: &str,
    ) -> TransactionResult {
        let tx_id = transaction.id();
        if transaction.status() != TransactionStatus::Pending {
            let error = LedgerError::invalid_transition(tx_id, (transaction.status(), status));
            return self.rejection(transaction, &error);
        }
        if let Err(error) = self.transactions.claim(transaction) {
            return self.rejection(transaction, &error);
        }

        if investigation.is_some() {
            transaction.mark_suspicious();
        }
        set_status(transaction, status);
        self.transactions.save(StoredTransaction {
            transaction: transaction.clone(),
            applied: false,
            investigation,
        });

        debug!(tx = %tx_id, account = account_label(transaction), status = %status, "Transaction diverted");
        TransactionResult::successful(
            transaction.clone(),
            self.primary_balance(transaction),
            Some(message),
        )
    }

    fn record(&self, transaction: &Transaction, applied: bool) {
        let snapshot = transaction.clone();
        let updated = self.transactions.update(transaction.id(), |record| {
            record.transaction = snapshot;
            record.applied = applied;
            Ok(())
        });
        if updated.is_err() {
            let mut record = StoredTransaction::new(transaction.clone());
            record.applied = applied;
            self.transactions.save(record);
        }
    }

    fn primary_balance(&self, transaction: &Transaction) -> Decimal {
        transaction
            .primary_account()
            .and_then(|account| self.accounts.get_balance(account))
            .unwrap_or(Decimal::ZERO)
    }

    fn rejection(&self, transaction: &Transaction, error: &LedgerError) -> TransactionResult {
        let tx_id = transaction.id();
        let code = error.error_code();
        if error.is_internal() {
            error!(tx = %tx_id, account = account_label(transaction), %code, %error, "Transaction failed");
        } else {
            warn!(tx = %tx_id, account = account_label(transaction), %code, %error, "Transaction rejected");
        }
        TransactionResult::from_error(error).with_transaction(transaction.clone())
    }

    fn operation_failed(&self, tx_id: TransactionId, error: &LedgerError) -> TransactionResult {
        match self.transactions.get(tx_id) {
            Some(record) => self.rejection(&record.transaction, error),
            None => {
                warn!(tx = %tx_id, code = %error.error_code(), %error, "Operation rejected");
                TransactionResult::from_error(error)
            }
        }
    }
}

fn set_status(transaction: &mut Transaction, status: TransactionStatus) {
    if let Err((from, to)) = transaction.transition(status) {
        error!(tx = %transaction.id(), %from, %to, "Unexpected status transition");
    }
}

fn account_label(transaction: &Transaction) -> &str {
    transaction
        .primary_account()
        .map(AccountId::as_str)
        .unwrap_or("-")
}
