//! Error types for the campaign finance ledger
//!
//! `LedgerError` is the internal error currency of the crate. It never crosses
//! the processor boundary as-is: the processor folds every error into a
//! [`TransactionResult`](super::TransactionResult) carrying exactly one
//! [`ErrorCode`](super::ErrorCode).
//!
//! # Error Categories
//!
//! - **File I/O Errors**: File not found, permission denied, etc.
//! - **CSV Parsing Errors**: Malformed scenario rows
//! - **Transaction Errors**: Insufficient funds, frozen accounts, compliance, etc.
//! - **Internal Errors**: Arithmetic overflow, runtime failures

use super::result::ErrorCode;
use super::transaction::{AccountId, TransactionId, TransactionStatus};
use rust_decimal::Decimal;
use thiserror::Error;

/// Main error type for the ledger
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LedgerError {
    /// File not found at the specified path
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError { message: String },

    /// CSV parsing error occurred
    ///
    /// Recoverable: the malformed row is skipped.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError { line: Option<u64>, message: String },

    /// Amount is zero or negative
    #[error("Invalid amount {amount} for transaction {tx}")]
    InvalidAmount { tx: TransactionId, amount: Decimal },

    /// Account opened or topped up with a negative balance
    #[error("Invalid opening balance {amount} for account {account}")]
    InvalidOpeningBalance { account: AccountId, amount: Decimal },

    /// Debited account cannot cover the amount
    #[error("Insufficient funds in account {account}: available {available}, required {required}")]
    InsufficientFunds {
        account: AccountId,
        available: Decimal,
        required: Decimal,
    },

    /// Debit side is missing or unknown
    #[error("Invalid source for transaction {tx}: {reason}")]
    InvalidSource { tx: TransactionId, reason: String },

    /// Credit side is missing or unusable
    #[error("Invalid destination for transaction {tx}: {reason}")]
    InvalidDestination { tx: TransactionId, reason: String },

    /// Transaction was already processed, cancelled or held
    #[error("Transaction {tx} has already been submitted")]
    DuplicateTransaction { tx: TransactionId },

    /// Too many transactions against one account in the current window
    #[error("Rate limit exceeded for account {account}: at most {limit} transactions per window")]
    RateLimitExceeded { account: AccountId, limit: u32 },

    /// Compliance rules rejected the transaction
    #[error("Compliance violation on transaction {tx}: {violation}")]
    ComplianceViolation { tx: TransactionId, violation: String },

    /// Account is frozen and cannot move money
    #[error("Account {account} is frozen")]
    AccountFrozen { account: AccountId },

    /// Lifecycle state machine refused a transition
    #[error("Transaction {tx} cannot move from {from} to {to}")]
    InvalidTransition {
        tx: TransactionId,
        from: TransactionStatus,
        to: TransactionStatus,
    },

    /// No transaction with this id has been recorded
    #[error("Transaction {tx} not found")]
    TransactionNotFound { tx: TransactionId },

    /// Arithmetic overflow would occur
    #[error("Arithmetic overflow in {operation} for account {account}")]
    ArithmeticOverflow { operation: String, account: AccountId },

    /// Async runtime could not be started
    #[error("Runtime error: {message}")]
    RuntimeError { message: String },
}

impl From<std::io::Error> for LedgerError {
    fn from(error: std::io::Error) -> Self {
        LedgerError::IoError {
            message: error.to_string(),
        }
    }
}

impl From<csv::Error> for LedgerError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        LedgerError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

impl LedgerError {
    /// The single result code this error surfaces as
    pub fn error_code(&self) -> ErrorCode {
        match self {
            LedgerError::InvalidAmount { .. } | LedgerError::InvalidOpeningBalance { .. } => {
                ErrorCode::InvalidAmount
            }
            LedgerError::InsufficientFunds { .. } => ErrorCode::InsufficientFunds,
            LedgerError::InvalidSource { .. } => ErrorCode::InvalidSource,
            LedgerError::InvalidDestination { .. } => ErrorCode::InvalidDestination,
            LedgerError::DuplicateTransaction { .. } => ErrorCode::DuplicateTransaction,
            LedgerError::RateLimitExceeded { .. } => ErrorCode::RateLimitExceeded,
            LedgerError::ComplianceViolation { .. } => ErrorCode::ComplianceViolation,
            LedgerError::AccountFrozen { .. } => ErrorCode::FrozenAccount,
            LedgerError::FileNotFound { .. }
            | LedgerError::IoError { .. }
            | LedgerError::ParseError { .. }
            | LedgerError::InvalidTransition { .. }
            | LedgerError::TransactionNotFound { .. }
            | LedgerError::ArithmeticOverflow { .. }
            | LedgerError::RuntimeError { .. } => ErrorCode::Unknown,
        }
    }

    /// Errors whose detail stays in the logs and is never shown to the player
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            LedgerError::FileNotFound { .. }
                | LedgerError::IoError { .. }
                | LedgerError::ParseError { .. }
                | LedgerError::ArithmeticOverflow { .. }
                | LedgerError::RuntimeError { .. }
        )
    }
}

// Helper functions for creating common errors

impl LedgerError {
    pub fn insufficient_funds(account: &AccountId, available: Decimal, required: Decimal) -> Self {
        LedgerError::InsufficientFunds {
            account: account.clone(),
            available,
            required,
        }
    }

    pub fn invalid_amount(tx: TransactionId, amount: Decimal) -> Self {
        LedgerError::InvalidAmount { tx, amount }
    }

    pub fn invalid_opening_balance(account: &AccountId, amount: Decimal) -> Self {
        LedgerError::InvalidOpeningBalance {
            account: account.clone(),
            amount,
        }
    }

    /// Row that could not be read or converted, with its line in the file
    pub fn parse_error(line: usize, message: impl Into<String>) -> Self {
        LedgerError::ParseError {
            line: Some(line as u64),
            message: message.into(),
        }
    }

    pub fn invalid_source(tx: TransactionId, reason: impl Into<String>) -> Self {
        LedgerError::InvalidSource {
            tx,
            reason: reason.into(),
        }
    }

    pub fn invalid_destination(tx: TransactionId, reason: impl Into<String>) -> Self {
        LedgerError::InvalidDestination {
            tx,
            reason: reason.into(),
        }
    }

    pub fn duplicate_transaction(tx: TransactionId) -> Self {
        LedgerError::DuplicateTransaction { tx }
    }

    pub fn rate_limit_exceeded(account: &AccountId, limit: u32) -> Self {
        LedgerError::RateLimitExceeded {
            account: account.clone(),
            limit,
        }
    }

    pub fn compliance_violation(tx: TransactionId, violation: impl Into<String>) -> Self {
        LedgerError::ComplianceViolation {
            tx,
            violation: violation.into(),
        }
    }

    pub fn account_frozen(account: &AccountId) -> Self {
        LedgerError::AccountFrozen {
            account: account.clone(),
        }
    }

    pub fn invalid_transition(
        tx: TransactionId,
        (from, to): (TransactionStatus, TransactionStatus),
    ) -> Self {
        LedgerError::InvalidTransition { tx, from, to }
    }

    pub fn transaction_not_found(tx: TransactionId) -> Self {
        LedgerError::TransactionNotFound { tx }
    }

    pub fn arithmetic_overflow(operation: &str, account: &AccountId) -> Self {
        LedgerError::ArithmeticOverflow {
            operation: operation.to_string(),
            account: account.clone(),
        }
    }
}
