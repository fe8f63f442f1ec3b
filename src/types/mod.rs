//! Types module
//!
//! Contains core data structures used throughout the application.
//! - `account`: Ledger account state
//! - `transaction`: Transaction record, kinds, lifecycle status and identifiers
//! - `result`: Result values and error codes returned by the processor
//! - `error`: Internal error type

pub mod account;
pub mod error;
pub mod result;
pub mod transaction;

pub use account::Account;
pub use error::LedgerError;
pub use result::{format_currency, ErrorCode, TransactionResult};
pub use transaction::{
    AccountId, Flow, Transaction, TransactionId, TransactionStatus, TransactionType,
};
