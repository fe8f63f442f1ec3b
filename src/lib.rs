//! Campaign Finance Ledger Library
//! # Overview
//!
//! The financial core of a campaign simulation: accounts, typed campaign
//! transactions, compliance rules, and a processor that applies
//! transactions atomically. Scenarios are replayed from CSV with either a
//! sequential or a concurrent batch strategy.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (Account, Transaction, TransactionResult, errors)
//! - [`clock`] - Time source used for stamping and rate windows
//! - [`config`] - Compliance rules, rate limits and reporting threshold
//! - [`core`] - Business logic components:
//!   - [`core::processor`] - Validation, application and lifecycle of transactions
//!   - [`core::account_manager`] - Account state and balance operations
//!   - [`core::transaction_store`] - Transaction history for idempotence and reversals
//!   - [`core::compliance`] - Blocked entities, dark money, contribution limits
//!   - [`core::batch_processor`] - Concurrent processing of independent transactions
//! - [`io`] - CSV reading and writing
//! - [`strategy`] - Sync and async replay pipelines
//! - [`cli`] - CLI arguments parsing
//!
//! # Transaction Flows
//!
//! Every transaction type has a fixed direction:
//!
//! - **Inflow** (donations, self funding, loans): credit the destination account
//! - **Outflow** (advertising, payroll, travel, ...): debit the source account
//! - **Transfer** (party and PAC transfers): debit the source, credit the destination
//!
//! A transaction starts `Pending` and ends `Completed`, `Failed` or
//! `Cancelled`. Completed transactions can later be refunded or put under
//! investigation.

pub mod cli;
pub mod clock;
pub mod config;
pub mod core;
pub mod io;
pub mod strategy;
pub mod types;

pub use core::{AccountManager, InvestigationOutcome, LedgerProcessor, TransactionFactory};
pub use io::{write_accounts_csv, write_results_csv};
pub use types::{
    format_currency, Account, AccountId, ErrorCode, LedgerError, Transaction, TransactionId,
    TransactionResult, TransactionStatus, TransactionType,
};
