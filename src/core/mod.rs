//! Core ledger logic
//!
//! - `factory` - Creation of pending transactions
//! - `traits` - Seams for balance storage and compliance rules
//! - `account_manager` - In-memory account balances
//! - `transaction_store` - Transaction history for idempotence and reversals
//! - `compliance` - Compliance checker implementations
//! - `rate_limit` - Per-account rate limiting
//! - `processor` - Transaction validation, application and lifecycle
//! - `batch_processor` - Concurrent processing of independent transactions

pub mod account_manager;
pub mod batch_processor;
pub mod compliance;
pub mod factory;
pub mod processor;
pub mod rate_limit;
pub mod traits;
pub mod transaction_store;

pub use account_manager::AccountManager;
pub use batch_processor::{BatchProcessor, ProcessingResult};
pub use compliance::{PermissiveCompliance, RuleBasedCompliance};
pub use factory::TransactionFactory;
pub use processor::{InvestigationOutcome, LedgerProcessor};
pub use rate_limit::{RateLimiter, RateSlot};
pub use traits::{BalanceStore, ComplianceChecker};
pub use transaction_store::{StoredTransaction, TransactionStore};
