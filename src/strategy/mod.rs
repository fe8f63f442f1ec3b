//! Replay strategies
//!
//! A strategy is a complete pipeline: read a scenario CSV, run every row
//! through a fresh ledger, and write the final account balances. The
//! synchronous and the concurrent strategy produce the same balances and
//! the same per-row results for the same input.

use crate::cli::StrategyType;
use crate::clock::{Clock, SystemClock};
use crate::config::LedgerConfig;
use crate::core::{AccountManager, LedgerProcessor, TransactionFactory};
use crate::types::{LedgerError, TransactionResult};
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

pub mod r#async;
pub mod sync;

pub use self::r#async::{AsyncProcessingStrategy, BatchConfig};
pub use sync::SyncProcessingStrategy;

pub trait ProcessingStrategy: Send + Sync {
    /// Replay `input_path` and write final balances to `output`
    ///
    /// Returns one result per accepted row, in input order. Malformed rows
    /// are logged and skipped; rejected transactions are results, not
    /// errors.
    ///
    /// # Errors
    ///
    /// Fails only on fatal problems: the input cannot be opened or read,
    /// the output cannot be written, or the async runtime cannot start.
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Vec<TransactionResult>, LedgerError>;
}

/// Everything one replay needs, built fresh per run
pub(crate) struct Ledger {
    pub accounts: Arc<AccountManager>,
    pub processor: LedgerProcessor,
    pub factory: TransactionFactory,
}

impl Ledger {
    pub fn new(config: &LedgerConfig) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let accounts = Arc::new(AccountManager::new());
        let processor = LedgerProcessor::from_config(config, accounts.clone(), clock.clone());

        Self {
            accounts,
            processor,
            factory: TransactionFactory::new(clock),
        }
    }
}

/// Select a strategy at runtime
///
/// # Arguments
///
/// * `strategy_type` - Sequential or concurrent replay
/// * `ledger` - Compliance, rate limit and reporting rules for the run
/// * `batch` - Batch settings, used only by the async strategy; `None` means defaults
///
/// # Returns
///
/// A boxed strategy ready to replay a scenario file.
pub fn create_strategy(
    strategy_type: StrategyType,
    ledger: LedgerConfig,
    batch: Option<BatchConfig>,
) -> Box<dyn ProcessingStrategy> {
    match strategy_type {
        StrategyType::Sync => Box::new(SyncProcessingStrategy::new(ledger)),
        StrategyType::Async => Box::new(AsyncProcessingStrategy::new(
            ledger,
            batch.unwrap_or_default(),
        )),
    }
}
