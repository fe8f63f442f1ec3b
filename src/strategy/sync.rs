//! Synchronous replay strategy
//!
//! Streams rows with `SyncReader` and processes them one by one on the
//! calling thread. Memory use is bounded by the number of accounts and
//! recorded transactions, not by the file size.

use crate::config::LedgerConfig;
use crate::io::csv_format::write_accounts_csv;
use crate::io::sync_reader::SyncReader;
use crate::strategy::{Ledger, ProcessingStrategy};
use crate::types::{LedgerError, TransactionResult};
use std::io::Write;
use std::path::Path;
use tracing::warn;

#[derive(Debug, Clone, Default)]
pub struct SyncProcessingStrategy {
    config: LedgerConfig,
}

impl SyncProcessingStrategy {
    pub fn new(config: LedgerConfig) -> Self {
        Self { config }
    }
}

impl ProcessingStrategy for SyncProcessingStrategy {
    fn process(
        &self,
        input_path: &Path,
        output: &mut dyn Write,
    ) -> Result<Vec<TransactionResult>, LedgerError> {
        let ledger = Ledger::new(&self.config);
        let reader = SyncReader::new(input_path, ledger.factory.clone())?;

        let mut results = Vec::new();
        for row in reader {
            match row {
                Ok(mut transaction) => results.push(ledger.processor.process(&mut transaction)),
                Err(e) => warn!(error = %e, "Skipping malformed row"),
            }
        }

        write_accounts_csv(&ledger.accounts.get_all_accounts(), output)?;
        Ok(results)
    }
}
