//! Synchronous CSV reader with iterator interface
//!
//! Streams scenario rows from a CSV file one at a time, delegating parsing
//! and conversion to the `csv_format` module.
//!
//! ```no_run
//! use campaign_finance_ledger::core::TransactionFactory;
//! use campaign_finance_ledger::io::SyncReader;
//! use std::path::Path;
//!
//! let reader = SyncReader::new(Path::new("scenario.csv"), TransactionFactory::default()).unwrap();
//! for row in reader {
//!     match row {
//!         Ok(transaction) => println!("{} {}", transaction.tx_type(), transaction.amount()),
//!         Err(e) => eprintln!("Skipped: {}", e),
//!     }
//! }
//! ```
//!
//! Fatal errors (missing or unreadable file) are returned from `new()`.
//! Malformed rows are yielded as `LedgerError::ParseError` with their line
//! number so the caller can log and skip them.

use crate::core::TransactionFactory;
use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerError, Transaction};
use csv::{ReaderBuilder, Trim};
use std::fs::File;
use std::io::ErrorKind;
use std::path::Path;

#[derive(Debug)]
pub struct SyncReader {
    reader: csv::Reader<File>,
    factory: TransactionFactory,
    line_num: usize,
}

/// Map a failure to open an input file to a fatal ledger error
pub(crate) fn open_error(path: &Path, error: std::io::Error) -> LedgerError {
    if error.kind() == ErrorKind::NotFound {
        LedgerError::FileNotFound {
            path: path.display().to_string(),
        }
    } else {
        LedgerError::IoError {
            message: format!("Failed to open file '{}': {}", path.display(), error),
        }
    }
}

impl SyncReader {
    /// Open a scenario file for streaming
    ///
    /// Fields are trimmed and rows may omit trailing optional columns.
    pub fn new(path: &Path, factory: TransactionFactory) -> Result<Self, LedgerError> {
        let file = File::open(path).map_err(|e| open_error(path, e))?;

        let reader = ReaderBuilder::new()
            .trim(Trim::All)
            .flexible(true)
            .buffer_capacity(8 * 1024)
            .from_reader(file);

        Ok(Self {
            reader,
            factory,
            line_num: 1,
        })
    }
}

impl Iterator for SyncReader {
    type Item = Result<Transaction, LedgerError>;

    /// Read and convert the next row
    ///
    /// # Returns
    ///
    /// * `Some(Ok(transaction))` - A pending transaction built from the row
    /// * `Some(Err(LedgerError::ParseError))` - The row was malformed; reading can continue
    /// * `None` - End of file
    fn next(&mut self) -> Option<Self::Item> {
        let mut deserializer = self.reader.deserialize::<CsvRecord>();
        let row = deserializer.next()?;
        self.line_num += 1;

        Some(match row {
            Ok(csv_record) => convert_csv_record(csv_record, &self.factory)
                .map_err(|e| LedgerError::parse_error(self.line_num, e)),
            Err(e) => Err(LedgerError::from(e)),
        })
    }
}
