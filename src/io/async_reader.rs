//! Asynchronous CSV reader with batch interface
//!
//! Streams scenario rows with csv-async and hands them out in batches for
//! the concurrent replay strategy.
//!
//! ```text
//! CSV file → AsyncReader → batches of pending Transactions
//!                 ↓
//!          csv_format module
//!          (CsvRecord, convert_csv_record)
//! ```

use crate::core::TransactionFactory;
use crate::io::csv_format::{convert_csv_record, CsvRecord};
use crate::types::{LedgerError, Transaction};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

pub struct AsyncReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
    factory: TransactionFactory,
    line_num: usize,
}

impl<R: AsyncRead + Unpin + Send + 'static> AsyncReader<R> {
    pub fn new(reader: R, factory: TransactionFactory) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self {
            csv_reader,
            factory,
            line_num: 1,
        }
    }

    /// Read up to `batch_size` transactions
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Maximum number of transactions to return
    ///
    /// # Returns
    ///
    /// Converted transactions in file order. Malformed rows are logged and
    /// skipped. An empty vector means end of input.
    pub async fn read_batch(&mut self, batch_size: usize) -> Vec<Transaction> {
        let mut batch = Vec::with_capacity(batch_size);
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while batch.len() < batch_size {
            let Some(row) = records.next().await else {
                break;
            };
            self.line_num += 1;

            let converted = row
                .map_err(|e| LedgerError::parse_error(self.line_num, e.to_string()))
                .and_then(|csv_record| {
                    convert_csv_record(csv_record, &self.factory)
                        .map_err(|e| LedgerError::parse_error(self.line_num, e))
                });

            match converted {
                Ok(transaction) => batch.push(transaction),
                Err(error) => warn!(%error, "Skipping malformed row"),
            }
        }

        batch
    }
}
