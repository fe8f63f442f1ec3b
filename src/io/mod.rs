//! I/O module
//!
//! Scenario CSV input and balance/result CSV output.
//!
//! - `csv_format` - Row conversion and output serialization
//! - `sync_reader` - Synchronous reader with iterator interface
//! - `async_reader` - Asynchronous reader with batch interface

pub mod async_reader;
pub mod csv_format;
pub mod sync_reader;

pub use async_reader::AsyncReader;
pub use csv_format::{convert_csv_record, write_accounts_csv, write_results_csv, CsvRecord};
pub use sync_reader::SyncReader;
