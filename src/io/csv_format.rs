//! CSV format handling for scenario rows, account balances and results
//!
//! This module centralizes all CSV format concerns:
//! - `CsvRecord` structure for deserialization
//! - Conversion from CSV records to pending transactions
//! - Account and result serialization
//!
//! Conversion and serialization do no file I/O of their own.

use crate::core::TransactionFactory;
use crate::types::{format_currency, Account, LedgerError, Transaction, TransactionResult, TransactionType};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::io::Write;
use std::str::FromStr;

/// One scenario row
///
/// Only `type` and `amount` are required; every other column may be left
/// out of the header entirely or left empty.
#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub destination: Option<String>,
    #[serde(default)]
    pub from_account: Option<String>,
    #[serde(default)]
    pub to_account: Option<String>,
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub entity_name: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub dark_money: Option<String>,
    #[serde(default)]
    pub suspicious: Option<String>,
}

fn present(field: Option<String>) -> Option<String> {
    field
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn parse_flag(name: &str, field: Option<String>) -> Result<bool, String> {
    match present(field) {
        None => Ok(false),
        Some(value) => match value.to_lowercase().as_str() {
            "true" | "yes" | "1" => Ok(true),
            "false" | "no" | "0" => Ok(false),
            _ => Err(format!("Invalid {} flag '{}'", name, value)),
        },
    }
}

/// Convert a `CsvRecord` into a pending transaction
///
/// Only the shape of the row is checked here. Whether the amount is
/// positive or the accounts exist is decided by the processor, so such rows
/// still produce a (failed) result.
///
/// # Arguments
///
/// * `csv_record` - The deserialized row
/// * `factory` - Stamps the new transaction with an id and creation time
///
/// # Returns
///
/// * `Ok(Transaction)` - A `Pending` transaction
/// * `Err(String)` - Unknown type, unparsable or missing amount, or an invalid flag value
pub fn convert_csv_record(
    csv_record: CsvRecord,
    factory: &TransactionFactory,
) -> Result<Transaction, String> {
    let tx_type = TransactionType::from_str(&csv_record.tx_type)?;

    let amount = match present(csv_record.amount) {
        Some(amount_str) => Decimal::from_str(&amount_str)
            .map_err(|_| format!("Invalid amount '{}' for {}", amount_str, tx_type))?,
        None => return Err(format!("{} transaction requires an amount", tx_type)),
    };

    let dark_money = parse_flag("dark_money", csv_record.dark_money)?;
    let suspicious = parse_flag("suspicious", csv_record.suspicious)?;

    let mut transaction = factory
        .create_between(
            tx_type,
            amount,
            present(csv_record.source).unwrap_or_default(),
            present(csv_record.destination).unwrap_or_default(),
            present(csv_record.description).unwrap_or_default(),
        )
        .with_dark_money(dark_money)
        .with_suspicious(suspicious);

    if let Some(category) = present(csv_record.category) {
        transaction = transaction.with_category(category);
    }
    if let Some(from) = present(csv_record.from_account) {
        transaction = transaction.with_from_account(from.as_str());
    }
    if let Some(to) = present(csv_record.to_account) {
        transaction = transaction.with_to_account(to.as_str());
    }
    if let Some(entity_id) = present(csv_record.entity_id) {
        let name = present(csv_record.entity_name).unwrap_or_default();
        transaction = transaction.with_related_entity(entity_id, name);
    }

    Ok(transaction)
}

fn write_error(what: &str, error: impl std::fmt::Display) -> LedgerError {
    LedgerError::IoError {
        message: format!("Failed to write {}: {}", what, error),
    }
}

/// Write account balances as CSV
///
/// Columns: account, balance, frozen. Rows are sorted by account id and
/// balances are rendered with two decimals.
pub fn write_accounts_csv(accounts: &[Account], output: &mut dyn Write) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record(["account", "balance", "frozen"])
        .map_err(|e| write_error("CSV header", e))?;

    let mut sorted_accounts = accounts.to_vec();
    sorted_accounts.sort_by(|a, b| a.id.cmp(&b.id));

    for account in sorted_accounts {
        writer
            .write_record([
                account.id.to_string(),
                format_currency(account.balance),
                account.frozen.to_string(),
            ])
            .map_err(|e| write_error("account record", e))?;
    }

    writer.flush().map_err(|e| write_error("output", e))?;
    Ok(())
}

/// Write one row per transaction result, in the order given
pub fn write_results_csv(
    results: &[TransactionResult],
    output: &mut dyn Write,
) -> Result<(), LedgerError> {
    let mut writer = csv::Writer::from_writer(output);

    writer
        .write_record([
            "id",
            "type",
            "amount",
            "status",
            "success",
            "error_code",
            "new_balance",
            "message",
            "violation",
        ])
        .map_err(|e| write_error("CSV header", e))?;

    for result in results {
        let (id, tx_type, amount, status) = match result.transaction() {
            Some(tx) => (
                tx.id().to_string(),
                tx.tx_type().to_string(),
                format_currency(tx.amount()),
                tx.status().to_string(),
            ),
            None => Default::default(),
        };

        writer
            .write_record([
                id,
                tx_type,
                amount,
                status,
                result.success().to_string(),
                result.error_code().to_string(),
                result.new_balance().map(format_currency).unwrap_or_default(),
                result.message().to_string(),
                result.violation().unwrap_or_default().to_string(),
            ])
            .map_err(|e| write_error("result record", e))?;
    }

    writer.flush().map_err(|e| write_error("output", e))?;
    Ok(())
}
