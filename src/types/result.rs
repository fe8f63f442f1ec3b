//! Outcome values returned by the ledger processor
//!
//! A `TransactionResult` is a transient value handed back to the caller.
//! It can only be built through the named factories below, each of which
//! fixes a consistent combination of success flag, error code, balance and
//! message. A successful result always carries `ErrorCode::None`; a failed
//! one never does.

use super::error::LedgerError;
use super::transaction::Transaction;
use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;

/// Closed set of failure codes carried on a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    None,
    InsufficientFunds,
    InvalidAmount,
    InvalidSource,
    InvalidDestination,
    DuplicateTransaction,
    RateLimitExceeded,
    ComplianceViolation,
    FrozenAccount,
    Unknown,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::None => "none",
            ErrorCode::InsufficientFunds => "insufficient_funds",
            ErrorCode::InvalidAmount => "invalid_amount",
            ErrorCode::InvalidSource => "invalid_source",
            ErrorCode::InvalidDestination => "invalid_destination",
            ErrorCode::DuplicateTransaction => "duplicate_transaction",
            ErrorCode::RateLimitExceeded => "rate_limit_exceeded",
            ErrorCode::ComplianceViolation => "compliance_violation",
            ErrorCode::FrozenAccount => "frozen_account",
            ErrorCode::Unknown => "unknown",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Two-decimal currency rendering, rounding half away from zero
pub fn format_currency(amount: Decimal) -> String {
    format!(
        "{:.2}",
        amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
    )
}

const DEFAULT_SUCCESS_MESSAGE: &str = "Transaction completed successfully";
const INTERNAL_FAILURE_MESSAGE: &str = "Transaction could not be processed";

/// Outcome of a ledger operation
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionResult {
    success: bool,
    message: String,
    transaction: Option<Transaction>,
    new_balance: Option<Decimal>,
    error_code: ErrorCode,
    violation: Option<String>,
}

impl TransactionResult {
    /// Successful outcome with the resulting balance of the affected account
    pub fn successful(transaction: Transaction, new_balance: Decimal, message: Option<&str>) -> Self {
        TransactionResult {
            success: true,
            message: message.unwrap_or(DEFAULT_SUCCESS_MESSAGE).to_string(),
            transaction: Some(transaction),
            new_balance: Some(new_balance),
            error_code: ErrorCode::None,
            violation: None,
        }
    }

    /// Failed outcome with `ErrorCode::Unknown`
    pub fn failed(message: impl Into<String>) -> Self {
        Self::failed_with_code(message, ErrorCode::Unknown)
    }

    /// Failed outcome with a specific code
    ///
    /// `ErrorCode::None` is not a failure code and is recorded as `Unknown`.
    pub fn failed_with_code(message: impl Into<String>, error_code: ErrorCode) -> Self {
        let error_code = match error_code {
            ErrorCode::None => ErrorCode::Unknown,
            code => code,
        };
        TransactionResult {
            success: false,
            message: message.into(),
            transaction: None,
            new_balance: None,
            error_code,
            violation: None,
        }
    }

    /// Debit refused for lack of funds
    pub fn insufficient_funds(available: Decimal, required: Decimal) -> Self {
        Self::failed_with_code(
            format!(
                "Insufficient funds. Available: ${}, Required: ${}",
                format_currency(available),
                format_currency(required)
            ),
            ErrorCode::InsufficientFunds,
        )
    }

    /// Transaction refused by a compliance rule
    pub fn compliance_violation(description: impl Into<String>) -> Self {
        let description = description.into();
        let mut result = Self::failed_with_code(
            format!("Compliance violation: {}", description),
            ErrorCode::ComplianceViolation,
        );
        result.violation = Some(description);
        result
    }

    /// Fold a ledger error into the matching factory
    ///
    /// Internal errors surface as a generic `Unknown` failure.
    pub fn from_error(error: &LedgerError) -> Self {
        match error {
            LedgerError::InsufficientFunds {
                available,
                required,
                ..
            } => Self::insufficient_funds(*available, *required),
            LedgerError::ComplianceViolation { violation, .. } => {
                Self::compliance_violation(violation.clone())
            }
            e if e.is_internal() => Self::failed(INTERNAL_FAILURE_MESSAGE),
            e => Self::failed_with_code(e.to_string(), e.error_code()),
        }
    }

    /// Attach the affected transaction for diagnosis
    pub fn with_transaction(mut self, transaction: Transaction) -> Self {
        self.transaction = Some(transaction);
        self
    }

    pub fn success(&self) -> bool {
        self.success
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn transaction(&self) -> Option<&Transaction> {
        self.transaction.as_ref()
    }

    /// Resulting balance; only present on success
    pub fn new_balance(&self) -> Option<Decimal> {
        self.new_balance
    }

    pub fn error_code(&self) -> ErrorCode {
        self.error_code
    }

    pub fn violation(&self) -> Option<&str> {
        self.violation.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, TransactionId, TransactionType};
    use chrono::Utc;
    use rstest::rstest;

    fn sample_transaction() -> Transaction {
        Transaction::new(
            TransactionType::Advertising,
            Decimal::new(2500, 2),
            "TV spot".to_string(),
            Utc::now(),
        )
    }

    #[test]
    fn test_insufficient_funds_message() {
        let result = TransactionResult::insufficient_funds(Decimal::from(80), Decimal::from(100));

        assert!(!result.success());
        assert_eq!(result.error_code(), ErrorCode::InsufficientFunds);
        assert_eq!(
            result.message(),
            "Insufficient funds. Available: $80.00, Required: $100.00"
        );
        assert_eq!(result.new_balance(), None);
        assert!(result.transaction().is_none());
    }

    #[rstest]
    #[case(Decimal::new(12345, 3), Decimal::new(5, 1), "Available: $12.35, Required: $0.50")]
    #[case(Decimal::ZERO, Decimal::new(1, 2), "Available: $0.00, Required: $0.01")]
    fn test_insufficient_funds_two_decimals(
        #[case] available: Decimal,
        #[case] required: Decimal,
        #[case] expected: &str,
    ) {
        let result = TransactionResult::insufficient_funds(available, required);
        assert!(result.message().ends_with(expected), "{}", result.message());
    }

    #[test]
    fn test_successful_result() {
        let tx = sample_transaction();
        let result = TransactionResult::successful(tx.clone(), Decimal::from(50), None);

        assert!(result.success());
        assert_eq!(result.error_code(), ErrorCode::None);
        assert_eq!(result.new_balance(), Some(Decimal::from(50)));
        assert_eq!(result.transaction(), Some(&tx));
        assert_eq!(result.message(), "Transaction completed successfully");
    }

    #[test]
    fn test_successful_result_custom_message() {
        let result =
            TransactionResult::successful(sample_transaction(), Decimal::ZERO, Some("Refunded"));
        assert_eq!(result.message(), "Refunded");
    }

    #[test]
    fn test_failed_defaults_to_unknown() {
        let result = TransactionResult::failed("Something went wrong");

        assert!(!result.success());
        assert_eq!(result.error_code(), ErrorCode::Unknown);
        assert!(result.transaction().is_none());
        assert_eq!(result.new_balance(), None);
    }

    #[test]
    fn test_failed_never_carries_none_code() {
        let result = TransactionResult::failed_with_code("nope", ErrorCode::None);
        assert_eq!(result.error_code(), ErrorCode::Unknown);
    }

    #[test]
    fn test_compliance_violation_keeps_description() {
        let result = TransactionResult::compliance_violation("Contribution limit exceeded");

        assert_eq!(result.error_code(), ErrorCode::ComplianceViolation);
        assert_eq!(result.violation(), Some("Contribution limit exceeded"));
        assert_eq!(
            result.message(),
            "Compliance violation: Contribution limit exceeded"
        );
    }

    #[test]
    fn test_from_error_uses_insufficient_funds_factory() {
        let error = LedgerError::insufficient_funds(
            &AccountId::new("war_chest"),
            Decimal::from(50),
            Decimal::from(100),
        );

        assert_eq!(
            TransactionResult::from_error(&error),
            TransactionResult::insufficient_funds(Decimal::from(50), Decimal::from(100))
        );
    }

    #[test]
    fn test_from_error_hides_internal_detail() {
        let error = LedgerError::arithmetic_overflow("credit", &AccountId::new("war_chest"));
        let result = TransactionResult::from_error(&error);

        assert_eq!(result.error_code(), ErrorCode::Unknown);
        assert!(!result.message().contains("overflow"));
    }

    #[test]
    fn test_from_error_keeps_code() {
        let error = LedgerError::duplicate_transaction(TransactionId::generate());
        let result = TransactionResult::from_error(&error);

        assert_eq!(result.error_code(), ErrorCode::DuplicateTransaction);
        assert_eq!(result.message(), error.to_string());
    }

    #[test]
    fn test_with_transaction_keeps_failure_shape() {
        let tx = sample_transaction();
        let result = TransactionResult::failed_with_code("frozen", ErrorCode::FrozenAccount)
            .with_transaction(tx.clone());

        assert!(!result.success());
        assert_eq!(result.error_code(), ErrorCode::FrozenAccount);
        assert_eq!(result.transaction(), Some(&tx));
        assert_eq!(result.new_balance(), None);
    }
}
