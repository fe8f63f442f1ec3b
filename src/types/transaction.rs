//! Transaction-related types for the campaign finance ledger
//!
//! This module defines the transaction record, its classification, and the
//! lifecycle state machine the ledger processor drives it through.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Unique transaction identifier
///
/// A random 128-bit UUID assigned once at creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionId(Uuid);

impl TransactionId {
    /// Generate a fresh, collision-resistant identifier
    pub fn generate() -> Self {
        TransactionId(Uuid::new_v4())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Ledger account identifier (campaign war chest, party fund, PAC account, ...)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(String);

impl AccountId {
    pub fn new(id: impl Into<String>) -> Self {
        AccountId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AccountId {
    fn from(id: &str) -> Self {
        AccountId::new(id)
    }
}

/// Direction in which a transaction moves money through the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    /// Credits `to_account`
    Inflow,
    /// Debits `from_account`
    Outflow,
    /// Debits `from_account` and credits `to_account`
    Transfer,
}

impl Flow {
    /// Whether this flow takes money out of `from_account`
    pub fn debits(&self) -> bool {
        matches!(self, Flow::Outflow | Flow::Transfer)
    }

    /// Whether this flow puts money into `to_account`
    pub fn credits(&self) -> bool {
        matches!(self, Flow::Inflow | Flow::Transfer)
    }
}

/// Kinds of campaign finance transactions
///
/// The set is closed and falls into four groups: income, expenses,
/// transfers, and special (mostly illicit) movements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransactionType {
    // Income
    IndividualDonation,
    PacDonation,
    CorporateDonation,
    SmallDollarDonation,
    FundraisingEvent,
    SelfFunding,

    // Expenses
    Advertising,
    StaffSalary,
    EventCosts,
    Travel,
    Consulting,
    Polling,
    OfficeRent,
    LegalFees,

    // Transfers
    InternalTransfer,
    PartyTransfer,
    PacTransfer,

    // Special
    DarkMoneyContribution,
    Kickback,
    Bribe,
    Embezzlement,
    Fine,
    MoneyLaundering,
}

impl TransactionType {
    /// Every transaction type, in declaration order
    pub const ALL: [TransactionType; 23] = [
        TransactionType::IndividualDonation,
        TransactionType::PacDonation,
        TransactionType::CorporateDonation,
        TransactionType::SmallDollarDonation,
        TransactionType::FundraisingEvent,
        TransactionType::SelfFunding,
        TransactionType::Advertising,
        TransactionType::StaffSalary,
        TransactionType::EventCosts,
        TransactionType::Travel,
        TransactionType::Consulting,
        TransactionType::Polling,
        TransactionType::OfficeRent,
        TransactionType::LegalFees,
        TransactionType::InternalTransfer,
        TransactionType::PartyTransfer,
        TransactionType::PacTransfer,
        TransactionType::DarkMoneyContribution,
        TransactionType::Kickback,
        TransactionType::Bribe,
        TransactionType::Embezzlement,
        TransactionType::Fine,
        TransactionType::MoneyLaundering,
    ];

    /// Money flow for this kind of transaction
    pub fn flow(&self) -> Flow {
        use TransactionType::*;
        match self {
            IndividualDonation | PacDonation | CorporateDonation | SmallDollarDonation
            | FundraisingEvent | SelfFunding | DarkMoneyContribution | Kickback => Flow::Inflow,
            Advertising | StaffSalary | EventCosts | Travel | Consulting | Polling
            | OfficeRent | LegalFees | Bribe | Embezzlement | Fine => Flow::Outflow,
            InternalTransfer | PartyTransfer | PacTransfer | MoneyLaundering => Flow::Transfer,
        }
    }

    /// Donations are subject to attribution and contribution limits
    pub fn is_donation(&self) -> bool {
        matches!(
            self,
            TransactionType::IndividualDonation
                | TransactionType::PacDonation
                | TransactionType::CorporateDonation
                | TransactionType::SmallDollarDonation
                | TransactionType::DarkMoneyContribution
        )
    }

    pub fn is_illicit(&self) -> bool {
        matches!(
            self,
            TransactionType::DarkMoneyContribution
                | TransactionType::Kickback
                | TransactionType::Bribe
                | TransactionType::Embezzlement
                | TransactionType::Fine
                | TransactionType::MoneyLaundering
        )
    }

    pub fn as_str(&self) -> &'static str {
        use TransactionType::*;
        match self {
            IndividualDonation => "individual_donation",
            PacDonation => "pac_donation",
            CorporateDonation => "corporate_donation",
            SmallDollarDonation => "small_dollar_donation",
            FundraisingEvent => "fundraising_event",
            SelfFunding => "self_funding",
            Advertising => "advertising",
            StaffSalary => "staff_salary",
            EventCosts => "event_costs",
            Travel => "travel",
            Consulting => "consulting",
            Polling => "polling",
            OfficeRent => "office_rent",
            LegalFees => "legal_fees",
            InternalTransfer => "internal_transfer",
            PartyTransfer => "party_transfer",
            PacTransfer => "pac_transfer",
            DarkMoneyContribution => "dark_money_contribution",
            Kickback => "kickback",
            Bribe => "bribe",
            Embezzlement => "embezzlement",
            Fine => "fine",
            MoneyLaundering => "money_laundering",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    /// Parse the snake_case form, ignoring case and surrounding whitespace
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim().to_lowercase();
        TransactionType::ALL
            .iter()
            .copied()
            .find(|kind| kind.as_str() == needle)
            .ok_or_else(|| format!("Invalid transaction type: '{}'", s))
    }
}

/// Lifecycle status of a transaction
///
/// The valid transitions are:
/// - Pending → Completed | Failed | Cancelled | UnderInvestigation
/// - Completed → Refunded | UnderInvestigation
/// - UnderInvestigation → Completed | Failed
///
/// Nothing ever returns to Pending.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionStatus {
    Pending,
    Completed,
    Failed,
    Cancelled,
    Refunded,
    UnderInvestigation,
}

impl TransactionStatus {
    /// Whether the state machine allows moving from `self` to `next`
    pub fn can_transition_to(&self, next: TransactionStatus) -> bool {
        use TransactionStatus::*;
        matches!(
            (self, next),
            (Pending, Completed)
                | (Pending, Failed)
                | (Pending, Cancelled)
                | (Pending, UnderInvestigation)
                | (Completed, Refunded)
                | (Completed, UnderInvestigation)
                | (UnderInvestigation, Completed)
                | (UnderInvestigation, Failed)
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Failed => "failed",
            TransactionStatus::Cancelled => "cancelled",
            TransactionStatus::Refunded => "refunded",
            TransactionStatus::UnderInvestigation => "under_investigation",
        }
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One financial movement
///
/// A transaction describes an intent; it is not validated at creation.
/// The amount, parties and compliance attribution are checked by the
/// ledger processor, which is also the only component that moves the
/// transaction through its lifecycle.
///
/// Instances are built with [`crate::core::TransactionFactory`] and refined
/// with the consuming `with_*` methods before being processed.
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    id: TransactionId,
    created_at: DateTime<Utc>,
    tx_type: TransactionType,
    category: String,
    amount: Decimal,
    description: String,
    source: String,
    destination: String,
    from_account: Option<AccountId>,
    to_account: Option<AccountId>,
    related_entity_id: Option<String>,
    related_entity_name: Option<String>,
    reporting_required: bool,
    dark_money: bool,
    suspicious: bool,
    status: TransactionStatus,
}

impl Transaction {
    pub(crate) fn new(
        tx_type: TransactionType,
        amount: Decimal,
        description: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Transaction {
            id: TransactionId::generate(),
            created_at,
            tx_type,
            category: String::new(),
            amount,
            description,
            source: String::new(),
            destination: String::new(),
            from_account: None,
            to_account: None,
            related_entity_id: None,
            related_entity_name: None,
            reporting_required: false,
            dark_money: false,
            suspicious: false,
            status: TransactionStatus::Pending,
        }
    }

    pub(crate) fn with_parties(mut self, source: String, destination: String) -> Self {
        self.source = source;
        self.destination = destination;
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// Link the account this transaction debits
    pub fn with_from_account(mut self, account: impl Into<AccountId>) -> Self {
        self.from_account = Some(account.into());
        self
    }

    /// Link the account this transaction credits
    pub fn with_to_account(mut self, account: impl Into<AccountId>) -> Self {
        self.to_account = Some(account.into());
        self
    }

    /// Attribute the transaction to a donor, vendor or other entity for compliance
    pub fn with_related_entity(mut self, id: impl Into<String>, name: impl Into<String>) -> Self {
        self.related_entity_id = Some(id.into());
        let name = name.into();
        self.related_entity_name = if name.is_empty() { None } else { Some(name) };
        self
    }

    pub fn with_dark_money(mut self, dark_money: bool) -> Self {
        self.dark_money = dark_money;
        self
    }

    pub fn with_suspicious(mut self, suspicious: bool) -> Self {
        self.suspicious = suspicious;
        self
    }

    pub fn with_reporting_required(mut self, reporting_required: bool) -> Self {
        self.reporting_required = reporting_required;
        self
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn tx_type(&self) -> TransactionType {
        self.tx_type
    }

    pub fn flow(&self) -> Flow {
        self.tx_type.flow()
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn from_account(&self) -> Option<&AccountId> {
        self.from_account.as_ref()
    }

    pub fn to_account(&self) -> Option<&AccountId> {
        self.to_account.as_ref()
    }

    pub fn related_entity_id(&self) -> Option<&str> {
        self.related_entity_id.as_deref()
    }

    pub fn related_entity_name(&self) -> Option<&str> {
        self.related_entity_name.as_deref()
    }

    pub fn reporting_required(&self) -> bool {
        self.reporting_required
    }

    /// Dark money either by explicit flag or by kind
    pub fn is_dark_money(&self) -> bool {
        self.dark_money || self.tx_type == TransactionType::DarkMoneyContribution
    }

    pub fn suspicious(&self) -> bool {
        self.suspicious
    }

    pub fn status(&self) -> TransactionStatus {
        self.status
    }

    /// The account whose balance is reported for this transaction
    ///
    /// The debited account for outflows and transfers, the credited
    /// account for inflows.
    pub fn primary_account(&self) -> Option<&AccountId> {
        if self.flow().debits() {
            self.from_account()
        } else {
            self.to_account()
        }
    }

    /// Move to `next`, enforcing the lifecycle state machine
    ///
    /// Returns the rejected `(from, to)` pair when the transition is not allowed.
    pub(crate) fn transition(
        &mut self,
        next: TransactionStatus,
    ) -> Result<(), (TransactionStatus, TransactionStatus)> {
        if !self.status.can_transition_to(next) {
            return Err((self.status, next));
        }
        self.status = next;
        Ok(())
    }

    pub(crate) fn mark_reporting_required(&mut self) {
        self.reporting_required = true;
    }

    pub(crate) fn mark_suspicious(&mut self) {
        self.suspicious = true;
    }
}
