//! Compliance checkers
//!
//! [`PermissiveCompliance`] admits everything, for callers that enforce
//! their own rules elsewhere. [`RuleBasedCompliance`] enforces a
//! [`ComplianceRules`] set, including cumulative per-entity contribution
//! limits.

use crate::config::ComplianceRules;
use crate::core::traits::ComplianceChecker;
use crate::types::{format_currency, Transaction};
use dashmap::DashMap;
use rust_decimal::Decimal;

/// Admits every transaction
#[derive(Debug, Default, Clone, Copy)]
pub struct PermissiveCompliance;

impl ComplianceChecker for PermissiveCompliance {
    fn admit(&self, _transaction: &Transaction, _related_entity_id: Option<&str>) -> Result<(), String> {
        Ok(())
    }
}

/// Enforces a fixed set of [`ComplianceRules`]
///
/// Contribution totals are kept per related entity. The limit check and the
/// reservation of the new amount happen under the entity's entry lock, so
/// two concurrent donations cannot both slip under the cap.
#[derive(Debug, Default)]
pub struct RuleBasedCompliance {
    rules: ComplianceRules,
    contributions: DashMap<String, Decimal>,
}

impl RuleBasedCompliance {
    pub fn new(rules: ComplianceRules) -> Self {
        Self {
            rules,
            contributions: DashMap::new(),
        }
    }

    /// Total admitted donations for an entity
    pub fn contributed(&self, entity_id: &str) -> Decimal {
        self.contributions
            .get(entity_id)
            .map(|total| *total)
            .unwrap_or(Decimal::ZERO)
    }

    fn check_blocked(&self, transaction: &Transaction, related_entity_id: Option<&str>) -> Result<(), String> {
        let parties = [
            related_entity_id,
            Some(transaction.source()),
            Some(transaction.destination()),
        ];

        match parties
            .into_iter()
            .flatten()
            .find(|party| !party.is_empty() && self.rules.blocked_entities.contains(*party))
        {
            Some(party) => Err(format!("Entity '{}' is blocked from transacting", party)),
            None => Ok(()),
        }
    }

    fn reserve_contribution(&self, transaction: &Transaction, entity_id: &str) -> Result<(), String> {
        let Some(limit) = self.rules.contribution_limit else {
            return Ok(());
        };

        let mut total = self
            .contributions
            .entry(entity_id.to_string())
            .or_insert(Decimal::ZERO);

        let proposed = total
            .checked_add(transaction.amount())
            .ok_or_else(|| format!("Contribution total for '{}' is out of range", entity_id))?;

        if proposed > limit {
            return Err(format!(
                "Contribution limit exceeded for '{}': ${} already given, limit ${}",
                entity_id,
                format_currency(*total),
                format_currency(limit)
            ));
        }

        *total = proposed;
        Ok(())
    }

    fn counts_toward_limit(transaction: &Transaction) -> bool {
        transaction.tx_type().is_donation() && !transaction.is_dark_money()
    }
}

impl ComplianceChecker for RuleBasedCompliance {
    fn admit(&self, transaction: &Transaction, related_entity_id: Option<&str>) -> Result<(), String> {
        self.check_blocked(transaction, related_entity_id)?;

        if !self.rules.allow_dark_money && transaction.is_dark_money() {
            return Err("Dark money contributions are not accepted".to_string());
        }

        let entity = related_entity_id.filter(|id| !id.is_empty());

        if !Self::counts_toward_limit(transaction) {
            return Ok(());
        }

        match entity {
            Some(entity_id) => self.reserve_contribution(transaction, entity_id),
            None if self.rules.require_donor_attribution => {
                Err("Donation is missing donor attribution".to_string())
            }
            None => Ok(()),
        }
    }

    fn release(&self, transaction: &Transaction) {
        if self.rules.contribution_limit.is_none() || !Self::counts_toward_limit(transaction) {
            return;
        }
        let Some(entity_id) = transaction.related_entity_id().filter(|id| !id.is_empty()) else {
            return;
        };

        if let Some(mut total) = self.contributions.get_mut(entity_id) {
            *total = (*total - transaction.amount()).max(Decimal::ZERO);
        }
    }
}
