//! Ledger configuration
//!
//! Compliance rules, rate limiting and the reporting threshold the processor
//! is built with. Values come from the CLI (see [`crate::cli::CliArgs`]) or
//! are constructed directly by library callers.

use rust_decimal::Decimal;
use std::collections::HashSet;
use tracing::warn;

/// Regulatory rules enforced by [`crate::core::RuleBasedCompliance`]
#[derive(Debug, Clone, PartialEq)]
pub struct ComplianceRules {
    /// Cumulative donation cap per related entity
    pub contribution_limit: Option<Decimal>,

    /// Entities (by related entity id or party name) barred from transacting
    pub blocked_entities: HashSet<String>,

    /// Whether contributions from undisclosed donors are accepted
    pub allow_dark_money: bool,

    /// Whether disclosed donations must name their donor entity
    pub require_donor_attribution: bool,
}

impl Default for ComplianceRules {
    fn default() -> Self {
        Self {
            contribution_limit: None,
            blocked_entities: HashSet::new(),
            allow_dark_money: true,
            require_donor_attribution: false,
        }
    }
}

impl ComplianceRules {
    /// Set the contribution limit, ignoring non-positive values
    pub fn with_contribution_limit(mut self, limit: Decimal) -> Self {
        if limit <= Decimal::ZERO {
            warn!(%limit, "Invalid contribution limit, contributions stay uncapped");
            self.contribution_limit = None;
        } else {
            self.contribution_limit = Some(limit);
        }
        self
    }

    pub fn with_blocked_entity(mut self, entity: impl Into<String>) -> Self {
        self.blocked_entities.insert(entity.into());
        self
    }
}

/// Per-account fixed window rate limit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitConfig {
    pub max_transactions: u32,
    pub window_secs: u64,
}

impl RateLimitConfig {
    pub const DEFAULT_WINDOW_SECS: u64 = 60;

    /// Create a rate limit, returning `None` for a zero transaction count
    ///
    /// A zero window falls back to [`Self::DEFAULT_WINDOW_SECS`].
    pub fn new(max_transactions: u32, window_secs: u64) -> Option<Self> {
        if max_transactions == 0 {
            warn!("Invalid rate limit (0), rate limiting disabled");
            return None;
        }

        let window_secs = if window_secs == 0 {
            warn!(
                "Invalid rate window (0s), using default ({}s)",
                Self::DEFAULT_WINDOW_SECS
            );
            Self::DEFAULT_WINDOW_SECS
        } else {
            window_secs
        };

        Some(Self {
            max_transactions,
            window_secs,
        })
    }
}

/// Everything the ledger processor needs beyond its collaborators
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LedgerConfig {
    pub compliance: ComplianceRules,
    pub rate_limit: Option<RateLimitConfig>,

    /// Amount at or above which a completed transaction must be reported
    pub reporting_threshold: Option<Decimal>,
}

impl LedgerConfig {
    pub fn with_reporting_threshold(mut self, threshold: Decimal) -> Self {
        if threshold <= Decimal::ZERO {
            warn!(%threshold, "Invalid reporting threshold, reporting flag disabled");
            self.reporting_threshold = None;
        } else {
            self.reporting_threshold = Some(threshold);
        }
        self
    }
}
