use crate::config::{ComplianceRules, LedgerConfig, RateLimitConfig};
use crate::strategy::BatchConfig;
use clap::{Parser, ValueEnum};
use rust_decimal::Decimal;
use std::path::PathBuf;

/// Replay a campaign finance scenario through the ledger
#[derive(Parser, Debug)]
#[command(name = "campaign-ledger")]
#[command(about = "Replay campaign finance transactions and print account balances", long_about = None)]
pub struct CliArgs {
    /// Scenario CSV file
    #[arg(value_name = "INPUT", help = "Path to the input CSV file")]
    pub input_file: PathBuf,

    /// Also write one result row per transaction to this file
    #[arg(long = "results", value_name = "PATH")]
    pub results_file: Option<PathBuf>,

    #[arg(
        long = "strategy",
        value_name = "STRATEGY",
        default_value = "sync",
        help = "Replay strategy: 'sync' for sequential or 'async' for concurrent batches"
    )]
    pub strategy: StrategyType,

    /// Number of transactions per batch (async mode only)
    #[arg(long = "batch-size", value_name = "SIZE")]
    pub batch_size: Option<usize>,

    /// Worker threads for batch processing (async mode only)
    #[arg(long = "max-concurrent", value_name = "COUNT")]
    pub max_concurrent_batches: Option<usize>,

    /// Cumulative donation cap per donor entity
    #[arg(long = "contribution-limit", value_name = "AMOUNT")]
    pub contribution_limit: Option<Decimal>,

    /// Entity barred from transacting (repeatable)
    #[arg(long = "block-entity", value_name = "ENTITY")]
    pub blocked_entities: Vec<String>,

    /// Reject dark money contributions
    #[arg(long = "forbid-dark-money")]
    pub forbid_dark_money: bool,

    /// Reject donations that do not name their donor
    #[arg(long = "require-attribution")]
    pub require_attribution: bool,

    /// Mark completed transactions at or above this amount for reporting
    #[arg(long = "reporting-threshold", value_name = "AMOUNT")]
    pub reporting_threshold: Option<Decimal>,

    /// Maximum transactions per account per window
    #[arg(long = "rate-limit", value_name = "COUNT")]
    pub rate_limit: Option<u32>,

    /// Rate limit window length in seconds
    #[arg(
        long = "rate-window-secs",
        value_name = "SECONDS",
        default_value_t = RateLimitConfig::DEFAULT_WINDOW_SECS
    )]
    pub rate_window_secs: u64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum StrategyType {
    Sync,
    Async,
}

impl CliArgs {
    /// Batch settings from the CLI, falling back to defaults
    pub fn to_batch_config(&self) -> BatchConfig {
        if self.batch_size.is_some() || self.max_concurrent_batches.is_some() {
            let default = BatchConfig::default();
            BatchConfig::new(
                self.batch_size.unwrap_or(default.batch_size),
                self.max_concurrent_batches
                    .unwrap_or(default.max_concurrent_batches),
            )
        } else {
            BatchConfig::default()
        }
    }

    /// Ledger rules from the CLI; invalid values are dropped with a warning
    pub fn to_ledger_config(&self) -> LedgerConfig {
        let mut compliance = ComplianceRules {
            allow_dark_money: !self.forbid_dark_money,
            require_donor_attribution: self.require_attribution,
            ..ComplianceRules::default()
        };
        if let Some(limit) = self.contribution_limit {
            compliance = compliance.with_contribution_limit(limit);
        }
        for entity in &self.blocked_entities {
            compliance = compliance.with_blocked_entity(entity.clone());
        }

        let mut config = LedgerConfig {
            compliance,
            rate_limit: self
                .rate_limit
                .and_then(|max| RateLimitConfig::new(max, self.rate_window_secs)),
            reporting_threshold: None,
        };
        if let Some(threshold) = self.reporting_threshold {
            config = config.with_reporting_threshold(threshold);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::default_strategy(&["program", "input.csv"], StrategyType::Sync)]
    #[case::explicit_sync(&["program", "--strategy", "sync", "input.csv"], StrategyType::Sync)]
    #[case::explicit_async(&["program", "--strategy", "async", "input.csv"], StrategyType::Async)]
    fn test_strategy_parsing(#[case] args: &[&str], #[case] expected: StrategyType) {
        let parsed = CliArgs::try_parse_from(args).unwrap();
        assert_eq!(parsed.strategy, expected);
    }

    #[rstest]
    #[case::all_defaults(&["program", "input.csv"], 1000, num_cpus::get())]
    #[case::custom_batch_size(&["program", "--batch-size", "2000", "input.csv"], 2000, num_cpus::get())]
    #[case::custom_max_concurrent(&["program", "--max-concurrent", "8", "input.csv"], 1000, 8)]
    #[case::zero_batch_size(&["program", "--batch-size", "0", "input.csv"], 1000, num_cpus::get())]
    fn test_batch_config_conversion(
        #[case] args: &[&str],
        #[case] expected_batch_size: usize,
        #[case] expected_max_concurrent: usize,
    ) {
        let config = CliArgs::try_parse_from(args).unwrap().to_batch_config();

        assert_eq!(config.batch_size, expected_batch_size);
        assert_eq!(config.max_concurrent_batches, expected_max_concurrent);
    }

    #[test]
    fn test_default_ledger_config_is_permissive() {
        let config = CliArgs::try_parse_from(["program", "input.csv"])
            .unwrap()
            .to_ledger_config();

        assert_eq!(config, LedgerConfig::default());
    }

    #[test]
    fn test_full_ledger_config() {
        let args = CliArgs::try_parse_from([
            "program",
            "--contribution-limit",
            "3300",
            "--block-entity",
            "acme-corp",
            "--block-entity",
            "shell-llc",
            "--forbid-dark-money",
            "--require-attribution",
            "--reporting-threshold",
            "200.00",
            "--rate-limit",
            "5",
            "--rate-window-secs",
            "30",
            "--results",
            "results.csv",
            "input.csv",
        ])
        .unwrap();

        let config = args.to_ledger_config();

        assert_eq!(config.compliance.contribution_limit, Some(Decimal::from(3300)));
        assert!(config.compliance.blocked_entities.contains("acme-corp"));
        assert!(config.compliance.blocked_entities.contains("shell-llc"));
        assert!(!config.compliance.allow_dark_money);
        assert!(config.compliance.require_donor_attribution);
        assert_eq!(config.reporting_threshold, Some(Decimal::new(20000, 2)));
        assert_eq!(config.rate_limit, RateLimitConfig::new(5, 30));
        assert_eq!(args.results_file, Some(PathBuf::from("results.csv")));
    }

    #[rstest]
    #[case::zero_rate_limit(&["program", "--rate-limit", "0", "input.csv"])]
    #[case::negative_limit(&["program", "--contribution-limit=-10", "input.csv"])]
    fn test_invalid_values_are_dropped(#[case] args: &[&str]) {
        let config = CliArgs::try_parse_from(args).unwrap().to_ledger_config();

        assert_eq!(config.rate_limit, None);
        assert_eq!(config.compliance.contribution_limit, None);
    }

    #[rstest]
    #[case::missing_input(&["program"])]
    #[case::invalid_strategy(&["program", "--strategy", "invalid", "input.csv"])]
    #[case::invalid_amount(&["program", "--contribution-limit", "lots", "input.csv"])]
    fn test_parsing_errors(#[case] args: &[&str]) {
        assert!(CliArgs::try_parse_from(args).is_err());
    }
}
