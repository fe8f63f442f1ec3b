//! Benchmark suite for comparing replay strategies
//!
//! Compares the synchronous and the async batch strategy with the divan
//! benchmarking framework.
//!
//! # Running Benchmarks
//!
//! ```bash
//! cargo bench
//! ```
//!
//! # Scenarios
//!
//! Scenarios are generated into a temporary file before timing starts. Each
//! one spreads donations, expenses and transfers over many campaign
//! accounts so the async strategy has independent groups to run in
//! parallel. Balances are written to a sink.

use campaign_finance_ledger::cli::StrategyType;
use campaign_finance_ledger::config::{ComplianceRules, LedgerConfig};
use campaign_finance_ledger::strategy::{create_strategy, BatchConfig};
use divan::Bencher;
use rust_decimal::Decimal;
use std::io::{self, Write};
use tempfile::NamedTempFile;

const SIZES: [usize; 3] = [100, 1_000, 100_000];
const CAMPAIGNS: usize = 64;

fn main() {
    divan::main();
}

fn scenario_file(rows: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("Failed to create temp file");
    writeln!(file, "type,amount,from_account,to_account,entity_id").unwrap();

    for i in 0..rows {
        let campaign = format!("campaign-{}", i % CAMPAIGNS);
        match i % 4 {
            0 | 1 => writeln!(
                file,
                "individual_donation,{}.50,,{},donor-{}-{}",
                100 + i % 50,
                campaign,
                i % CAMPAIGNS,
                i % 7
            ),
            2 => writeln!(file, "advertising,{}.25,{},,", 20 + i % 30, campaign),
            _ => writeln!(
                file,
                "party_transfer,10,{},party-{}",
                campaign,
                i % CAMPAIGNS / 8
            ),
        }
        .unwrap();
    }

    file.flush().expect("Failed to flush temp file");
    file
}

fn replay(bencher: Bencher, strategy_type: StrategyType, config: LedgerConfig, rows: usize) {
    let scenario = scenario_file(rows);
    let batch = matches!(strategy_type, StrategyType::Async).then(BatchConfig::default);
    let strategy = create_strategy(strategy_type, config, batch);

    bencher.bench_local(|| {
        strategy
            .process(scenario.path(), &mut io::sink())
            .expect("Processing failed")
    });
}

fn limited() -> LedgerConfig {
    LedgerConfig {
        compliance: ComplianceRules::default().with_contribution_limit(Decimal::from(3300)),
        ..LedgerConfig::default()
    }
}

#[divan::bench(args = SIZES)]
fn sync_strategy(bencher: Bencher, rows: usize) {
    replay(bencher, StrategyType::Sync, LedgerConfig::default(), rows);
}

#[divan::bench(args = SIZES)]
fn async_strategy(bencher: Bencher, rows: usize) {
    replay(bencher, StrategyType::Async, LedgerConfig::default(), rows);
}

/// Same scenarios with every donation checked against a contribution limit
#[divan::bench(args = SIZES)]
fn sync_strategy_with_limit(bencher: Bencher, rows: usize) {
    replay(bencher, StrategyType::Sync, limited(), rows);
}

#[divan::bench(args = SIZES)]
fn async_strategy_with_limit(bencher: Bencher, rows: usize) {
    replay(bencher, StrategyType::Async, limited(), rows);
}
