//! Campaign finance ledger CLI
//!
//! # Usage
//!
//! ```bash
//! cargo run -- scenario.csv > balances.csv
//! cargo run -- --strategy async --batch-size 500 scenario.csv > balances.csv
//! cargo run -- --contribution-limit 3300 --forbid-dark-money --results results.csv scenario.csv
//! ```
//!
//! Replays the scenario through the ledger and prints final account
//! balances to stdout. Diagnostics go to stderr, filtered by `RUST_LOG`
//! (default `warn`).
//!
//! # Exit Codes
//!
//! - 0: Success
//! - 1: Fatal error (missing input, unwritable output, runtime failure)

use campaign_finance_ledger::cli::{self, StrategyType};
use campaign_finance_ledger::io::write_results_csv;
use campaign_finance_ledger::strategy;
use campaign_finance_ledger::types::LedgerError;
use std::fs::File;
use std::io::BufWriter;
use std::process;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = cli::parse_args();

    if let Err(e) = run(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

fn run(args: &cli::CliArgs) -> Result<(), LedgerError> {
    let batch = matches!(args.strategy, StrategyType::Async).then(|| args.to_batch_config());
    let strategy = strategy::create_strategy(args.strategy, args.to_ledger_config(), batch);

    let mut output = std::io::stdout();
    let results = strategy.process(&args.input_file, &mut output)?;

    if let Some(path) = &args.results_file {
        let file = File::create(path).map_err(|e| LedgerError::IoError {
            message: format!("Failed to create '{}': {}", path.display(), e),
        })?;
        write_results_csv(&results, &mut BufWriter::new(file))?;
    }

    Ok(())
}
