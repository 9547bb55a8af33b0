//! # DROP Supply
//!
//! Command-line entry point.
//!
//! ## Run Sequence
//!
//! 1. Parse flags, initialize logging
//! 2. Resolve configuration (defaults, environment, flags) and validate it
//! 3. Connect to the ledger node
//! 4. Aggregate trustlines and publish the snapshot
//! 5. Print the outcome line; exit non-zero on any error

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{error, info};

use drop_supply::{
    init_logging, Cli, FileSnapshotStore, LedgerClient, RunReport, SupplyApi, SupplyConfig,
    SupplyJob, SystemTimeSource, WriteOutcome,
};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let env = |key: &str| std::env::var(key).ok();

    init_logging(&cli.log_config(env)).context("Failed to initialize logging")?;
    let config = cli.resolve(env).context("Invalid configuration")?;

    info!(
        issuer = %config.issuer,
        currency = %config.token.currency,
        endpoint = %config.endpoint,
        excluded = config.excluded_accounts.len(),
        output = %config.output_path.display(),
        dry_run = config.dry_run,
        "Starting supply run"
    );

    let report = match run(&config).await {
        Ok(report) => report,
        Err(e) => {
            error!(error = %format!("{e:#}"), "Supply run failed");
            return Err(e);
        }
    };

    print_report(&config, &report)
}

async fn run(config: &SupplyConfig) -> Result<RunReport> {
    let client = LedgerClient::connect(&config.endpoint, config.request_timeout)
        .await
        .with_context(|| format!("Failed to connect to {}", config.endpoint))?;
    let client = Arc::new(client);

    let store = Arc::new(FileSnapshotStore::new(&config.output_path));
    let job = SupplyJob::new(client.clone(), store, Arc::new(SystemTimeSource), config);

    let result = job.run().await;
    client.close().await;
    result.context("Supply run aborted")
}

fn print_report(config: &SupplyConfig, report: &RunReport) -> Result<()> {
    let location = config.output_path.display();
    match report.outcome {
        WriteOutcome::Updated => println!("Updated {location}"),
        WriteOutcome::Unchanged => println!("No change in {location}"),
        WriteOutcome::DryRun { changed } => {
            let json = serde_json::to_string_pretty(&report.snapshot)
                .context("Failed to render snapshot")?;
            println!("{json}");
            if changed {
                println!("Dry run: {location} would be updated");
            } else {
                println!("Dry run: no change in {location}");
            }
        }
    }
    Ok(())
}
