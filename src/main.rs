//! saviosync command-line entry point.

use std::process;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use savio_sync::config::Settings;
use savio_sync::models::SyncRequest;
use savio_sync::remote::ApexClient;
use savio_sync::repository::{self, create_pool};
use savio_sync::sources::{DESCRIPTORS, MODIFIED_COLUMN};
use savio_sync::sync::runner::any_failed;
use savio_sync::sync::{Runner, RetryPolicy, SyncContext};

/// Incremental replication of the Savio ERP catalog into SQLite.
#[derive(Parser, Debug)]
#[command(name = "saviosync", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Sync every source in dependency order.
    Run {
        /// Ignore stored state and fetch entire collections.
        #[arg(long)]
        full: bool,
    },
    /// Sync a single source by name.
    Sync {
        /// Source name (see `sources`).
        source: String,
        /// Explicit lower bound, YYYY-MM-DD.
        #[arg(long)]
        desde: Option<NaiveDate>,
        /// Explicit upper bound, YYYY-MM-DD; defaults to today.
        #[arg(long)]
        hasta: Option<NaiveDate>,
        /// Ignore stored state and fetch the entire collection.
        #[arg(long)]
        full: bool,
        /// First-run lookback window in days.
        #[arg(long)]
        lookback_days: Option<u32>,
    },
    /// List the configured sources.
    Sources,
    /// Show stored row counts and high-water marks.
    Status,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let settings = Settings::from_env();

    match cli.command {
        Command::Run { full } => {
            let runner = build_runner(&settings)?;
            let request = SyncRequest {
                force_full: full,
                lookback_days: Some(settings.lookback_days),
                ..Default::default()
            };
            let results = runner.run_all(&request).await;
            if any_failed(&results) {
                process::exit(1);
            }
        }
        Command::Sync {
            source,
            desde,
            hasta,
            full,
            lookback_days,
        } => {
            let runner = build_runner(&settings)?;
            let request = SyncRequest {
                desde,
                hasta,
                force_full: full,
                lookback_days: lookback_days.or(Some(settings.lookback_days)),
            };
            match runner.run_one(&source, &request).await {
                Some(result) if result.success() => {}
                Some(result) => {
                    eprintln!(
                        "sync of {} failed: {}",
                        result.source,
                        result.error.as_deref().unwrap_or("unknown error")
                    );
                    process::exit(1);
                }
                None => {
                    eprintln!("unknown source: {source} (see `saviosync sources`)");
                    process::exit(1);
                }
            }
        }
        Command::Sources => {
            for desc in DESCRIPTORS {
                let filter = if desc.supports_time_filter() {
                    "incremental"
                } else {
                    "full"
                };
                println!("{:<24} {:<12} {}", desc.name, filter, desc.endpoint);
            }
        }
        Command::Status => {
            let pool = create_pool(&settings.database_path)
                .context("failed to open target database")?;
            println!("{:<24} {:>10}  {}", "source", "rows", "last modified");
            for desc in DESCRIPTORS {
                // A failed count (missing table) is not an empty table.
                let rows = repository::count_rows(&pool, desc.table)
                    .await
                    .map(|n| n.to_string())
                    .unwrap_or_else(|_| "-".to_string());
                let mark = repository::max_modified(&pool, desc.table, MODIFIED_COLUMN)
                    .await
                    .ok()
                    .flatten()
                    .map(|ts| ts.to_string())
                    .unwrap_or_else(|| "-".to_string());
                println!("{:<24} {:>10}  {}", desc.name, rows, mark);
            }
        }
    }

    Ok(())
}

fn build_runner(settings: &Settings) -> Result<Runner> {
    let pool = create_pool(&settings.database_path)
        .context("failed to open target database")?;
    let client = Arc::new(ApexClient::new(&settings.base_url, settings.request_timeout));

    Ok(Runner::new(SyncContext {
        client,
        pool,
        batch_size: settings.batch_size,
        rate_limit: settings.rate_limit,
        retry: RetryPolicy {
            max_attempts: settings.max_retries,
            base_delay: settings.retry_base,
        },
    }))
}
