//! Command handlers: wire configuration, ledger storage, the fetcher, and
//! the detection service together, and map failures to exit codes.

use crate::cli::commands::{DetectArgs, StatusArgs};
use crate::cli::output::OutputFormatter;
use crate::config::WatchConfig;
use crate::detection::service::DetectionService;
use crate::fetch::UupDumpFetcher;
use crate::ledger::LedgerStore;
use anyhow::{Context, Result};
use chrono::Utc;
use std::fs;
use std::time::Duration;
use tracing::info;

pub async fn handle_detect(args: &DetectArgs, quiet: bool) -> i32 {
    match run_detect(args, quiet).await {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    }
}

async fn run_detect(args: &DetectArgs, quiet: bool) -> Result<()> {
    let mut config = WatchConfig::default();
    if let Some(path) = &args.tracking_file {
        config.tracking_file = path.clone();
    }
    if let Some(secs) = args.timeout {
        config.request_timeout_secs = secs;
    }
    config.validate()?;

    if args.force {
        info!("force mode: the detection core has no check gate, running unconditionally");
    }

    let fetcher = UupDumpFetcher::new(
        config.index_endpoint.clone(),
        Duration::from_secs(config.request_timeout_secs),
    )?;
    let service = DetectionService::new(&config, fetcher)?;

    let store = LedgerStore::new(&config.tracking_file);
    let mut state = store.load()?;

    // A fetch failure propagates from here with `state` untouched, so the
    // persist below never runs and the ledger file stays as it was.
    let report = service.run(&mut state, Utc::now()).await?;
    store.persist(&state)?;

    let formatter = OutputFormatter::new(args.format.into());
    let rendered = formatter.format_report(&report, args.skip_build)?;

    match &args.output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write output to {}", path.display()))?;
            if !quiet {
                println!("{}", report.summary());
            }
        }
        None => print!("{}", ensure_trailing_newline(rendered)),
    }

    Ok(())
}

pub fn handle_status(args: &StatusArgs) -> i32 {
    match run_status(args) {
        Ok(()) => 0,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            1
        }
    }
}

fn run_status(args: &StatusArgs) -> Result<()> {
    let mut config = WatchConfig::default();
    if let Some(path) = &args.tracking_file {
        config.tracking_file = path.clone();
    }

    let state = LedgerStore::new(&config.tracking_file).load()?;
    let rendered = OutputFormatter::new(args.format.into()).format_status(&state)?;
    print!("{}", ensure_trailing_newline(rendered));
    Ok(())
}

fn ensure_trailing_newline(mut text: String) -> String {
    if !text.ends_with('\n') {
        text.push('\n');
    }
    text
}
