// src/main.rs - `dedupe` command line: duplicate scan and merge over a JSON record file
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use dedupe_lib::matching::manager::{run_duplicate_scan, ScanCancellation};
use dedupe_lib::merge::contact::{merge_group, MergeOutcome};
use dedupe_lib::models::core::ContactRecord;
use dedupe_lib::models::matching::ScanReport;
use dedupe_lib::models::stats_models::MatchMethodType;
use dedupe_lib::utils::dedup_config::DedupConfig;
use dedupe_lib::utils::env::load_env;
use dedupe_lib::utils::get_memory_usage;
use dedupe_lib::utils::progress_bars::progress_callback::{
    create_bar_callback, create_logging_callback, ProgressCallback,
};
use dedupe_lib::utils::progress_bars::progress_config::ProgressConfig;
use log::{info, warn};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

#[derive(Parser)]
#[command(author, version, about = "Find and merge duplicate contacts", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Group duplicate contacts and print the scan report
    Scan {
        /// JSON array of contact records
        #[arg(short, long)]
        input: PathBuf,

        /// Where to write the JSON report (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Merge records into a master record
    Merge {
        /// JSON array of contact records
        #[arg(short, long)]
        input: PathBuf,

        /// Id of the record that survives
        #[arg(short, long)]
        master: String,

        /// Ids to merge in; every other record in the file when omitted
        #[arg(short, long)]
        duplicate: Vec<String>,

        /// Where to write the merge outcome (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    load_env();

    let cli = Cli::parse();
    match cli.command {
        Command::Scan { input, output } => run_scan(&input, output.as_deref()).await,
        Command::Merge {
            input,
            master,
            duplicate,
            output,
        } => run_merge(&input, &master, &duplicate, output.as_deref()),
    }
}

async fn run_scan(input: &Path, output: Option<&Path>) -> Result<()> {
    info!("Starting duplicate contact scan");
    let config = DedupConfig::from_env();
    config.log_config();

    let progress_config = ProgressConfig::from_env();
    info!(
        "Progress tracking: enabled={}, detailed={}",
        progress_config.enabled, progress_config.detailed
    );

    let records = read_records(input)?;
    let start = Instant::now();

    // One tick for indexing plus one per grouping stage.
    let phases = MatchMethodType::pipeline_order().len() as u64 + 1;
    let multi_progress = progress_config.create_multi_progress();
    let main_pb = multi_progress
        .as_ref()
        .map(|mp| progress_config.create_phase_bar(mp, phases));
    let callback: ProgressCallback = match (&multi_progress, &main_pb) {
        (Some(mp), Some(pb)) => {
            create_bar_callback(pb.clone(), progress_config.create_status_spinner(mp))
        }
        _ => create_logging_callback("scan"),
    };

    let result = run_duplicate_scan(records, config, ScanCancellation::new(), Some(callback)).await;
    if let Some(pb) = &main_pb {
        match &result {
            Ok(report) => pb.finish_with_message(format!("{} duplicate groups", report.groups.len())),
            Err(_) => pb.abandon_with_message("Scan failed"),
        }
    }
    let report = result.context("Duplicate scan failed")?;

    print_summary(&report);
    if progress_config.should_show_memory() {
        info!("Memory in use: {} MB", get_memory_usage().await);
    }
    info!("Scan finished in {:.2?}", start.elapsed());

    write_json(&report, output)
}

fn run_merge(input: &Path, master_id: &str, duplicate_ids: &[String], output: Option<&Path>) -> Result<()> {
    let records = read_records(input)?;

    let selected: Vec<ContactRecord> = if duplicate_ids.is_empty() {
        records
    } else {
        for id in duplicate_ids {
            if !records.iter().any(|r| &r.id == id) {
                bail!("Duplicate contact {} not found in {}", id, input.display());
            }
        }
        records
            .into_iter()
            .filter(|r| r.id == master_id || duplicate_ids.contains(&r.id))
            .collect()
    };

    let outcome: MergeOutcome = merge_group(&selected, master_id, None)
        .with_context(|| format!("Failed to merge into {}", master_id))?;
    info!(
        "Merged {} record(s) into {}; the store should delete: {}",
        outcome.superseded_ids.len(),
        outcome.merged.id,
        outcome.superseded_ids.join(", ")
    );

    write_json(&outcome, output)
}

fn read_records(path: &Path) -> Result<Vec<ContactRecord>> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read contact records from {}", path.display()))?;
    let records: Vec<ContactRecord> = serde_json::from_str(&raw)
        .with_context(|| format!("Failed to parse contact records in {}", path.display()))?;
    if records.is_empty() {
        warn!("{} contains no contact records", path.display());
    }
    info!("Loaded {} contact records from {}", records.len(), path.display());
    Ok(records)
}

fn write_json<T: Serialize>(value: &T, output: Option<&Path>) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    match output {
        Some(path) => {
            fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Wrote {}", path.display());
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn print_summary(report: &ScanReport) {
    info!("=== Duplicate scan summary ({}) ===", report.run_id);
    info!("Contacts indexed: {}", report.contacts_indexed);
    info!(
        "Groups: {} covering {} contacts",
        report.groups.len(),
        report.total_contacts_grouped()
    );
    for stats in &report.stats {
        info!(
            "  {:<9} {} groups, {} contacts, {} rejected",
            stats.method_type.as_str(),
            stats.groups_created,
            stats.contacts_matched,
            stats.pairs_rejected
        );
    }
}
