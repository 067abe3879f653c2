// src/matching/manager.rs - Stage ordering, claim tracking and the scan worker
use crate::matching::email;
use crate::matching::indexer::DedupIndexer;
use crate::matching::name;
use crate::matching::phone;
use crate::models::core::ContactRecord;
use crate::models::matching::{DuplicateGroup, MatchResult, ScanReport};
use crate::models::stats_models::{MatchMethodStats, MatchMethodType};
use crate::{update_detailed_progress, update_progress};
use crate::utils::dedup_config::DedupConfig;
use crate::utils::progress_bars::logging::{
    log_index_built, log_scan_completion, log_scan_failed, log_scan_start,
};
use crate::utils::progress_bars::progress_callback::ProgressCallback;
use anyhow::{anyhow, bail, Context, Result};
use chrono::Utc;
use log::{error, info};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Instant;
use uuid::Uuid;

const INDEX_PROGRESS_INTERVAL: usize = 1000;

/// Cloneable cancellation handle, checked between grouping stages.
#[derive(Debug, Clone, Default)]
pub struct ScanCancellation {
    cancelled: Arc<AtomicBool>,
}

impl ScanCancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Ids already placed in a group during this run. First claim wins.
#[derive(Debug, Default)]
pub struct ClaimSet {
    claimed: HashSet<String>,
}

impl ClaimSet {
    pub fn is_claimed(&self, id: &str) -> bool {
        self.claimed.contains(id)
    }

    pub fn claim_all(&mut self, ids: &[String]) {
        self.claimed.extend(ids.iter().cloned());
    }

    /// Bucket members not yet claimed, in bucket order.
    pub fn unclaimed(&self, ids: &[String]) -> Vec<String> {
        ids.iter()
            .filter(|id| !self.is_claimed(id))
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.claimed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.claimed.is_empty()
    }
}

/// Runs email, phone, exact-name and phonetic grouping in that order over a
/// built index. The order decides which group claims a contact first and
/// must not be changed.
pub fn assemble_groups(
    indexer: &DedupIndexer,
    cancel: &ScanCancellation,
    progress_callback: Option<ProgressCallback>,
) -> Result<(Vec<DuplicateGroup>, Vec<MatchMethodStats>)> {
    let mut claims = ClaimSet::default();
    let mut groups = Vec::new();
    let mut stats = Vec::new();

    for method in MatchMethodType::pipeline_order() {
        if cancel.is_cancelled() {
            bail!("Duplicate scan cancelled before the {} stage", method.as_str());
        }
        update_progress!(progress_callback, format!("Grouping by {}", method.as_str()));

        let result: MatchResult = match method {
            MatchMethodType::Email => email::find_matches(indexer, &mut claims),
            MatchMethodType::Phone => phone::find_matches(indexer, &mut claims),
            MatchMethodType::Name => name::find_exact_matches(indexer, &mut claims),
            MatchMethodType::Phonetic => name::find_phonetic_matches(indexer, &mut claims),
        };

        update_progress!(
            progress_callback,
            format!("Grouping by {}", method.as_str()),
            format!("{} groups", result.stats.groups_created)
        );
        groups.extend(result.groups);
        stats.push(result.stats);
    }

    Ok((groups, stats))
}

/// Indexes `records` and assembles groups synchronously.
pub fn scan_records(
    records: &[ContactRecord],
    config: DedupConfig,
    cancel: &ScanCancellation,
    progress_callback: Option<ProgressCallback>,
) -> Result<ScanReport> {
    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    let start = Instant::now();
    log_scan_start(&run_id, records.len());

    update_progress!(progress_callback, "Indexing contacts");
    let mut indexer = DedupIndexer::with_config(config);
    for (i, record) in records.iter().enumerate() {
        indexer.add(record);
        if (i + 1) % INDEX_PROGRESS_INTERVAL == 0 {
            update_detailed_progress!(progress_callback, "Indexing contacts", i + 1, records.len());
        }
    }
    let (emails, phones, names, codes) = indexer.index_sizes();
    log_index_built(indexer.len(), emails, phones, names, codes);

    let (groups, stats) = match assemble_groups(&indexer, cancel, progress_callback.clone()) {
        Ok(result) => result,
        Err(e) => {
            log_scan_failed(&run_id, &e.to_string());
            return Err(e);
        }
    };

    let duration = start.elapsed();
    log_scan_completion(&run_id, &stats, duration);
    update_progress!(progress_callback, "Completed", format!("{} groups", groups.len()));

    Ok(ScanReport {
        run_id,
        started_at,
        contacts_indexed: indexer.len(),
        groups,
        stats,
        duration_ms: duration.as_millis() as u64,
    })
}

/// Runs a full scan on tokio's blocking pool so the caller's thread stays
/// responsive. Exceeding `config.scan_timeout` raises `cancel` and returns an
/// error; a failed or panicked worker also surfaces as a single error. No
/// partial results are ever returned.
pub async fn run_duplicate_scan(
    records: Vec<ContactRecord>,
    config: DedupConfig,
    cancel: ScanCancellation,
    progress_callback: Option<ProgressCallback>,
) -> Result<ScanReport> {
    let timeout_duration = config.scan_timeout;
    let worker_cancel = cancel.clone();

    info!(
        "Dispatching duplicate scan of {} contacts to worker (timeout {}s)",
        records.len(),
        timeout_duration.as_secs()
    );

    let handle = tokio::task::spawn_blocking(move || {
        scan_records(&records, config, &worker_cancel, progress_callback)
    });

    match tokio::time::timeout(timeout_duration, handle).await {
        Ok(joined) => joined.context("Duplicate scan worker failed")?,
        Err(_elapsed) => {
            cancel.cancel();
            error!(
                "⏰ Duplicate scan timed out after {} seconds",
                timeout_duration.as_secs()
            );
            Err(anyhow!(
                "Duplicate scan timed out after {} seconds",
                timeout_duration.as_secs()
            ))
        }
    }
}
