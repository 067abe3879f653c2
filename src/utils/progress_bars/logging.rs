// src/utils/progress_bars/logging.rs - Logging helpers for the grouping stages
use crate::models::stats_models::{MatchMethodStats, MatchMethodType};
use log::{debug, info, warn};
use std::time::{Duration, Instant};

#[derive(Clone)]
pub struct MatchingLogger {
    method_name: &'static str,
    method_emoji: &'static str,
    start_time: Instant,
}

impl MatchingLogger {
    pub fn new(method_type: MatchMethodType) -> Self {
        let (method_name, method_emoji) = match method_type {
            MatchMethodType::Email => ("EMAIL", "📧"),
            MatchMethodType::Phone => ("PHONE", "📞"),
            MatchMethodType::Name => ("NAME", "👤"),
            MatchMethodType::Phonetic => ("PHONETIC", "🔊"),
        };

        Self {
            method_name,
            method_emoji,
            start_time: Instant::now(),
        }
    }

    pub fn log_start(&self, bucket_count: usize, claimed_so_far: usize) {
        info!(
            "[{}] {} 🚀 Starting {} grouping: {} buckets with 2+ contacts, {} contacts already claimed",
            self.method_name,
            self.method_emoji,
            self.method_name.to_lowercase(),
            bucket_count,
            claimed_so_far
        );
    }

    pub fn log_group(&self, key: &str, size: usize) {
        debug!(
            "[{}] {} ➕ Group of {} on '{}'",
            self.method_name, self.method_emoji, size, key
        );
    }

    pub fn log_rejected(&self, key: &str, why: &str) {
        debug!(
            "[{}] {} 🚫 Skipped '{}': {}",
            self.method_name, self.method_emoji, key, why
        );
    }

    pub fn log_fully_claimed(&self, key: &str) {
        debug!(
            "[{}] {} ⏭️  '{}' has fewer than two unclaimed contacts",
            self.method_name, self.method_emoji, key
        );
    }

    pub fn log_completion(&self, stats: &MatchMethodStats) {
        let duration = self.get_elapsed();
        info!(
            "[{}] {} 🎉 COMPLETED: {} groups, {} contacts in {:.2?}",
            self.method_name, self.method_emoji, stats.groups_created, stats.contacts_matched, duration
        );
        if stats.pairs_rejected > 0 {
            info!(
                "[{}] {} 🛡️  {} candidates rejected by guards",
                self.method_name, self.method_emoji, stats.pairs_rejected
            );
        }
    }

    pub fn get_elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    pub fn get_method_name(&self) -> &'static str {
        self.method_name
    }
}

// Pipeline-level logging functions
pub fn log_scan_start(run_id: &str, contact_count: usize) {
    info!("🚀 ===== DUPLICATE SCAN STARTING =====");
    info!("📅 Scan Run ID: {}", run_id);
    info!("📇 Contacts to index: {}", contact_count);
    info!("🎯 Stages: Email 📧 → Phone 📞 → Name 👤 → Phonetic 🔊");
}

pub fn log_index_built(contacts: usize, emails: usize, phones: usize, names: usize, codes: usize) {
    info!(
        "🗂️  Indexed {} contacts: {} email keys, {} phone keys, {} name keys, {} phonetic codes",
        contacts, emails, phones, names, codes
    );
}

pub fn log_scan_completion(run_id: &str, stats: &[MatchMethodStats], duration: Duration) {
    let total_groups: usize = stats.iter().map(|s| s.groups_created).sum();
    let total_contacts: usize = stats.iter().map(|s| s.contacts_matched).sum();
    info!("🏁 ===== DUPLICATE SCAN COMPLETE =====");
    info!("📅 Scan Run ID: {}", run_id);
    for s in stats {
        info!(
            "   • {:<9} {} groups, {} contacts, avg size {:.1}",
            s.method_type.as_str(),
            s.groups_created,
            s.contacts_matched,
            s.avg_group_size()
        );
    }
    info!(
        "📊 {} groups covering {} contacts in {:.2?}",
        total_groups, total_contacts, duration
    );
}

pub fn log_scan_failed(run_id: &str, reason: &str) {
    warn!("❌ Duplicate scan {} failed: {}", run_id, reason);
}
