// src/models/matching.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::stats_models::{MatchMethodStats, MatchMethodType};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Confidence {
    /// Exact match on a unique identifier (email, phone).
    High,
    /// Heuristic match (generic address, name, phonetic).
    Medium,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Medium => "medium",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DuplicateGroup {
    pub id: String,
    pub contact_ids: Vec<String>,
    pub confidence: Confidence,
    pub reason: String,
    pub method: MatchMethodType,
}

impl DuplicateGroup {
    pub fn new(
        contact_ids: Vec<String>,
        confidence: Confidence,
        reason: String,
        method: MatchMethodType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            contact_ids,
            confidence,
            reason,
            method,
        }
    }

    pub fn contains(&self, contact_id: &str) -> bool {
        self.contact_ids.iter().any(|id| id == contact_id)
    }
}

/// Output of a single grouping stage.
#[derive(Debug, Clone)]
pub struct MatchResult {
    pub groups: Vec<DuplicateGroup>,
    pub stats: MatchMethodStats,
}

/// Result of one full duplicate scan.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanReport {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub contacts_indexed: usize,
    pub groups: Vec<DuplicateGroup>,
    pub stats: Vec<MatchMethodStats>,
    pub duration_ms: u64,
}

impl ScanReport {
    pub fn total_contacts_grouped(&self) -> usize {
        self.groups.iter().map(|g| g.contact_ids.len()).sum()
    }
}
