// src/matching/indexer.rs - Single-pass candidate indexing over the record set
use anyhow::Result;
use log::{debug, warn};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::{HashMap, HashSet};

use crate::matching::manager::{assemble_groups, ScanCancellation};
use crate::matching::normalize::{
    clean_phone_number, normalize_email, normalize_name, phone_digit_count,
};
use crate::matching::phonetic::cologne_phonetics;
use crate::models::core::{ContactRecord, LightContact};
use crate::models::matching::DuplicateGroup;
use crate::models::stats_models::MatchMethodStats;
use crate::utils::dedup_config::DedupConfig;

// Property name may carry a vCard group prefix ("item1.EMAIL") and any
// parameters ("TEL;TYPE=work,voice"). Only the value after the first ':' is kept.
static EMAIL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^(?:[a-z0-9-]+\.)?EMAIL[^:\r\n]*:(.*)$").expect("valid EMAIL pattern")
});
static TEL_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?im)^(?:[a-z0-9-]+\.)?TEL[^:\r\n]*:(.*)$").expect("valid TEL pattern")
});

/// Map from key to ids that keeps keys and ids in first-insertion order, so
/// grouping is reproducible for the same input order.
#[derive(Debug, Clone, Default)]
pub struct BucketIndex {
    positions: HashMap<String, usize>,
    buckets: Vec<(String, Vec<String>)>,
}

impl BucketIndex {
    pub fn insert(&mut self, key: &str, id: &str) {
        match self.positions.get(key) {
            Some(&pos) => {
                let ids = &mut self.buckets[pos].1;
                if !ids.iter().any(|existing| existing == id) {
                    ids.push(id.to_string());
                }
            }
            None => {
                self.positions.insert(key.to_string(), self.buckets.len());
                self.buckets.push((key.to_string(), vec![id.to_string()]));
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&[String]> {
        self.positions
            .get(key)
            .map(|&pos| self.buckets[pos].1.as_slice())
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.buckets
            .iter()
            .map(|(key, ids)| (key.as_str(), ids.as_slice()))
    }

    /// Buckets holding at least two ids.
    pub fn candidate_buckets(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.iter().filter(|(_, ids)| ids.len() >= 2)
    }
}

/// Builds the email, phone, exact-name and phonetic indexes in one pass.
pub struct DedupIndexer {
    config: DedupConfig,
    contacts: HashMap<String, LightContact>,
    pub(crate) email_index: BucketIndex,
    pub(crate) phone_index: BucketIndex,
    pub(crate) exact_name_index: BucketIndex,
    pub(crate) phonetic_index: BucketIndex,
}

impl Default for DedupIndexer {
    fn default() -> Self {
        Self::new()
    }
}

impl DedupIndexer {
    pub fn new() -> Self {
        Self::with_config(DedupConfig::default())
    }

    pub fn with_config(config: DedupConfig) -> Self {
        Self {
            config,
            contacts: HashMap::new(),
            email_index: BucketIndex::default(),
            phone_index: BucketIndex::default(),
            exact_name_index: BucketIndex::default(),
            phonetic_index: BucketIndex::default(),
        }
    }

    pub fn add(&mut self, record: &ContactRecord) {
        if self.contacts.contains_key(&record.id) {
            warn!("Contact {} added twice, keeping the first copy", record.id);
            return;
        }

        let contact = extract_light_contact(record, self.config.min_phone_digits);
        let id = contact.id.as_str();

        for email in &contact.emails {
            self.email_index.insert(email, id);
        }
        for phone in &contact.phones {
            self.phone_index.insert(phone, id);
        }

        let normalized = normalize_name(&contact.name);
        if !normalized.is_empty() {
            self.exact_name_index.insert(&normalized, id);
        }
        if normalized.chars().count() >= self.config.min_phonetic_name_len {
            let code = cologne_phonetics(&normalized);
            if !code.is_empty() {
                self.phonetic_index.insert(&code, id);
            }
        }

        debug!(
            "Indexed {} ({} emails, {} phones)",
            contact.id,
            contact.emails.len(),
            contact.phones.len()
        );
        self.contacts.insert(contact.id.clone(), contact);
    }

    pub fn add_all<'a>(&mut self, records: impl IntoIterator<Item = &'a ContactRecord>) {
        for record in records {
            self.add(record);
        }
    }

    pub fn contact(&self, id: &str) -> Option<&LightContact> {
        self.contacts.get(id)
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }

    pub fn config(&self) -> &DedupConfig {
        &self.config
    }

    /// Key counts per index: (email, phone, exact name, phonetic).
    pub fn index_sizes(&self) -> (usize, usize, usize, usize) {
        (
            self.email_index.len(),
            self.phone_index.len(),
            self.exact_name_index.len(),
            self.phonetic_index.len(),
        )
    }

    /// Runs all grouping stages and returns the groups in stage order.
    pub fn get_results(&self) -> Vec<DuplicateGroup> {
        // A fresh handle is never cancelled, so this cannot fail.
        match assemble_groups(self, &ScanCancellation::new(), None) {
            Ok((groups, _)) => groups,
            Err(e) => {
                warn!("Grouping failed without cancellation: {:?}", e);
                Vec::new()
            }
        }
    }

    /// Like [`get_results`](Self::get_results), checking `cancel` between
    /// stages and returning per-stage statistics.
    pub fn get_results_with_cancel(
        &self,
        cancel: &ScanCancellation,
    ) -> Result<(Vec<DuplicateGroup>, Vec<MatchMethodStats>)> {
        assemble_groups(self, cancel, None)
    }
}

/// Pulls EMAIL and TEL values out of the raw text. Unparseable text simply
/// yields no values.
pub fn extract_light_contact(record: &ContactRecord, min_phone_digits: usize) -> LightContact {
    let mut seen_emails = HashSet::new();
    let emails: Vec<String> = EMAIL_LINE
        .captures_iter(&record.raw_contact_text)
        .filter_map(|cap| cap.get(1))
        .map(|m| normalize_email(m.as_str()))
        .filter(|e| !e.is_empty())
        .filter(|e| seen_emails.insert(e.clone()))
        .collect();

    let mut seen_phones = HashSet::new();
    let phones: Vec<String> = TEL_LINE
        .captures_iter(&record.raw_contact_text)
        .filter_map(|cap| cap.get(1))
        .map(|m| clean_phone_number(m.as_str()))
        .filter(|p| phone_digit_count(p) >= min_phone_digits)
        .filter(|p| seen_phones.insert(p.clone()))
        .collect();

    let org = record
        .organization
        .as_deref()
        .map(str::trim)
        .filter(|o| !o.is_empty())
        .map(str::to_string);

    LightContact {
        id: record.id.clone(),
        name: record.display_name.clone(),
        org,
        emails,
        phones,
    }
}
