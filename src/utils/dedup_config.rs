//! Tunables for duplicate detection, read from the environment.

use log::{debug, info};
use std::env;
use std::time::Duration;

pub const DEFAULT_PHONETIC_SIMILARITY_THRESHOLD: f64 = 0.8;
pub const DEFAULT_MIN_PHONE_DIGITS: usize = 6;
pub const DEFAULT_MIN_PHONETIC_NAME_LEN: usize = 3;
pub const DEFAULT_SCAN_TIMEOUT_SECONDS: u64 = 300;

/// Local parts shared by whole teams; a match on one of these says nothing
/// about the person.
pub const GENERIC_EMAIL_PREFIXES: [&str; 13] = [
    "info", "contact", "kontakt", "office", "admin", "sales", "support", "hello", "mail", "team",
    "service", "buchhaltung", "invoice",
];

#[derive(Debug, Clone, PartialEq)]
pub struct DedupConfig {
    /// Phonetic pairs must score strictly above this similarity.
    pub phonetic_similarity_threshold: f64,
    /// Phone numbers with fewer digits after cleaning are ignored.
    pub min_phone_digits: usize,
    /// Normalized names shorter than this are kept out of the phonetic index.
    pub min_phonetic_name_len: usize,
    pub generic_email_prefixes: Vec<String>,
    pub scan_timeout: Duration,
}

impl Default for DedupConfig {
    fn default() -> Self {
        Self {
            phonetic_similarity_threshold: DEFAULT_PHONETIC_SIMILARITY_THRESHOLD,
            min_phone_digits: DEFAULT_MIN_PHONE_DIGITS,
            min_phonetic_name_len: DEFAULT_MIN_PHONETIC_NAME_LEN,
            generic_email_prefixes: GENERIC_EMAIL_PREFIXES
                .iter()
                .map(|s| s.to_string())
                .collect(),
            scan_timeout: Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECONDS),
        }
    }
}

impl DedupConfig {
    /// Create configuration from environment variables. Unset or unparsable
    /// values fall back to the defaults.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let phonetic_similarity_threshold = env::var("DEDUP_PHONETIC_SIMILARITY_THRESHOLD")
            .ok()
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|v| (0.0..=1.0).contains(v))
            .unwrap_or(defaults.phonetic_similarity_threshold);

        let min_phone_digits = env::var("DEDUP_MIN_PHONE_DIGITS")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.min_phone_digits);

        let min_phonetic_name_len = env::var("DEDUP_MIN_PHONETIC_NAME_LEN")
            .ok()
            .and_then(|s| s.trim().parse::<usize>().ok())
            .unwrap_or(defaults.min_phonetic_name_len);

        let generic_email_prefixes = env::var("DEDUP_GENERIC_EMAIL_PREFIXES")
            .ok()
            .map(|s| {
                s.split(',')
                    .map(|p| p.trim().to_lowercase())
                    .filter(|p| !p.is_empty())
                    .collect::<Vec<_>>()
            })
            .filter(|list| !list.is_empty())
            .unwrap_or(defaults.generic_email_prefixes);

        let scan_timeout = env::var("DEDUP_SCAN_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
            .unwrap_or(defaults.scan_timeout);

        let config = Self {
            phonetic_similarity_threshold,
            min_phone_digits,
            min_phonetic_name_len,
            generic_email_prefixes,
            scan_timeout,
        };
        debug!("Dedup config loaded: {:?}", config);
        config
    }

    pub fn is_generic_local_part(&self, local_part: &str) -> bool {
        self.generic_email_prefixes.iter().any(|p| p == local_part)
    }

    /// Log the current configuration
    pub fn log_config(&self) {
        info!("🔧 Duplicate detection configuration:");
        info!(
            "   • Phonetic similarity threshold: > {:.2}",
            self.phonetic_similarity_threshold
        );
        info!("   • Minimum phone digits: {}", self.min_phone_digits);
        info!(
            "   • Minimum name length for phonetic index: {}",
            self.min_phonetic_name_len
        );
        info!(
            "   • Generic email prefixes: {}",
            self.generic_email_prefixes.join(", ")
        );
        info!("   • Scan timeout: {}s", self.scan_timeout.as_secs());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_default_config() {
        let config = DedupConfig::default();
        assert_eq!(config.phonetic_similarity_threshold, 0.8);
        assert_eq!(config.min_phone_digits, 6);
        assert_eq!(config.min_phonetic_name_len, 3);
        assert_eq!(config.generic_email_prefixes.len(), 13);
        assert_eq!(config.scan_timeout, Duration::from_secs(300));
    }

    #[test]
    fn test_generic_local_part_is_exact() {
        let config = DedupConfig::default();
        assert!(config.is_generic_local_part("info"));
        assert!(config.is_generic_local_part("buchhaltung"));
        assert!(!config.is_generic_local_part("information"));
        assert!(!config.is_generic_local_part("jane"));
    }

    #[test]
    fn test_config_from_env() {
        env::set_var("DEDUP_PHONETIC_SIMILARITY_THRESHOLD", "0.9");
        env::set_var("DEDUP_MIN_PHONE_DIGITS", "8");
        env::set_var("DEDUP_MIN_PHONETIC_NAME_LEN", "not-a-number");
        env::set_var("DEDUP_GENERIC_EMAIL_PREFIXES", " Info, noreply ,,");
        env::set_var("DEDUP_SCAN_TIMEOUT_SECONDS", "0");

        let config = DedupConfig::from_env();
        assert_eq!(config.phonetic_similarity_threshold, 0.9);
        assert_eq!(config.min_phone_digits, 8);
        assert_eq!(config.min_phonetic_name_len, DEFAULT_MIN_PHONETIC_NAME_LEN);
        assert_eq!(config.generic_email_prefixes, vec!["info", "noreply"]);
        assert_eq!(config.scan_timeout, Duration::from_secs(DEFAULT_SCAN_TIMEOUT_SECONDS));

        // Cleanup
        env::remove_var("DEDUP_PHONETIC_SIMILARITY_THRESHOLD");
        env::remove_var("DEDUP_MIN_PHONE_DIGITS");
        env::remove_var("DEDUP_MIN_PHONETIC_NAME_LEN");
        env::remove_var("DEDUP_GENERIC_EMAIL_PREFIXES");
        env::remove_var("DEDUP_SCAN_TIMEOUT_SECONDS");
    }
}
