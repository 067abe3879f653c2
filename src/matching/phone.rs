// src/matching/phone.rs - Stage 2: contacts sharing a phone number
use crate::matching::indexer::DedupIndexer;
use crate::matching::manager::ClaimSet;
use crate::models::matching::{Confidence, DuplicateGroup, MatchResult};
use crate::models::stats_models::{MatchMethodStats, MatchMethodType};
use crate::utils::progress_bars::logging::MatchingLogger;

/// A shared cleaned phone number groups unconditionally at High confidence.
pub fn find_matches(indexer: &DedupIndexer, claims: &mut ClaimSet) -> MatchResult {
    let logger = MatchingLogger::new(MatchMethodType::Phone);
    let mut stats = MatchMethodStats::new(MatchMethodType::Phone);
    let mut groups = Vec::new();

    let buckets: Vec<(&str, &[String])> = indexer.phone_index.candidate_buckets().collect();
    logger.log_start(buckets.len(), claims.len());

    for (phone, ids) in buckets {
        stats.buckets_considered += 1;
        let candidates = claims.unclaimed(ids);
        if candidates.len() < 2 {
            logger.log_fully_claimed(phone);
            continue;
        }

        let group = DuplicateGroup::new(
            candidates,
            Confidence::High,
            format!("Same phone number: {}", phone),
            MatchMethodType::Phone,
        );
        logger.log_group(phone, group.contact_ids.len());
        claims.claim_all(&group.contact_ids);
        stats.groups_created += 1;
        stats.contacts_matched += group.contact_ids.len();
        groups.push(group);
    }

    logger.log_completion(&stats);
    MatchResult { groups, stats }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::ContactRecord;

    #[test]
    fn test_shared_phone_groups_high_even_with_different_names() {
        let mut indexer = DedupIndexer::new();
        indexer.add(&ContactRecord::new("a", "Jane Doe", Some("Acme"), "TEL:+49 30 1234567"));
        indexer.add(&ContactRecord::new("b", "Someone Else", Some("Other"), "TEL;TYPE=work:+49-30-1234567"));
        indexer.add(&ContactRecord::new("c", "Third", None, "TEL:+49 30 7654321"));

        let mut claims = ClaimSet::default();
        let result = find_matches(&indexer, &mut claims);
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].contact_ids, vec!["a", "b"]);
        assert_eq!(result.groups[0].confidence, Confidence::High);
        assert_eq!(result.stats.buckets_considered, 1);
        assert!(!claims.is_claimed("c"));
    }

    #[test]
    fn test_country_code_variants_do_not_match() {
        let mut indexer = DedupIndexer::new();
        indexer.add(&ContactRecord::new("a", "Jane", None, "TEL:+49 30 1234567"));
        indexer.add(&ContactRecord::new("b", "Jane", None, "TEL:030 1234567"));
        let result = find_matches(&indexer, &mut ClaimSet::default());
        assert!(result.groups.is_empty());
    }
}
