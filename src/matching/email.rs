// src/matching/email.rs - Stage 1: contacts sharing an email address
use crate::matching::indexer::DedupIndexer;
use crate::matching::manager::ClaimSet;
use crate::matching::normalize::{email_local_part, normalize_name};
use crate::models::matching::{Confidence, DuplicateGroup, MatchResult};
use crate::models::stats_models::{MatchMethodStats, MatchMethodType};
use crate::utils::progress_bars::logging::MatchingLogger;

/// Groups every email bucket with two or more unclaimed contacts.
///
/// A personal address is a unique identifier and groups at High confidence.
/// A generic team address (info@, office@, ...) only groups when all
/// candidates carry the same normalized name, and then only at Medium.
pub fn find_matches(indexer: &DedupIndexer, claims: &mut ClaimSet) -> MatchResult {
    let logger = MatchingLogger::new(MatchMethodType::Email);
    let mut stats = MatchMethodStats::new(MatchMethodType::Email);
    let mut groups = Vec::new();

    let buckets: Vec<(&str, &[String])> = indexer.email_index.candidate_buckets().collect();
    logger.log_start(buckets.len(), claims.len());

    for (email, ids) in buckets {
        stats.buckets_considered += 1;
        let candidates = claims.unclaimed(ids);
        if candidates.len() < 2 {
            logger.log_fully_claimed(email);
            continue;
        }

        let group = if indexer
            .config()
            .is_generic_local_part(email_local_part(email))
        {
            if !all_names_identical(indexer, &candidates) {
                stats.pairs_rejected += 1;
                logger.log_rejected(email, "generic address shared by different names");
                continue;
            }
            DuplicateGroup::new(
                candidates,
                Confidence::Medium,
                format!("Shared generic address {} with identical names", email),
                MatchMethodType::Email,
            )
        } else {
            DuplicateGroup::new(
                candidates,
                Confidence::High,
                format!("Same email address: {}", email),
                MatchMethodType::Email,
            )
        };

        logger.log_group(email, group.contact_ids.len());
        claims.claim_all(&group.contact_ids);
        stats.groups_created += 1;
        stats.contacts_matched += group.contact_ids.len();
        groups.push(group);
    }

    logger.log_completion(&stats);
    MatchResult { groups, stats }
}

fn all_names_identical(indexer: &DedupIndexer, ids: &[String]) -> bool {
    let mut names = ids.iter().map(|id| {
        indexer
            .contact(id)
            .map(|c| normalize_name(&c.name))
            .unwrap_or_default()
    });
    match names.next() {
        Some(first) => names.all(|n| n == first),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::core::ContactRecord;

    fn indexer_with(records: &[(&str, &str, &str)]) -> DedupIndexer {
        let mut indexer = DedupIndexer::new();
        for (id, name, email) in records {
            indexer.add(&ContactRecord::new(*id, *name, None, format!("EMAIL:{}", email)));
        }
        indexer
    }

    #[test]
    fn test_personal_email_groups_high() {
        let indexer = indexer_with(&[("a", "Jane Doe", "jane@x.com"), ("b", "J. Doe", "JANE@x.com")]);
        let mut claims = ClaimSet::default();
        let result = find_matches(&indexer, &mut claims);

        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].contact_ids, vec!["a", "b"]);
        assert_eq!(result.groups[0].confidence, Confidence::High);
        assert!(result.groups[0].reason.contains("jane@x.com"));
        assert!(claims.is_claimed("a") && claims.is_claimed("b"));
    }

    #[test]
    fn test_generic_email_requires_identical_names() {
        let indexer = indexer_with(&[("a", "Jane Doe", "info@acme.com"), ("b", "John Roe", "info@acme.com")]);
        let mut claims = ClaimSet::default();
        let result = find_matches(&indexer, &mut claims);
        assert!(result.groups.is_empty());
        assert_eq!(result.stats.pairs_rejected, 1);
        assert_eq!(claims.len(), 0);

        let indexer = indexer_with(&[("a", "Jane Doe", "info@acme.com"), ("b", "Dr. jane  doe", "info@acme.com")]);
        let result = find_matches(&indexer, &mut ClaimSet::default());
        assert_eq!(result.groups.len(), 1);
        assert_eq!(result.groups[0].confidence, Confidence::Medium);
        assert!(result.groups[0].reason.contains("info@acme.com"));
    }

    #[test]
    fn test_claimed_contacts_are_left_out() {
        let indexer = indexer_with(&[
            ("a", "Jane", "jane@x.com"),
            ("b", "Jane", "jane@x.com"),
            ("c", "Jane", "jane@x.com"),
        ]);
        let mut claims = ClaimSet::default();
        claims.claim_all(&["a".to_string()]);
        let result = find_matches(&indexer, &mut claims);
        assert_eq!(result.groups[0].contact_ids, vec!["b", "c"]);

        // a second pass over the same claims finds nothing left to group
        let again = find_matches(&indexer, &mut claims);
        assert!(again.groups.is_empty());
        assert_eq!(again.stats.buckets_considered, 1);
    }
}
