// src/matching/name.rs - Stages 3 and 4: identical and similar-sounding names
use log::debug;

use crate::matching::disambiguation::are_different_people;
use crate::matching::distance::name_similarity;
use crate::matching::indexer::DedupIndexer;
use crate::matching::manager::ClaimSet;
use crate::matching::normalize::normalize_name;
use crate::models::core::LightContact;
use crate::models::matching::{Confidence, DuplicateGroup, MatchResult};
use crate::models::stats_models::{MatchMethodStats, MatchMethodType};
use crate::utils::progress_bars::logging::MatchingLogger;

/// Groups contacts with the same normalized name unless any pair among the
/// candidates shows a conflict (organization, email or phone).
pub fn find_exact_matches(indexer: &DedupIndexer, claims: &mut ClaimSet) -> MatchResult {
    let logger = MatchingLogger::new(MatchMethodType::Name);
    let mut stats = MatchMethodStats::new(MatchMethodType::Name);
    let mut groups = Vec::new();

    let buckets: Vec<(&str, &[String])> = indexer.exact_name_index.candidate_buckets().collect();
    logger.log_start(buckets.len(), claims.len());

    for (name, ids) in buckets {
        stats.buckets_considered += 1;
        let candidates = claims.unclaimed(ids);
        if candidates.len() < 2 {
            logger.log_fully_claimed(name);
            continue;
        }

        let contacts: Vec<&LightContact> = candidates
            .iter()
            .filter_map(|id| indexer.contact(id))
            .collect();
        if has_conflicting_pair(&contacts) {
            stats.pairs_rejected += 1;
            logger.log_rejected(name, "same name but conflicting organization, email or phone");
            continue;
        }

        let group = DuplicateGroup::new(
            candidates,
            Confidence::Medium,
            format!("Identical name: {}", name),
            MatchMethodType::Name,
        );
        logger.log_group(name, group.contact_ids.len());
        claims.claim_all(&group.contact_ids);
        stats.groups_created += 1;
        stats.contacts_matched += group.contact_ids.len();
        groups.push(group);
    }

    logger.log_completion(&stats);
    MatchResult { groups, stats }
}

/// Pairs contacts whose names share a Cologne code and whose normalized names
/// are close enough by edit distance. Every group here has exactly two ids.
pub fn find_phonetic_matches(indexer: &DedupIndexer, claims: &mut ClaimSet) -> MatchResult {
    let logger = MatchingLogger::new(MatchMethodType::Phonetic);
    let mut stats = MatchMethodStats::new(MatchMethodType::Phonetic);
    let mut groups = Vec::new();
    let threshold = indexer.config().phonetic_similarity_threshold;

    let buckets: Vec<(&str, &[String])> = indexer.phonetic_index.candidate_buckets().collect();
    logger.log_start(buckets.len(), claims.len());

    for (code, ids) in buckets {
        stats.buckets_considered += 1;
        if claims.unclaimed(ids).len() < 2 {
            logger.log_fully_claimed(code);
            continue;
        }

        for i in 0..ids.len() {
            for j in (i + 1)..ids.len() {
                let (id1, id2) = (&ids[i], &ids[j]);
                if claims.is_claimed(id1) || claims.is_claimed(id2) {
                    continue;
                }
                let (c1, c2) = match (indexer.contact(id1), indexer.contact(id2)) {
                    (Some(c1), Some(c2)) => (c1, c2),
                    _ => continue,
                };
                if are_different_people(c1, c2) {
                    stats.pairs_rejected += 1;
                    logger.log_rejected(code, &format!("{} / {} conflict", id1, id2));
                    continue;
                }

                let similarity = name_similarity(&normalize_name(&c1.name), &normalize_name(&c2.name));
                if similarity <= threshold {
                    stats.pairs_rejected += 1;
                    debug!(
                        "Phonetic pair {} / {} below threshold ({:.3} <= {:.3})",
                        id1, id2, similarity, threshold
                    );
                    continue;
                }

                let group = DuplicateGroup::new(
                    vec![id1.clone(), id2.clone()],
                    Confidence::Medium,
                    format!("Similar sounding names ({:.0}% similar)", similarity * 100.0),
                    MatchMethodType::Phonetic,
                );
                logger.log_group(code, 2);
                claims.claim_all(&group.contact_ids);
                stats.groups_created += 1;
                stats.contacts_matched += 2;
                groups.push(group);
            }
        }
    }

    logger.log_completion(&stats);
    MatchResult { groups, stats }
}

fn has_conflicting_pair(contacts: &[&LightContact]) -> bool {
    contacts.iter().enumerate().any(|(i, c1)| {
        contacts[i + 1..]
            .iter()
            .any(|c2| are_different_people(c1, c2))
    })
}
