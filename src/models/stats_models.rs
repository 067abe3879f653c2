// src/models/stats_models.rs
use serde::{Deserialize, Serialize};

/// Grouping stage that produced a duplicate group. The variants are listed in
/// the order the stages run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMethodType {
    Email,
    Phone,
    Name,
    Phonetic,
}

impl MatchMethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMethodType::Email => "email",
            MatchMethodType::Phone => "phone",
            MatchMethodType::Name => "name",
            MatchMethodType::Phonetic => "phonetic",
        }
    }

    /// Stages in execution order.
    pub fn pipeline_order() -> [MatchMethodType; 4] {
        [
            MatchMethodType::Email,
            MatchMethodType::Phone,
            MatchMethodType::Name,
            MatchMethodType::Phonetic,
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMethodStats {
    pub method_type: MatchMethodType,
    pub groups_created: usize,
    pub contacts_matched: usize,
    /// Buckets holding two or more ids that the stage looked at.
    pub buckets_considered: usize,
    /// Buckets or pairs turned down by a guard (generic address, conflict, similarity).
    pub pairs_rejected: usize,
}

impl MatchMethodStats {
    pub fn new(method_type: MatchMethodType) -> Self {
        Self {
            method_type,
            groups_created: 0,
            contacts_matched: 0,
            buckets_considered: 0,
            pairs_rejected: 0,
        }
    }

    pub fn avg_group_size(&self) -> f64 {
        if self.groups_created == 0 {
            0.0
        } else {
            self.contacts_matched as f64 / self.groups_created as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pipeline_order_is_fixed() {
        let order = MatchMethodType::pipeline_order();
        assert_eq!(order[0], MatchMethodType::Email);
        assert_eq!(order[3], MatchMethodType::Phonetic);
    }

    #[test]
    fn test_avg_group_size() {
        let mut stats = MatchMethodStats::new(MatchMethodType::Phone);
        assert_eq!(stats.avg_group_size(), 0.0);
        stats.groups_created = 2;
        stats.contacts_matched = 5;
        assert!((stats.avg_group_size() - 2.5).abs() < f64::EPSILON);
    }
}
