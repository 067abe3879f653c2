pub mod core;
pub mod matching;
pub mod stats_models;

pub use self::core::{ContactRecord, LightContact};
pub use self::matching::{Confidence, DuplicateGroup, MatchResult, ScanReport};
pub use self::stats_models::{MatchMethodStats, MatchMethodType};
