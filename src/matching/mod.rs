pub mod disambiguation;
pub mod distance;
pub mod email;
pub mod indexer;
pub mod manager;
pub mod name;
pub mod normalize;
pub mod phone;
pub mod phonetic;

pub use indexer::DedupIndexer;
pub use manager::{run_duplicate_scan, scan_records, ScanCancellation};
