pub mod matching;
pub mod merge;
pub mod models;
pub mod utils;
