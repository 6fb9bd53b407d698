//! Per-commit analysis and cross-set correlation

pub mod collect;
pub mod correlate;
pub mod fingerprint;
pub mod metadata;

pub use collect::{analyze_commit, collect_commit_set};
pub use correlate::{correlate, Correlation, RevertLinks, Summary};
