//! Business logic for engagement scoring and outlier analysis.
//!
//! The services here are layered on top of the repository trait: the pure
//! calculators (`scoring`, `baseline`, `classifier`) never touch storage,
//! while the orchestrators (`analyzer`, `fetcher`) read and write through
//! [`crate::db::MetricsRepository`].

pub mod analyzer;
pub mod baseline;
pub mod classifier;
pub mod fetcher;
pub mod scoring;

pub use analyzer::{analyze_account, analyze_all_accounts};
pub use baseline::compute_baseline;
pub use classifier::{is_outlier, outlier_multiplier};
pub use fetcher::{
    fetch_account, fetch_all_accounts, FetchOutcome, FetchSummary, FetcherConfig, MetricsSource,
    RawPost, SourceProfile,
};
pub use scoring::engagement_score;

#[cfg(test)]
#[path = "scoring_tests.rs"]
mod scoring_tests;


#[cfg(test)]
#[path = "classifier_tests.rs"]
mod classifier_tests;
