//! Outlier classification.
//!
//! A post's outlier multiplier is its engagement score relative to the
//! account's mean baseline. The multiplier is uncapped; a 50x post reports
//! as 50.0.

use crate::api::AccountBaseline;

/// Compute the outlier multiplier for a score against a baseline.
///
/// Sentinels:
/// - no baseline (account had no window): `0.0`
/// - zero-mean baseline: `1.0` if the score is positive, else `0.0`
///
/// Otherwise `score / baseline.mean_engagement`, uncapped.
pub fn outlier_multiplier(score: f64, baseline: Option<&AccountBaseline>) -> f64 {
    let Some(baseline) = baseline else {
        return 0.0;
    };

    if baseline.mean_engagement == 0.0 {
        return if score > 0.0 { 1.0 } else { 0.0 };
    }

    score / baseline.mean_engagement
}

/// Whether a multiplier crosses the outlier threshold.
///
/// The comparison is inclusive: a post exactly at the threshold is flagged.
pub fn is_outlier(multiplier: f64, threshold: f64) -> bool {
    multiplier >= threshold
}
