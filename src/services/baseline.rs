//! Baseline calculation.
//!
//! The baseline summarizes an account's typical engagement over a post
//! window: mean and median engagement score plus per-counter means. It is
//! recomputed on every analysis run and never persisted.

use crate::api::{AccountBaseline, EngagementWeights, Post};

use super::scoring::post_score;

/// Compute an account's engagement baseline from the posts in its window.
///
/// Returns `None` for an empty slice.
///
/// When every score nets out to a zero mean but some posts did score above
/// zero (negative weights can produce this), the mean is recomputed over the
/// strictly positive scores only, so the multiplier denominator stays
/// meaningful. Per-counter means are not corrected.
pub fn compute_baseline(posts: &[Post], weights: &EngagementWeights) -> Option<AccountBaseline> {
    if posts.is_empty() {
        return None;
    }

    let scores: Vec<f64> = posts.iter().map(|p| post_score(p, weights)).collect();
    let n = scores.len() as f64;

    let mut mean_engagement = scores.iter().sum::<f64>() / n;
    if mean_engagement == 0.0 {
        let positive: Vec<f64> = scores.iter().copied().filter(|&s| s > 0.0).collect();
        if !positive.is_empty() {
            mean_engagement = positive.iter().sum::<f64>() / positive.len() as f64;
        }
    }

    Some(AccountBaseline {
        mean_engagement,
        median_engagement: median(&scores),
        mean_likes: posts.iter().map(|p| p.likes as f64).sum::<f64>() / n,
        mean_reshares: posts.iter().map(|p| p.reshares as f64).sum::<f64>() / n,
        mean_replies: posts.iter().map(|p| p.replies as f64).sum::<f64>() / n,
        mean_views: posts.iter().map(|p| p.views as f64).sum::<f64>() / n,
        post_count: posts.len(),
    })
}

/// Median of a non-empty sample; averages the two middle values for even
/// lengths.
fn median(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}
