//! Engagement scoring.
//!
//! A post's engagement score is a weighted sum of its interaction counters.
//! Views are divided by 1000 before weighting so raw reach does not drown
//! out the active-engagement signals.

use crate::api::{EngagementWeights, Post};

/// Compute the engagement score for a set of raw counters.
///
/// `score = likes*w_l + reshares*w_s + replies*w_r + (views/1000)*w_v`
///
/// The score is linear in every counter and zero for all-zero counters.
pub fn engagement_score(
    likes: i64,
    reshares: i64,
    replies: i64,
    views: i64,
    weights: &EngagementWeights,
) -> f64 {
    likes as f64 * weights.likes
        + reshares as f64 * weights.reshares
        + replies as f64 * weights.replies
        + (views as f64 / 1000.0) * weights.views
}

/// Score a stored post's counters.
pub fn post_score(post: &Post, weights: &EngagementWeights) -> f64 {
    engagement_score(post.likes, post.reshares, post.replies, post.views, weights)
}
