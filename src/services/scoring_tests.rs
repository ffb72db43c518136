use crate::api::EngagementWeights;
use crate::services::scoring::engagement_score;

#[test]
fn test_all_zero_counters_score_zero() {
    let w = EngagementWeights::default();
    assert_eq!(engagement_score(0, 0, 0, 0, &w), 0.0);
}

#[test]
fn test_default_weights_per_counter() {
    let w = EngagementWeights::default();
    assert_eq!(engagement_score(5, 0, 0, 0, &w), 5.0);
    assert_eq!(engagement_score(0, 5, 0, 0, &w), 10.0);
    assert_eq!(engagement_score(0, 0, 5, 0, &w), 15.0);
    // 5000 views -> 5 * 0.1
    assert_eq!(engagement_score(0, 0, 0, 5000, &w), 0.5);
}

#[test]
fn test_views_are_downscaled_by_thousand() {
    let w = EngagementWeights::default();
    assert_eq!(engagement_score(0, 0, 0, 1000, &w), 0.1);
    assert_eq!(engagement_score(0, 0, 0, 500, &w), 0.05);
}

#[test]
fn test_combined_counters() {
    let w = EngagementWeights::default();
    // 10*1 + 5*2 + 2*3 + (2000/1000)*0.1
    assert_eq!(engagement_score(10, 5, 2, 2000, &w), 26.2);
}

#[test]
fn test_score_is_linear_in_counters() {
    let w = EngagementWeights::default();
    let base = engagement_score(3, 7, 2, 4000, &w);
    let doubled = engagement_score(6, 14, 4, 8000, &w);
    assert_eq!(doubled, base * 2.0);
}

#[test]
fn test_custom_weights() {
    let w = EngagementWeights {
        likes: 0.5,
        reshares: 4.0,
        replies: 1.0,
        views: 2.0,
    };
    assert_eq!(engagement_score(2, 1, 3, 1000, &w), 0.5 * 2.0 + 4.0 + 3.0 + 2.0);
}
