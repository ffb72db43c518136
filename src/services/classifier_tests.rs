use crate::api::AccountBaseline;
use crate::services::classifier::{is_outlier, outlier_multiplier};

fn baseline_with_mean(mean: f64) -> AccountBaseline {
    AccountBaseline {
        mean_engagement: mean,
        median_engagement: mean,
        mean_likes: 0.0,
        mean_reshares: 0.0,
        mean_replies: 0.0,
        mean_views: 0.0,
        post_count: 10,
    }
}

#[test]
fn test_no_baseline_yields_zero() {
    assert_eq!(outlier_multiplier(25.0, None), 0.0);
    assert_eq!(outlier_multiplier(0.0, None), 0.0);
}

#[test]
fn test_zero_mean_baseline_sentinels() {
    let baseline = baseline_with_mean(0.0);
    assert_eq!(outlier_multiplier(5.0, Some(&baseline)), 1.0);
    assert_eq!(outlier_multiplier(0.0, Some(&baseline)), 0.0);
}

#[test]
fn test_multiplier_is_score_over_mean() {
    let baseline = baseline_with_mean(10.0);
    assert_eq!(outlier_multiplier(25.0, Some(&baseline)), 2.5);
    assert_eq!(outlier_multiplier(10.0, Some(&baseline)), 1.0);
    assert_eq!(outlier_multiplier(5.0, Some(&baseline)), 0.5);
}

#[test]
fn test_multiplier_is_uncapped() {
    let baseline = baseline_with_mean(10.0);
    assert_eq!(outlier_multiplier(500.0, Some(&baseline)), 50.0);
}

#[test]
fn test_threshold_is_inclusive() {
    assert!(is_outlier(2.0, 2.0));
    assert!(is_outlier(2.5, 2.0));
    assert!(!is_outlier(1.999, 2.0));
}

#[test]
fn test_raising_threshold_never_flags_more() {
    let multipliers = [0.0, 0.5, 1.0, 1.9, 2.0, 2.5, 10.0];
    let low: Vec<bool> = multipliers.iter().map(|&m| is_outlier(m, 2.0)).collect();
    let high: Vec<bool> = multipliers.iter().map(|&m| is_outlier(m, 3.0)).collect();

    for (l, h) in low.iter().zip(high.iter()) {
        // Flagged at the higher threshold implies flagged at the lower one.
        assert!(!h | l);
    }
}
