use crate::api::{
    AccountId, AnalysisResult, AnalyzerConfig, EngagementWeights, NewAccount, OutlierQuery,
    PostSort,
};

#[test]
fn test_account_id_new() {
    let id = AccountId::new(42);
    assert_eq!(id.value(), 42);
}

#[test]
fn test_account_id_equality() {
    let id1 = AccountId::new(100);
    let id2 = AccountId::new(100);
    let id3 = AccountId::new(101);

    assert_eq!(id1, id2);
    assert_ne!(id1, id3);
}

#[test]
fn test_account_id_display() {
    assert_eq!(AccountId::new(7).to_string(), "7");
}

#[test]
fn test_default_weights() {
    let weights = EngagementWeights::default();
    assert_eq!(weights.likes, 1.0);
    assert_eq!(weights.reshares, 2.0);
    assert_eq!(weights.replies, 3.0);
    assert_eq!(weights.views, 0.1);
}

#[test]
fn test_default_analyzer_config() {
    let config = AnalyzerConfig::default();
    assert_eq!(config.months_back, 3);
    assert_eq!(config.threshold, 2.0);
    assert_eq!(config.weights, EngagementWeights::default());
}

#[test]
fn test_analyzer_config_builders() {
    let config = AnalyzerConfig::default()
        .with_months_back(6)
        .with_threshold(3.5);
    assert_eq!(config.months_back, 6);
    assert_eq!(config.threshold, 3.5);
}

#[test]
fn test_no_data_result() {
    let result = AnalysisResult::no_data(AccountId::new(1));
    assert!(result.baseline.is_none());
    assert!(result.outliers.is_empty());
    assert_eq!(result.total_posts, 0);
    assert_eq!(result.outlier_count, 0);
    assert!(result.error.is_some());
}

#[test]
fn test_new_account_defaults() {
    let account = NewAccount::new("rustlang");
    assert_eq!(account.username, "rustlang");
    assert!(account.display_name.is_none());
    assert!(account.follower_count.is_none());
}

#[test]
fn test_outlier_query_defaults() {
    let query = OutlierQuery::default();
    assert_eq!(query.limit, 100);
    assert_eq!(query.sort, PostSort::Multiplier);
    assert!(query.outliers_only);
    assert!(query.min_multiplier.is_none());
}

#[test]
fn test_analysis_result_serialization_skips_absent_fields() {
    let result = AnalysisResult::no_data(AccountId::new(5));
    let json = serde_json::to_value(&result).unwrap();
    assert!(json.get("baseline").is_none());
    assert!(json.get("username").is_none());
    assert!(json.get("error").is_some());
}
