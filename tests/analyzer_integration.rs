//! End-to-end analysis flow against the in-memory repository: import
//! accounts, ingest posts, run the analyzer, and read outliers back through
//! the query interface.

use chrono::{Duration, Utc};

use postpulse::api::{AnalyzerConfig, NewAccount, NewPost, OutlierQuery};
use postpulse::db::repositories::LocalRepository;
use postpulse::db::MetricsRepository;
use postpulse::services::analyzer::{analyze_account, analyze_all_accounts};

fn post(account_id: postpulse::api::AccountId, post_id: &str, likes: i64, days_ago: i64) -> NewPost {
    NewPost {
        account_id,
        post_id: post_id.to_string(),
        text: format!("body of {}", post_id),
        created_at: Utc::now() - Duration::days(days_ago),
        likes,
        reshares: 0,
        replies: 0,
        views: 0,
    }
}

#[tokio::test]
async fn test_full_analysis_flow() {
    let repo = LocalRepository::new();

    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    repo.bulk_upsert_posts(vec![
        post(alice.id, "a1", 10, 10),
        post(alice.id, "a2", 10, 8),
        post(alice.id, "a3", 100, 5),
    ])
    .await
    .unwrap();

    let bob = repo.upsert_account(NewAccount::new("bob")).await.unwrap();
    repo.bulk_upsert_posts(vec![
        post(bob.id, "b1", 50, 7),
        post(bob.id, "b2", 50, 3),
    ])
    .await
    .unwrap();

    let results = analyze_all_accounts(&repo, &AnalyzerConfig::default())
        .await
        .unwrap();
    assert_eq!(results.len(), 2);

    let alice_result = results
        .iter()
        .find(|r| r.username.as_deref() == Some("alice"))
        .unwrap();
    assert_eq!(alice_result.outlier_count, 1);
    assert_eq!(alice_result.outliers[0].post_id, "a3");
    assert_eq!(alice_result.outliers[0].multiplier, 2.5);

    // bob's posts are uniform, no outliers.
    let bob_result = results
        .iter()
        .find(|r| r.username.as_deref() == Some("bob"))
        .unwrap();
    assert_eq!(bob_result.outlier_count, 0);
    assert_eq!(bob_result.total_posts, 2);

    // Derived fields are queryable store-wide after the run.
    assert_eq!(repo.count_outliers().await.unwrap(), 1);

    let outliers = repo.get_outlier_posts(OutlierQuery::default()).await.unwrap();
    assert_eq!(outliers.len(), 1);
    let (outlier_post, outlier_account) = &outliers[0];
    assert_eq!(outlier_post.post_id, "a3");
    assert_eq!(outlier_account.username, "alice");
    assert_eq!(outlier_post.outlier_multiplier, 2.5);
    assert_eq!(outlier_post.total_engagement, 100.0);
}

#[tokio::test]
async fn test_counter_change_reflects_in_next_run() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    repo.bulk_upsert_posts(vec![
        post(alice.id, "a1", 10, 10),
        post(alice.id, "a2", 10, 8),
        post(alice.id, "a3", 10, 5),
    ])
    .await
    .unwrap();

    let config = AnalyzerConfig::default();
    let first = analyze_account(&repo, alice.id, &config).await.unwrap();
    assert_eq!(first.outlier_count, 0);

    // a3 goes viral between fetches.
    repo.bulk_upsert_posts(vec![post(alice.id, "a3", 1000, 5)])
        .await
        .unwrap();

    let second = analyze_account(&repo, alice.id, &config).await.unwrap();
    assert_eq!(second.outlier_count, 1);
    assert_eq!(second.outliers[0].post_id, "a3");
}

#[tokio::test]
async fn test_narrower_window_changes_baseline() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    repo.bulk_upsert_posts(vec![
        post(alice.id, "recent-big", 100, 5),
        post(alice.id, "recent-small", 10, 10),
        post(alice.id, "older", 10, 45),
    ])
    .await
    .unwrap();

    let wide = AnalyzerConfig::default().with_months_back(3);
    let result = analyze_account(&repo, alice.id, &wide).await.unwrap();
    assert_eq!(result.total_posts, 3);

    let narrow = AnalyzerConfig::default().with_months_back(1);
    let result = analyze_account(&repo, alice.id, &narrow).await.unwrap();
    assert_eq!(result.total_posts, 2);
    assert_eq!(result.baseline.unwrap().mean_engagement, 55.0);
}
