use chrono::{Duration, Utc};

use postpulse::api::{AccountId, NewAccount, NewPost, OutlierQuery, PostSort, PostUpdate};
use postpulse::db::repositories::LocalRepository;
use postpulse::db::MetricsRepository;

fn new_post(account_id: AccountId, post_id: &str, likes: i64, days_ago: i64) -> NewPost {
    NewPost {
        account_id,
        post_id: post_id.to_string(),
        text: format!("post {}", post_id),
        created_at: Utc::now() - Duration::days(days_ago),
        likes,
        reshares: 0,
        replies: 0,
        views: 0,
    }
}

#[tokio::test]
async fn test_upsert_account_assigns_sequential_ids() {
    let repo = LocalRepository::new();

    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    let bob = repo.upsert_account(NewAccount::new("bob")).await.unwrap();

    assert_ne!(alice.id, bob.id);
    assert_eq!(repo.account_count(), 2);
}

#[tokio::test]
async fn test_upsert_existing_account_refreshes_profile() {
    let repo = LocalRepository::new();
    let first = repo.upsert_account(NewAccount::new("alice")).await.unwrap();

    let second = repo
        .upsert_account(NewAccount {
            username: "alice".to_string(),
            display_name: Some("Alice A".to_string()),
            follower_count: Some(42),
        })
        .await
        .unwrap();

    assert_eq!(first.id, second.id);
    assert_eq!(second.display_name.as_deref(), Some("Alice A"));
    assert_eq!(second.follower_count, 42);
    assert_eq!(repo.account_count(), 1);
}

#[tokio::test]
async fn test_delete_account_removes_posts_and_reports_count() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    let bob = repo.upsert_account(NewAccount::new("bob")).await.unwrap();

    repo.bulk_upsert_posts(vec![
        new_post(alice.id, "a1", 1, 1),
        new_post(alice.id, "a2", 2, 2),
        new_post(bob.id, "b1", 3, 1),
    ])
    .await
    .unwrap();

    let removed = repo.delete_account("alice").await.unwrap();
    assert_eq!(removed, 2);
    assert!(repo.get_account("alice").await.unwrap().is_none());
    // bob's posts are untouched
    assert_eq!(repo.count_posts().await.unwrap(), 1);
}

#[tokio::test]
async fn test_delete_unknown_account_is_not_found() {
    let repo = LocalRepository::new();
    let err = repo.delete_account("ghost").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_bulk_upsert_skips_blank_post_ids() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();

    let (inserted, updated) = repo
        .bulk_upsert_posts(vec![
            new_post(alice.id, "p1", 1, 1),
            new_post(alice.id, "  ", 2, 1),
            new_post(alice.id, "", 3, 1),
        ])
        .await
        .unwrap();

    assert_eq!(inserted, 1);
    assert_eq!(updated, 0);
    assert_eq!(repo.count_posts().await.unwrap(), 1);
}

#[tokio::test]
async fn test_counter_refresh_preserves_derived_fields() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    repo.bulk_upsert_posts(vec![new_post(alice.id, "p1", 10, 1)])
        .await
        .unwrap();

    repo.bulk_update_derived_fields(vec![PostUpdate {
        post_id: "p1".to_string(),
        outlier_multiplier: 3.5,
        is_outlier: true,
        total_engagement: 10.0,
    }])
    .await
    .unwrap();

    // Re-fetch with new counters.
    let (inserted, updated) = repo
        .bulk_upsert_posts(vec![new_post(alice.id, "p1", 99, 1)])
        .await
        .unwrap();
    assert_eq!((inserted, updated), (0, 1));

    let posts = repo.get_posts_by_account(alice.id, None, None).await.unwrap();
    assert_eq!(posts[0].likes, 99);
    assert_eq!(posts[0].outlier_multiplier, 3.5);
    assert!(posts[0].is_outlier);
}

#[tokio::test]
async fn test_derived_field_update_ignores_unknown_posts() {
    let repo = LocalRepository::new();
    repo.bulk_update_derived_fields(vec![PostUpdate {
        post_id: "missing".to_string(),
        outlier_multiplier: 1.0,
        is_outlier: false,
        total_engagement: 0.0,
    }])
    .await
    .unwrap();
}

#[tokio::test]
async fn test_get_posts_by_account_respects_time_bounds() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    repo.bulk_upsert_posts(vec![
        new_post(alice.id, "old", 1, 100),
        new_post(alice.id, "mid", 2, 50),
        new_post(alice.id, "new", 3, 1),
    ])
    .await
    .unwrap();

    let start = Utc::now() - Duration::days(60);
    let posts = repo
        .get_posts_by_account(alice.id, Some(start), None)
        .await
        .unwrap();
    assert_eq!(posts.len(), 2);
    // Newest first.
    assert_eq!(posts[0].post_id, "new");
    assert_eq!(posts[1].post_id, "mid");
}

#[tokio::test]
async fn test_outlier_query_filters_and_sorts() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    repo.bulk_upsert_posts(vec![
        new_post(alice.id, "p1", 1, 1),
        new_post(alice.id, "p2", 2, 2),
        new_post(alice.id, "p3", 3, 3),
    ])
    .await
    .unwrap();

    repo.bulk_update_derived_fields(vec![
        PostUpdate {
            post_id: "p1".to_string(),
            outlier_multiplier: 2.5,
            is_outlier: true,
            total_engagement: 1.0,
        },
        PostUpdate {
            post_id: "p2".to_string(),
            outlier_multiplier: 5.0,
            is_outlier: true,
            total_engagement: 2.0,
        },
        PostUpdate {
            post_id: "p3".to_string(),
            outlier_multiplier: 0.5,
            is_outlier: false,
            total_engagement: 3.0,
        },
    ])
    .await
    .unwrap();

    let results = repo.get_outlier_posts(OutlierQuery::default()).await.unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].0.post_id, "p2");
    assert_eq!(results[1].0.post_id, "p1");

    let capped = repo
        .get_outlier_posts(OutlierQuery {
            max_multiplier: Some(3.0),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(capped.len(), 1);
    assert_eq!(capped[0].0.post_id, "p1");

    let everything = repo
        .get_outlier_posts(OutlierQuery {
            outliers_only: false,
            sort: PostSort::Newest,
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(everything.len(), 3);
    assert_eq!(everything[0].0.post_id, "p1");
}

#[tokio::test]
async fn test_outlier_query_limit() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    let posts: Vec<NewPost> = (0..10)
        .map(|i| new_post(alice.id, &format!("p{}", i), i, 1))
        .collect();
    repo.bulk_upsert_posts(posts).await.unwrap();

    let results = repo
        .get_recent_posts(None, None, 3)
        .await
        .unwrap();
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn test_recent_posts_join_account() {
    let repo = LocalRepository::new();
    let alice = repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    repo.bulk_upsert_posts(vec![new_post(alice.id, "p1", 1, 1)])
        .await
        .unwrap();

    let results = repo.get_recent_posts(None, None, 10).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].1.username, "alice");
}

#[tokio::test]
async fn test_unhealthy_repository_fails_operations() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);

    assert!(!repo.health_check().await.unwrap());
    let err = repo.get_all_accounts().await.unwrap_err();
    assert!(err.to_string().contains("not healthy"));
}

#[tokio::test]
async fn test_clear_resets_data_but_not_health() {
    let repo = LocalRepository::new();
    repo.upsert_account(NewAccount::new("alice")).await.unwrap();
    repo.clear();

    assert_eq!(repo.account_count(), 0);
    assert!(repo.health_check().await.unwrap());
}
