//! Metrics ingestion from an external source.
//!
//! [`MetricsSource`] is the seam to whatever platform API supplies profile
//! and post data. The fetch orchestrators pull posts for stored accounts,
//! upsert them, and record fetch timestamps so accounts are not re-fetched
//! more often than configured.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use log::{info, warn};

use crate::api::{Account, AccountId, NewPost};
use crate::db::{MetricsRepository, RepositoryResult};

/// Profile data returned by a metrics source.
#[derive(Debug, Clone, Default)]
pub struct SourceProfile {
    pub display_name: Option<String>,
    pub follower_count: Option<i64>,
}

/// A post as delivered by a metrics source, before storage.
#[derive(Debug, Clone)]
pub struct RawPost {
    pub post_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub reshares: i64,
    pub replies: i64,
    pub views: i64,
}

/// External supplier of account profiles and post metrics.
#[async_trait]
pub trait MetricsSource: Send + Sync {
    /// Fetch the current profile for a username.
    async fn fetch_profile(&self, username: &str) -> anyhow::Result<SourceProfile>;

    /// Fetch posts for a username created at or after `since`.
    async fn fetch_posts(
        &self,
        username: &str,
        since: DateTime<Utc>,
    ) -> anyhow::Result<Vec<RawPost>>;
}

/// Fetch scheduling and window configuration.
#[derive(Debug, Clone, Copy)]
pub struct FetcherConfig {
    /// Trailing window length, approximated as `months_back * 30` days.
    pub months_back: u32,
    /// Accounts fetched more recently than this are skipped.
    pub min_hours_between_fetches: i64,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            months_back: 3,
            min_hours_between_fetches: 6,
        }
    }
}

/// Outcome of fetching a single account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    /// Posts were fetched and stored: (inserted, updated).
    Fetched { inserted: usize, updated: usize },
    /// The account was fetched too recently and was left alone.
    Skipped,
}

/// Aggregate counts for a fleet-wide fetch run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FetchSummary {
    pub accounts_fetched: usize,
    pub accounts_skipped: usize,
    pub accounts_failed: usize,
    pub posts_inserted: usize,
    pub posts_updated: usize,
}

/// Fetch one account's profile and posts and store them.
///
/// Skips the account when its last fetch is within the configured minimum
/// interval. Source failures propagate to the caller; the account's fetch
/// timestamp is only advanced after a successful store.
pub async fn fetch_account(
    repo: &dyn MetricsRepository,
    source: &dyn MetricsSource,
    account: &Account,
    config: &FetcherConfig,
) -> anyhow::Result<FetchOutcome> {
    let now = Utc::now();

    if let Some(last) = account.last_fetched_at {
        if now - last < Duration::hours(config.min_hours_between_fetches) {
            info!("account @{}: fetched recently, skipping", account.username);
            return Ok(FetchOutcome::Skipped);
        }
    }

    let profile = source.fetch_profile(&account.username).await?;

    let since = now - Duration::days(config.months_back as i64 * 30);
    let raw_posts = source.fetch_posts(&account.username, since).await?;

    let new_posts: Vec<NewPost> = raw_posts
        .into_iter()
        .map(|p| raw_to_new_post(account.id, p))
        .collect();

    let (inserted, updated) = repo.bulk_upsert_posts(new_posts).await?;

    repo.update_account_profile(account.id, profile.display_name, profile.follower_count, now)
        .await?;

    info!(
        "account @{}: {} posts inserted, {} updated",
        account.username, inserted, updated
    );

    Ok(FetchOutcome::Fetched { inserted, updated })
}

/// Fetch every stored account sequentially.
///
/// A failure for one account is counted and logged without aborting the
/// rest of the run.
pub async fn fetch_all_accounts(
    repo: &dyn MetricsRepository,
    source: &dyn MetricsSource,
    config: &FetcherConfig,
) -> RepositoryResult<FetchSummary> {
    let accounts = repo.get_all_accounts().await?;
    let mut summary = FetchSummary::default();

    for account in &accounts {
        match fetch_account(repo, source, account, config).await {
            Ok(FetchOutcome::Fetched { inserted, updated }) => {
                summary.accounts_fetched += 1;
                summary.posts_inserted += inserted;
                summary.posts_updated += updated;
            }
            Ok(FetchOutcome::Skipped) => summary.accounts_skipped += 1,
            Err(e) => {
                warn!("account @{}: fetch failed: {}", account.username, e);
                summary.accounts_failed += 1;
            }
        }
    }

    info!(
        "fetch run complete: {} fetched, {} skipped, {} failed",
        summary.accounts_fetched, summary.accounts_skipped, summary.accounts_failed
    );

    Ok(summary)
}

fn raw_to_new_post(account_id: AccountId, raw: RawPost) -> NewPost {
    NewPost {
        account_id,
        post_id: raw.post_id,
        text: raw.text,
        created_at: raw.created_at,
        likes: raw.likes,
        reshares: raw.reshares,
        replies: raw.replies,
        views: raw.views,
    }
}
