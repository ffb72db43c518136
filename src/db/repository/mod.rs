//! Repository trait definitions.
//!
//! The analyzer core talks to storage exclusively through the
//! [`MetricsRepository`] trait. Each trait method is one atomic unit of work:
//! implementations acquire whatever connection or lock they need for the call
//! and release it on every exit path. The core performs no locking and no
//! retries of its own.

mod error;

pub use error::{ErrorContext, RepositoryError, RepositoryResult};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::api::{
    Account, AccountId, NewAccount, NewPost, OutlierQuery, Post, PostUpdate,
};

/// Storage contract for accounts and their post metrics.
///
/// Posts are keyed by their platform-assigned `post_id`; accounts by their
/// unique username. Range queries return posts newest first.
#[async_trait]
pub trait MetricsRepository: Send + Sync {
    /// Check that the backing store is reachable.
    async fn health_check(&self) -> RepositoryResult<bool>;

    // ==================== Accounts ====================

    /// Insert an account, or refresh the display name / follower count of an
    /// existing one. Returns the stored account.
    async fn upsert_account(&self, account: NewAccount) -> RepositoryResult<Account>;

    /// Look up an account by username (without leading `@`).
    async fn get_account(&self, username: &str) -> RepositoryResult<Option<Account>>;

    /// All monitored accounts, in no particular order.
    async fn get_all_accounts(&self) -> RepositoryResult<Vec<Account>>;

    /// Delete an account and all of its posts. Returns the number of posts
    /// removed, or `NotFound` if the account does not exist.
    async fn delete_account(&self, username: &str) -> RepositoryResult<usize>;

    /// Record the outcome of a metrics-source fetch on the account row.
    async fn update_account_profile(
        &self,
        account_id: AccountId,
        display_name: Option<String>,
        follower_count: Option<i64>,
        fetched_at: DateTime<Utc>,
    ) -> RepositoryResult<()>;

    // ==================== Posts ====================

    /// Posts for an account within `[start, end]` (both inclusive, either
    /// bound optional), newest first.
    async fn get_posts_by_account(
        &self,
        account_id: AccountId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Vec<Post>>;

    /// Insert new posts and refresh the counters/text of posts that already
    /// exist (matched on `post_id`). Returns `(inserted, updated)`.
    async fn bulk_upsert_posts(&self, posts: Vec<NewPost>) -> RepositoryResult<(usize, usize)>;

    /// Apply analysis-derived fields to posts in one atomic write.
    ///
    /// Updates for unknown post ids are skipped; the known ones are applied
    /// all-or-nothing.
    async fn bulk_update_derived_fields(&self, updates: Vec<PostUpdate>) -> RepositoryResult<()>;

    /// Posts matching an outlier/listing filter, joined with their accounts.
    async fn get_outlier_posts(
        &self,
        query: OutlierQuery,
    ) -> RepositoryResult<Vec<(Post, Account)>>;

    /// Newest posts, optionally restricted to an account and a trailing
    /// window of days.
    async fn get_recent_posts(
        &self,
        account_id: Option<AccountId>,
        days_back: Option<i64>,
        limit: usize,
    ) -> RepositoryResult<Vec<(Post, Account)>>;

    /// Total number of stored posts.
    async fn count_posts(&self) -> RepositoryResult<usize>;

    /// Number of posts flagged as outliers by the last analysis run.
    async fn count_outliers(&self) -> RepositoryResult<usize>;
}
