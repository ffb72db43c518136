//! In-memory local repository implementation.
//!
//! This module provides a local implementation of [`MetricsRepository`]
//! suitable for unit testing and local development. All data is stored in
//! memory using HashMap structures, providing fast, deterministic, and
//! isolated execution.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;

use crate::api::{
    Account, AccountId, NewAccount, NewPost, OutlierQuery, Post, PostSort, PostUpdate,
};
use crate::db::repository::{MetricsRepository, RepositoryError, RepositoryResult};

/// In-memory local repository.
///
/// Cloning is cheap: clones share the same underlying data, which mirrors how
/// a pooled database handle behaves.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    accounts: HashMap<AccountId, Account>,
    // username -> account id, usernames stored without leading '@'
    username_index: HashMap<String, AccountId>,
    // platform post id -> post
    posts: HashMap<String, Post>,
    next_account_id: i64,
    next_post_row_id: i64,
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            accounts: HashMap::new(),
            username_index: HashMap::new(),
            posts: HashMap::new(),
            next_account_id: 1,
            next_post_row_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        self.data.write().is_healthy = healthy;
    }

    /// Clear all data from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write();
        let healthy = data.is_healthy;
        *data = LocalData {
            is_healthy: healthy,
            ..Default::default()
        };
    }

    /// Number of stored accounts.
    pub fn account_count(&self) -> usize {
        self.data.read().accounts.len()
    }

    /// Number of stored posts.
    pub fn post_count(&self) -> usize {
        self.data.read().posts.len()
    }

    fn check_health(&self) -> RepositoryResult<()> {
        if !self.data.read().is_healthy {
            return Err(RepositoryError::connection("Repository is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

fn sort_posts(posts: &mut [(Post, Account)], sort: PostSort) {
    match sort {
        PostSort::Multiplier => posts.sort_by(|a, b| {
            b.0.outlier_multiplier
                .partial_cmp(&a.0.outlier_multiplier)
                .unwrap_or(std::cmp::Ordering::Equal)
        }),
        PostSort::Newest => posts.sort_by(|a, b| b.0.created_at.cmp(&a.0.created_at)),
    }
}

#[async_trait]
impl MetricsRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        Ok(self.data.read().is_healthy)
    }

    async fn upsert_account(&self, account: NewAccount) -> RepositoryResult<Account> {
        self.check_health()?;
        let mut data = self.data.write();
        let now = Utc::now();

        if let Some(&id) = data.username_index.get(&account.username) {
            let existing = data
                .accounts
                .get_mut(&id)
                .ok_or_else(|| RepositoryError::internal("Username index out of sync"))?;
            if account.display_name.is_some() {
                existing.display_name = account.display_name;
            }
            if let Some(count) = account.follower_count {
                existing.follower_count = count;
            }
            existing.last_updated = now;
            return Ok(existing.clone());
        }

        let id = AccountId::new(data.next_account_id);
        data.next_account_id += 1;
        let stored = Account {
            id,
            username: account.username.clone(),
            display_name: account.display_name,
            follower_count: account.follower_count.unwrap_or(0),
            created_at: now,
            last_updated: now,
            last_fetched_at: None,
        };
        data.username_index.insert(account.username, id);
        data.accounts.insert(id, stored.clone());
        Ok(stored)
    }

    async fn get_account(&self, username: &str) -> RepositoryResult<Option<Account>> {
        self.check_health()?;
        let data = self.data.read();
        Ok(data
            .username_index
            .get(username)
            .and_then(|id| data.accounts.get(id))
            .cloned())
    }

    async fn get_all_accounts(&self) -> RepositoryResult<Vec<Account>> {
        self.check_health()?;
        Ok(self.data.read().accounts.values().cloned().collect())
    }

    async fn delete_account(&self, username: &str) -> RepositoryResult<usize> {
        self.check_health()?;
        let mut data = self.data.write();
        let id = data.username_index.remove(username).ok_or_else(|| {
            RepositoryError::not_found(format!("Account @{} not found", username))
        })?;
        data.accounts.remove(&id);
        let before = data.posts.len();
        data.posts.retain(|_, post| post.account_id != id);
        Ok(before - data.posts.len())
    }

    async fn update_account_profile(
        &self,
        account_id: AccountId,
        display_name: Option<String>,
        follower_count: Option<i64>,
        fetched_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        let account = data.accounts.get_mut(&account_id).ok_or_else(|| {
            RepositoryError::not_found(format!("Account {} not found", account_id))
        })?;
        if display_name.is_some() {
            account.display_name = display_name;
        }
        if let Some(count) = follower_count {
            account.follower_count = count;
        }
        account.last_updated = fetched_at;
        account.last_fetched_at = Some(fetched_at);
        Ok(())
    }

    async fn get_posts_by_account(
        &self,
        account_id: AccountId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Vec<Post>> {
        self.check_health()?;
        let data = self.data.read();
        let mut posts: Vec<Post> = data
            .posts
            .values()
            .filter(|post| post.account_id == account_id)
            .filter(|post| start.map_or(true, |s| post.created_at >= s))
            .filter(|post| end.map_or(true, |e| post.created_at <= e))
            .cloned()
            .collect();
        posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(posts)
    }

    async fn bulk_upsert_posts(&self, posts: Vec<NewPost>) -> RepositoryResult<(usize, usize)> {
        self.check_health()?;
        let mut data = self.data.write();
        let now = Utc::now();
        let mut inserted = 0;
        let mut updated = 0;

        for post in posts {
            let post_id = post.post_id.trim();
            if post_id.is_empty() {
                continue;
            }
            if let Some(existing) = data.posts.get_mut(post_id) {
                existing.text = post.text;
                existing.likes = post.likes;
                existing.reshares = post.reshares;
                existing.replies = post.replies;
                existing.views = post.views;
                existing.fetched_at = now;
                updated += 1;
            } else {
                let row_id = data.next_post_row_id;
                data.next_post_row_id += 1;
                data.posts.insert(
                    post_id.to_string(),
                    Post {
                        id: row_id,
                        account_id: post.account_id,
                        post_id: post_id.to_string(),
                        text: post.text,
                        created_at: post.created_at,
                        likes: post.likes,
                        reshares: post.reshares,
                        replies: post.replies,
                        views: post.views,
                        total_engagement: 0.0,
                        outlier_multiplier: 0.0,
                        is_outlier: false,
                        fetched_at: now,
                    },
                );
                inserted += 1;
            }
        }
        Ok((inserted, updated))
    }

    async fn bulk_update_derived_fields(
        &self,
        updates: Vec<PostUpdate>,
    ) -> RepositoryResult<()> {
        self.check_health()?;
        let mut data = self.data.write();
        for update in updates {
            if let Some(post) = data.posts.get_mut(&update.post_id) {
                post.outlier_multiplier = update.outlier_multiplier;
                post.is_outlier = update.is_outlier;
                post.total_engagement = update.total_engagement;
            }
        }
        Ok(())
    }

    async fn get_outlier_posts(
        &self,
        query: OutlierQuery,
    ) -> RepositoryResult<Vec<(Post, Account)>> {
        self.check_health()?;
        let data = self.data.read();
        let cutoff = query.days_back.map(|days| Utc::now() - Duration::days(days));

        let mut matches: Vec<(Post, Account)> = data
            .posts
            .values()
            .filter(|post| !query.outliers_only || post.is_outlier)
            .filter(|post| query.account_id.map_or(true, |id| post.account_id == id))
            .filter(|post| {
                query
                    .min_multiplier
                    .map_or(true, |min| post.outlier_multiplier >= min)
            })
            .filter(|post| {
                query
                    .max_multiplier
                    .map_or(true, |max| post.outlier_multiplier <= max)
            })
            .filter(|post| cutoff.map_or(true, |c| post.created_at >= c))
            .filter_map(|post| {
                data.accounts
                    .get(&post.account_id)
                    .map(|account| (post.clone(), account.clone()))
            })
            .collect();

        sort_posts(&mut matches, query.sort);
        matches.truncate(query.limit);
        Ok(matches)
    }

    async fn get_recent_posts(
        &self,
        account_id: Option<AccountId>,
        days_back: Option<i64>,
        limit: usize,
    ) -> RepositoryResult<Vec<(Post, Account)>> {
        self.check_health()?;
        let data = self.data.read();
        let cutoff = days_back.map(|days| Utc::now() - Duration::days(days));

        let mut matches: Vec<(Post, Account)> = data
            .posts
            .values()
            .filter(|post| account_id.map_or(true, |id| post.account_id == id))
            .filter(|post| cutoff.map_or(true, |c| post.created_at >= c))
            .filter_map(|post| {
                data.accounts
                    .get(&post.account_id)
                    .map(|account| (post.clone(), account.clone()))
            })
            .collect();

        sort_posts(&mut matches, PostSort::Newest);
        matches.truncate(limit);
        Ok(matches)
    }

    async fn count_posts(&self) -> RepositoryResult<usize> {
        self.check_health()?;
        Ok(self.data.read().posts.len())
    }

    async fn count_outliers(&self) -> RepositoryResult<usize> {
        self.check_health()?;
        Ok(self
            .data
            .read()
            .posts
            .values()
            .filter(|post| post.is_outlier)
            .count())
    }
}
