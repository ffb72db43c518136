//! Postgres repository implementation using Diesel.
//!
//! This module implements [`MetricsRepository`] against a Postgres database.
//!
//! ## Features
//!
//! - Connection pooling with r2d2
//! - Automatic retry for transient failures
//! - Connection health monitoring
//! - Automatic migration execution
//!
//! ## Configuration
//!
//! Environment variables:
//! - `DATABASE_URL` or `PG_DATABASE_URL`: Connection string (required)
//! - `PG_POOL_MAX`: Maximum pool size (default: 10)
//! - `PG_POOL_MIN`: Minimum pool size (default: 1)
//! - `PG_CONN_TIMEOUT_SEC`: Connection timeout in seconds (default: 30)
//! - `PG_IDLE_TIMEOUT_SEC`: Idle connection timeout in seconds (default: 600)
//! - `PG_MAX_RETRIES`: Maximum retry attempts for transient failures (default: 3)
//! - `PG_RETRY_DELAY_MS`: Initial retry delay in milliseconds (default: 100)

use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::upsert::excluded;
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task;

use crate::api::{
    Account, AccountId, NewAccount, NewPost, OutlierQuery, Post, PostSort, PostUpdate,
};
use crate::db::repository::{
    ErrorContext, MetricsRepository, RepositoryError, RepositoryResult,
};

mod models;
mod schema;

use models::{AccountRow, NewAccountRow, NewPostRow, PostRow};
use schema::{accounts, posts};

type PgPool = Pool<ConnectionManager<PgConnection>>;

const MIGRATIONS: EmbeddedMigrations = embed_migrations!("src/db/repositories/postgres/migrations");

/// Configuration for connecting to Postgres.
#[derive(Debug, Clone)]
pub struct PostgresConfig {
    /// Database connection URL
    pub database_url: String,
    /// Maximum number of connections in the pool
    pub max_pool_size: u32,
    /// Minimum number of connections in the pool
    pub min_pool_size: u32,
    /// Connection timeout in seconds
    pub connection_timeout_sec: u64,
    /// Idle connection timeout in seconds
    pub idle_timeout_sec: u64,
    /// Maximum number of retry attempts for transient failures
    pub max_retries: u32,
    /// Initial retry delay in milliseconds (doubles with each retry)
    pub retry_delay_ms: u64,
}

impl Default for PostgresConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            max_pool_size: 10,
            min_pool_size: 1,
            connection_timeout_sec: 30,
            idle_timeout_sec: 600,
            max_retries: 3,
            retry_delay_ms: 100,
        }
    }
}

impl PostgresConfig {
    /// Create configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let database_url = std::env::var("DATABASE_URL")
            .or_else(|_| std::env::var("PG_DATABASE_URL"))
            .map_err(|_| "DATABASE_URL or PG_DATABASE_URL must be set".to_string())?;

        let parse_var = |name: &str, default: u64| {
            std::env::var(name)
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(default)
        };

        Ok(Self {
            database_url,
            max_pool_size: parse_var("PG_POOL_MAX", 10) as u32,
            min_pool_size: parse_var("PG_POOL_MIN", 1) as u32,
            connection_timeout_sec: parse_var("PG_CONN_TIMEOUT_SEC", 30),
            idle_timeout_sec: parse_var("PG_IDLE_TIMEOUT_SEC", 600),
            max_retries: parse_var("PG_MAX_RETRIES", 3) as u32,
            retry_delay_ms: parse_var("PG_RETRY_DELAY_MS", 100),
        })
    }

    /// Create a new configuration with a database URL.
    pub fn with_url(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            ..Default::default()
        }
    }
}

/// Pool health statistics.
#[derive(Debug, Clone, Default)]
pub struct PoolStats {
    /// Number of connections currently in use
    pub connections_in_use: u32,
    /// Number of idle connections
    pub idle_connections: u32,
    /// Total number of connections in the pool
    pub total_connections: u32,
    /// Maximum pool size
    pub max_size: u32,
    /// Total successful queries executed
    pub total_queries: u64,
    /// Total failed queries
    pub failed_queries: u64,
    /// Total retried operations
    pub retried_operations: u64,
}

/// Diesel-backed repository for Postgres.
#[derive(Clone)]
pub struct PostgresRepository {
    pool: PgPool,
    config: PostgresConfig,
    total_queries: Arc<AtomicU64>,
    failed_queries: Arc<AtomicU64>,
    retried_operations: Arc<AtomicU64>,
}

impl PostgresRepository {
    /// Create a new repository and run pending migrations.
    pub fn new(config: PostgresConfig) -> RepositoryResult<Self> {
        let manager = ConnectionManager::<PgConnection>::new(&config.database_url);

        let pool = Pool::builder()
            .max_size(config.max_pool_size)
            .min_idle(Some(config.min_pool_size))
            .connection_timeout(Duration::from_secs(config.connection_timeout_sec))
            .idle_timeout(Some(Duration::from_secs(config.idle_timeout_sec)))
            .test_on_check_out(true)
            .build(manager)
            .map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("create_pool")
                        .with_details(format!("max_size={}", config.max_pool_size)),
                )
            })?;

        {
            let mut conn = pool.get().map_err(|e| {
                RepositoryError::connection_with_context(
                    e.to_string(),
                    ErrorContext::new("get_connection_for_migrations"),
                )
            })?;
            Self::run_migrations(&mut conn)?;
        }

        Ok(Self {
            pool,
            config,
            total_queries: Arc::new(AtomicU64::new(0)),
            failed_queries: Arc::new(AtomicU64::new(0)),
            retried_operations: Arc::new(AtomicU64::new(0)),
        })
    }

    fn run_migrations(conn: &mut PgConnection) -> RepositoryResult<()> {
        conn.run_pending_migrations(MIGRATIONS).map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Migration failed: {}", e),
                ErrorContext::new("run_migrations"),
            )
        })?;
        Ok(())
    }

    /// Execute a database operation with automatic retry for transient
    /// failures (connection errors, timeouts, serialization failures).
    async fn with_conn<T, F>(&self, f: F) -> RepositoryResult<T>
    where
        T: Send + 'static,
        F: FnOnce(&mut PgConnection) -> RepositoryResult<T> + Send + 'static + Clone,
    {
        let pool = self.pool.clone();
        let max_retries = self.config.max_retries;
        let retry_delay_ms = self.config.retry_delay_ms;
        let total_queries = self.total_queries.clone();
        let failed_queries = self.failed_queries.clone();
        let retried_operations = self.retried_operations.clone();

        task::spawn_blocking(move || {
            let mut last_error = None;
            let mut retry_delay = Duration::from_millis(retry_delay_ms);

            for attempt in 0..=max_retries {
                if attempt > 0 {
                    retried_operations.fetch_add(1, Ordering::Relaxed);
                    std::thread::sleep(retry_delay);
                    retry_delay *= 2;
                }

                let mut conn = match pool.get() {
                    Ok(c) => c,
                    Err(e) => {
                        let err = RepositoryError::connection_with_context(
                            e.to_string(),
                            ErrorContext::new("get_connection")
                                .with_details(format!("attempt={}", attempt + 1))
                                .retryable(),
                        );
                        if attempt < max_retries {
                            last_error = Some(err);
                            continue;
                        }
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(err);
                    }
                };

                total_queries.fetch_add(1, Ordering::Relaxed);
                match f.clone()(&mut conn) {
                    Ok(result) => return Ok(result),
                    Err(e) if e.is_retryable() && attempt < max_retries => {
                        last_error = Some(e);
                        continue;
                    }
                    Err(e) => {
                        failed_queries.fetch_add(1, Ordering::Relaxed);
                        return Err(e);
                    }
                }
            }

            failed_queries.fetch_add(1, Ordering::Relaxed);
            Err(last_error.unwrap_or_else(|| {
                RepositoryError::internal("Max retries exceeded with no error captured")
            }))
        })
        .await
        .map_err(|e| {
            RepositoryError::internal_with_context(
                format!("Task join error: {}", e),
                ErrorContext::new("spawn_blocking"),
            )
        })?
    }

    /// Get pool health statistics.
    pub fn get_pool_stats(&self) -> PoolStats {
        let state = self.pool.state();
        PoolStats {
            connections_in_use: state.connections - state.idle_connections,
            idle_connections: state.idle_connections,
            total_connections: state.connections,
            max_size: self.config.max_pool_size,
            total_queries: self.total_queries.load(Ordering::Relaxed),
            failed_queries: self.failed_queries.load(Ordering::Relaxed),
            retried_operations: self.retried_operations.load(Ordering::Relaxed),
        }
    }
}

#[async_trait]
impl MetricsRepository for PostgresRepository {
    async fn health_check(&self) -> RepositoryResult<bool> {
        self.with_conn(|conn| {
            diesel::sql_query("SELECT 1")
                .execute(conn)
                .map(|_| true)
                .map_err(RepositoryError::from)
        })
        .await
    }

    async fn upsert_account(&self, account: NewAccount) -> RepositoryResult<Account> {
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                let existing: Option<AccountRow> = accounts::table
                    .filter(accounts::username.eq(&account.username))
                    .first(conn)
                    .optional()?;

                let row: AccountRow = match existing {
                    Some(row) => diesel::update(accounts::table.find(row.id))
                        .set((
                            accounts::display_name
                                .eq(account.display_name.clone().or(row.display_name)),
                            accounts::follower_count
                                .eq(account.follower_count.unwrap_or(row.follower_count)),
                            accounts::last_updated.eq(Utc::now()),
                        ))
                        .get_result(conn)?,
                    None => {
                        let now = Utc::now();
                        diesel::insert_into(accounts::table)
                            .values(NewAccountRow {
                                username: account.username.clone(),
                                display_name: account.display_name.clone(),
                                follower_count: account.follower_count.unwrap_or(0),
                                created_at: now,
                                last_updated: now,
                            })
                            .get_result(conn)?
                    }
                };
                Ok(row.into())
            })
        })
        .await
    }

    async fn get_account(&self, username: &str) -> RepositoryResult<Option<Account>> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            let row: Option<AccountRow> = accounts::table
                .filter(accounts::username.eq(&username))
                .first(conn)
                .optional()?;
            Ok(row.map(Into::into))
        })
        .await
    }

    async fn get_all_accounts(&self) -> RepositoryResult<Vec<Account>> {
        self.with_conn(|conn| {
            let rows: Vec<AccountRow> = accounts::table.load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn delete_account(&self, username: &str) -> RepositoryResult<usize> {
        let username = username.to_string();
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                let row: Option<AccountRow> = accounts::table
                    .filter(accounts::username.eq(&username))
                    .first(conn)
                    .optional()?;
                let row = row.ok_or_else(|| {
                    RepositoryError::not_found_with_context(
                        format!("Account @{} not found", username),
                        ErrorContext::new("delete_account").with_entity("account"),
                    )
                })?;

                let post_count: i64 = posts::table
                    .filter(posts::account_id.eq(row.id))
                    .count()
                    .get_result(conn)?;

                // Posts cascade on account deletion.
                diesel::delete(accounts::table.find(row.id)).execute(conn)?;
                Ok(post_count as usize)
            })
        })
        .await
    }

    async fn update_account_profile(
        &self,
        account_id: AccountId,
        display_name: Option<String>,
        follower_count: Option<i64>,
        fetched_at: DateTime<Utc>,
    ) -> RepositoryResult<()> {
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                let row: AccountRow =
                    accounts::table.find(account_id.value()).first(conn)?;
                diesel::update(accounts::table.find(account_id.value()))
                    .set((
                        accounts::display_name.eq(display_name.clone().or(row.display_name)),
                        accounts::follower_count
                            .eq(follower_count.unwrap_or(row.follower_count)),
                        accounts::last_updated.eq(fetched_at),
                        accounts::last_fetched_at.eq(Some(fetched_at)),
                    ))
                    .execute(conn)?;
                Ok(())
            })
        })
        .await
    }

    async fn get_posts_by_account(
        &self,
        account_id: AccountId,
        start: Option<DateTime<Utc>>,
        end: Option<DateTime<Utc>>,
    ) -> RepositoryResult<Vec<Post>> {
        self.with_conn(move |conn| {
            let mut query = posts::table
                .filter(posts::account_id.eq(account_id.value()))
                .into_boxed();
            if let Some(start) = start {
                query = query.filter(posts::created_at.ge(start));
            }
            if let Some(end) = end {
                query = query.filter(posts::created_at.le(end));
            }
            let rows: Vec<PostRow> = query.order(posts::created_at.desc()).load(conn)?;
            Ok(rows.into_iter().map(Into::into).collect())
        })
        .await
    }

    async fn bulk_upsert_posts(&self, new_posts: Vec<NewPost>) -> RepositoryResult<(usize, usize)> {
        if new_posts.is_empty() {
            return Ok((0, 0));
        }
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                let now = Utc::now();
                let rows: Vec<NewPostRow> = new_posts
                    .iter()
                    .filter(|p| !p.post_id.trim().is_empty())
                    .map(|p| NewPostRow {
                        account_id: p.account_id.value(),
                        post_id: p.post_id.trim().to_string(),
                        body: p.text.clone(),
                        created_at: p.created_at,
                        likes: p.likes,
                        reshares: p.reshares,
                        replies: p.replies,
                        views: p.views,
                        fetched_at: now,
                    })
                    .collect();

                if rows.is_empty() {
                    return Ok((0, 0));
                }

                let ids: Vec<&str> = rows.iter().map(|r| r.post_id.as_str()).collect();
                let existing: HashSet<String> = posts::table
                    .filter(posts::post_id.eq_any(&ids))
                    .select(posts::post_id)
                    .load::<String>(conn)?
                    .into_iter()
                    .collect();
                let updated = rows
                    .iter()
                    .filter(|r| existing.contains(&r.post_id))
                    .count();
                let inserted = rows.len() - updated;

                // Counter refresh leaves the derived analysis fields untouched.
                diesel::insert_into(posts::table)
                    .values(&rows)
                    .on_conflict(posts::post_id)
                    .do_update()
                    .set((
                        posts::body.eq(excluded(posts::body)),
                        posts::likes.eq(excluded(posts::likes)),
                        posts::reshares.eq(excluded(posts::reshares)),
                        posts::replies.eq(excluded(posts::replies)),
                        posts::views.eq(excluded(posts::views)),
                        posts::fetched_at.eq(excluded(posts::fetched_at)),
                    ))
                    .execute(conn)?;

                Ok((inserted, updated))
            })
        })
        .await
    }

    async fn bulk_update_derived_fields(
        &self,
        updates: Vec<PostUpdate>,
    ) -> RepositoryResult<()> {
        if updates.is_empty() {
            return Ok(());
        }
        self.with_conn(move |conn| {
            conn.transaction(|conn| {
                for update in &updates {
                    diesel::update(posts::table.filter(posts::post_id.eq(&update.post_id)))
                        .set((
                            posts::outlier_multiplier.eq(update.outlier_multiplier),
                            posts::is_outlier.eq(update.is_outlier),
                            posts::total_engagement.eq(update.total_engagement),
                        ))
                        .execute(conn)?;
                }
                Ok(())
            })
        })
        .await
    }

    async fn get_outlier_posts(
        &self,
        query: OutlierQuery,
    ) -> RepositoryResult<Vec<(Post, Account)>> {
        self.with_conn(move |conn| {
            let mut q = posts::table.inner_join(accounts::table).into_boxed();

            if query.outliers_only {
                q = q.filter(posts::is_outlier.eq(true));
            }
            if let Some(account_id) = query.account_id {
                q = q.filter(posts::account_id.eq(account_id.value()));
            }
            if let Some(min) = query.min_multiplier {
                q = q.filter(posts::outlier_multiplier.ge(min));
            }
            if let Some(max) = query.max_multiplier {
                q = q.filter(posts::outlier_multiplier.le(max));
            }
            if let Some(days) = query.days_back {
                q = q.filter(posts::created_at.ge(Utc::now() - ChronoDuration::days(days)));
            }

            q = match query.sort {
                PostSort::Multiplier => q.order(posts::outlier_multiplier.desc()),
                PostSort::Newest => q.order(posts::created_at.desc()),
            };

            let rows: Vec<(PostRow, AccountRow)> = q.limit(query.limit as i64).load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(post, account)| (post.into(), account.into()))
                .collect())
        })
        .await
    }

    async fn get_recent_posts(
        &self,
        account_id: Option<AccountId>,
        days_back: Option<i64>,
        limit: usize,
    ) -> RepositoryResult<Vec<(Post, Account)>> {
        self.with_conn(move |conn| {
            let mut q = posts::table.inner_join(accounts::table).into_boxed();
            if let Some(account_id) = account_id {
                q = q.filter(posts::account_id.eq(account_id.value()));
            }
            if let Some(days) = days_back {
                q = q.filter(posts::created_at.ge(Utc::now() - ChronoDuration::days(days)));
            }
            let rows: Vec<(PostRow, AccountRow)> = q
                .order(posts::created_at.desc())
                .limit(limit as i64)
                .load(conn)?;
            Ok(rows
                .into_iter()
                .map(|(post, account)| (post.into(), account.into()))
                .collect())
        })
        .await
    }

    async fn count_posts(&self) -> RepositoryResult<usize> {
        self.with_conn(|conn| {
            let count: i64 = posts::table.count().get_result(conn)?;
            Ok(count as usize)
        })
        .await
    }

    async fn count_outliers(&self) -> RepositoryResult<usize> {
        self.with_conn(|conn| {
            let count: i64 = posts::table
                .filter(posts::is_outlier.eq(true))
                .count()
                .get_result(conn)?;
            Ok(count as usize)
        })
        .await
    }
}
