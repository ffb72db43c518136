//! Diesel row types for the Postgres repository and conversions to the
//! domain types in [`crate::api`].

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::{accounts, posts};
use crate::api::{Account, AccountId, Post};

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = accounts)]
pub struct AccountRow {
    pub id: i64,
    pub username: String,
    pub display_name: Option<String>,
    pub follower_count: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

impl From<AccountRow> for Account {
    fn from(row: AccountRow) -> Self {
        Account {
            id: AccountId::new(row.id),
            username: row.username,
            display_name: row.display_name,
            follower_count: row.follower_count,
            created_at: row.created_at,
            last_updated: row.last_updated,
            last_fetched_at: row.last_fetched_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccountRow {
    pub username: String,
    pub display_name: Option<String>,
    pub follower_count: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Queryable, Identifiable)]
#[diesel(table_name = posts)]
pub struct PostRow {
    pub id: i64,
    pub account_id: i64,
    pub post_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub reshares: i64,
    pub replies: i64,
    pub views: i64,
    pub total_engagement: f64,
    pub outlier_multiplier: f64,
    pub is_outlier: bool,
    pub fetched_at: DateTime<Utc>,
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.id,
            account_id: AccountId::new(row.account_id),
            post_id: row.post_id,
            text: row.body,
            created_at: row.created_at,
            likes: row.likes,
            reshares: row.reshares,
            replies: row.replies,
            views: row.views,
            total_engagement: row.total_engagement,
            outlier_multiplier: row.outlier_multiplier,
            is_outlier: row.is_outlier,
            fetched_at: row.fetched_at,
        }
    }
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = posts)]
pub struct NewPostRow {
    pub account_id: i64,
    pub post_id: String,
    pub body: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub reshares: i64,
    pub replies: i64,
    pub views: i64,
    pub fetched_at: DateTime<Utc>,
}
