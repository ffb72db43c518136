//! Request and response DTOs for the REST API.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::{Account, AccountSummary, AnalysisResult, Post, PostSort};

/// Response for GET /health.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
}

/// Response for GET /v1/accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountListResponse {
    pub accounts: Vec<AccountSummary>,
    pub total: usize,
}

/// Request body for POST /v1/accounts.
///
/// Accepts a single `username`, a batch of `usernames`, or both.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub usernames: Vec<String>,
    /// Applied to the single `username` only.
    #[serde(default)]
    pub display_name: Option<String>,
    /// Applied to the single `username` only.
    #[serde(default)]
    pub follower_count: Option<i64>,
}

/// Response for POST /v1/accounts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateAccountsResponse {
    pub accounts: Vec<Account>,
    pub total: usize,
}

/// Response for DELETE /v1/accounts/{username}.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    pub username: String,
    pub posts_removed: usize,
}

/// Query parameters for GET /v1/outliers.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OutlierQueryParams {
    /// Restrict to one account by username.
    pub account: Option<String>,
    pub min_multiplier: Option<f64>,
    pub max_multiplier: Option<f64>,
    pub days_back: Option<i64>,
    pub limit: Option<usize>,
    pub sort: Option<PostSort>,
    /// Include posts not flagged as outliers.
    #[serde(default)]
    pub include_all: bool,
}

/// A post joined with its account's username.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostWithAccountDto {
    pub post_id: String,
    pub username: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub reshares: i64,
    pub replies: i64,
    pub views: i64,
    pub total_engagement: f64,
    pub outlier_multiplier: f64,
    pub is_outlier: bool,
}

impl From<(Post, Account)> for PostWithAccountDto {
    fn from((post, account): (Post, Account)) -> Self {
        Self {
            post_id: post.post_id,
            username: account.username,
            text: post.text,
            created_at: post.created_at,
            likes: post.likes,
            reshares: post.reshares,
            replies: post.replies,
            views: post.views,
            total_engagement: post.total_engagement,
            outlier_multiplier: post.outlier_multiplier,
            is_outlier: post.is_outlier,
        }
    }
}

/// Response for GET /v1/outliers and GET /v1/posts/recent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PostListResponse {
    pub posts: Vec<PostWithAccountDto>,
    pub total: usize,
}

/// Response for GET /v1/stats.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    pub accounts: usize,
    pub posts: usize,
    pub outliers: usize,
}

/// Request body for POST /v1/analyze.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalyzeRequest {
    /// Analyze a single account; omit to analyze the whole fleet.
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub months_back: Option<u32>,
    #[serde(default)]
    pub threshold: Option<f64>,
}

/// Response for POST /v1/analyze.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeResponse {
    pub results: Vec<AnalysisResult>,
    pub accounts_analyzed: usize,
    pub total_outliers: usize,
}

/// Query parameters for GET /v1/posts/recent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RecentPostsParams {
    pub account: Option<String>,
    pub days_back: Option<i64>,
    pub limit: Option<usize>,
}
