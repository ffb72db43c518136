//! Public API surface for the backend.
//!
//! This file consolidates the domain and DTO types shared across the storage,
//! service and HTTP layers. All types derive Serialize/Deserialize for JSON
//! serialization.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Account identifier (database primary key).
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct AccountId(pub i64);

impl AccountId {
    pub fn new(value: i64) -> Self {
        AccountId(value)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl std::fmt::Display for AccountId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<AccountId> for i64 {
    fn from(id: AccountId) -> Self {
        id.0
    }
}

/// Weighting coefficients for the engagement score.
///
/// Replies carry the highest weight (highest-intent engagement), views the
/// lowest; views are additionally down-scaled by 1000 before weighting so raw
/// reach does not dominate the score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngagementWeights {
    pub likes: f64,
    pub reshares: f64,
    pub replies: f64,
    pub views: f64,
}

impl Default for EngagementWeights {
    fn default() -> Self {
        Self {
            likes: 1.0,
            reshares: 2.0,
            replies: 3.0,
            views: 0.1,
        }
    }
}

/// Immutable configuration for an analysis run.
///
/// Passed explicitly into every analyzer call so tests can inject alternate
/// weight tables without touching shared state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Trailing window length, approximated as `months_back * 30` days.
    pub months_back: u32,
    /// Minimum multiplier for a post to be flagged as an outlier.
    pub threshold: f64,
    /// Engagement score weights.
    pub weights: EngagementWeights,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            months_back: 3,
            threshold: 2.0,
            weights: EngagementWeights::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn with_months_back(mut self, months_back: u32) -> Self {
        self.months_back = months_back;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_weights(mut self, weights: EngagementWeights) -> Self {
        self.weights = weights;
        self
    }
}

/// A monitored account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    /// Unique handle, stored without the leading `@`.
    pub username: String,
    pub display_name: Option<String>,
    pub follower_count: i64,
    pub created_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    /// When posts were last fetched from the metrics source, if ever.
    pub last_fetched_at: Option<DateTime<Utc>>,
}

/// Account data for insertion or update.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub display_name: Option<String>,
    pub follower_count: Option<i64>,
}

impl NewAccount {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Default::default()
        }
    }
}

/// A stored post with raw counters and analysis-derived fields.
///
/// The derived fields (`total_engagement`, `outlier_multiplier`, `is_outlier`)
/// are owned by the analyzer and overwritten on every analysis run; they are
/// zero/false until the first run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub account_id: AccountId,
    /// Platform-assigned identifier, unique and stable.
    pub post_id: String,
    pub text: String,
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

/// Post data for insertion or counter refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewPost {
    pub account_id: AccountId,
    pub post_id: String,
    pub text: String,
    pub created_at: DateTime<Utc>,
    pub likes: i64,
    pub reshares: i64,
    pub replies: i64,
    pub views: i64,
}

/// Derived-field update for a single post, applied in bulk after analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostUpdate {
    pub post_id: String,
    pub outlier_multiplier: f64,
    pub is_outlier: bool,
    pub total_engagement: f64,
}

/// An account's historical engagement baseline over a post window.
///
/// Ephemeral: computed per analysis call and discarded afterwards, never
/// persisted or cached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountBaseline {
    pub mean_engagement: f64,
    pub median_engagement: f64,
    pub mean_likes: f64,
    pub mean_reshares: f64,
    pub mean_replies: f64,
    pub mean_views: f64,
    pub post_count: usize,
}

/// A flagged post in an analysis result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierPost {
    pub post_id: String,
    /// Post body truncated to 100 characters, with `...` appended when cut.
    pub text_preview: String,
    pub multiplier: f64,
    pub likes: i64,
    pub reshares: i64,
    pub replies: i64,
    pub views: i64,
    pub created_at: DateTime<Utc>,
}

/// Result of analyzing one account's post window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub account_id: AccountId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Absent when the account had no posts in the window.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<AccountBaseline>,
    /// Flagged posts, sorted by multiplier descending.
    pub outliers: Vec<OutlierPost>,
    pub total_posts: usize,
    pub outlier_count: usize,
    /// "No data" marker or an isolated per-account failure message.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl AnalysisResult {
    /// Result for an account with no posts in the requested window.
    pub fn no_data(account_id: AccountId) -> Self {
        Self {
            account_id,
            username: None,
            baseline: None,
            outliers: Vec::new(),
            total_posts: 0,
            outlier_count: 0,
            error: Some("No posts found for this account".to_string()),
        }
    }
}

/// Sort order for post listing queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostSort {
    /// Highest outlier multiplier first.
    #[default]
    Multiplier,
    /// Newest post first.
    Newest,
}

/// Filter for outlier/post listing queries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutlierQuery {
    pub account_id: Option<AccountId>,
    pub min_multiplier: Option<f64>,
    pub max_multiplier: Option<f64>,
    /// Only posts created within the last N days.
    pub days_back: Option<i64>,
    pub limit: usize,
    pub sort: PostSort,
    /// When true, only posts flagged by the last analysis run are returned.
    pub outliers_only: bool,
}

impl Default for OutlierQuery {
    fn default() -> Self {
        Self {
            account_id: None,
            min_multiplier: None,
            max_multiplier: None,
            days_back: None,
            limit: 100,
            sort: PostSort::Multiplier,
            outliers_only: true,
        }
    }
}

/// Lightweight account listing entry with aggregate counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccountSummary {
    pub id: AccountId,
    pub username: String,
    pub display_name: Option<String>,
    pub follower_count: i64,
    pub post_count: usize,
    pub outlier_count: usize,
    pub last_fetched_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
#[path = "api_tests.rs"]
mod api_tests;
