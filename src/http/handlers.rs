//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Path, Query, State},
    Json,
};

use super::dto::{
    AccountListResponse, AnalyzeRequest, AnalyzeResponse, CreateAccountRequest,
    CreateAccountsResponse, DeleteAccountResponse, HealthResponse, OutlierQueryParams,
    PostListResponse, PostWithAccountDto, RecentPostsParams, StatsResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::api::{Account, AccountSummary, AnalyzerConfig, NewAccount, OutlierQuery};
use crate::services::analyzer;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

const DEFAULT_LIST_LIMIT: usize = 100;
const MAX_LIST_LIMIT: usize = 1000;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and the store is
/// accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match state.repository.health_check().await {
        Ok(true) => "connected".to_string(),
        Ok(false) => "disconnected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Account CRUD
// =============================================================================

/// GET /v1/accounts
///
/// List all monitored accounts with per-account post and outlier counts.
pub async fn list_accounts(State(state): State<AppState>) -> HandlerResult<AccountListResponse> {
    let accounts = state.repository.get_all_accounts().await?;

    let mut summaries = Vec::with_capacity(accounts.len());
    for account in accounts {
        let posts = state
            .repository
            .get_posts_by_account(account.id, None, None)
            .await?;
        let outlier_count = posts.iter().filter(|p| p.is_outlier).count();

        summaries.push(AccountSummary {
            id: account.id,
            username: account.username,
            display_name: account.display_name,
            follower_count: account.follower_count,
            post_count: posts.len(),
            outlier_count,
            last_fetched_at: account.last_fetched_at,
        });
    }

    let total = summaries.len();
    Ok(Json(AccountListResponse {
        accounts: summaries,
        total,
    }))
}

/// POST /v1/accounts
///
/// Add one or more accounts to the watchlist. Re-posting an existing
/// username refreshes its profile fields.
pub async fn create_accounts(
    State(state): State<AppState>,
    Json(request): Json<CreateAccountRequest>,
) -> Result<(axum::http::StatusCode, Json<CreateAccountsResponse>), AppError> {
    let mut new_accounts = Vec::new();

    if let Some(username) = request.username {
        let username = normalize_username(&username)?;
        new_accounts.push(NewAccount {
            username,
            display_name: request.display_name,
            follower_count: request.follower_count,
        });
    }
    for username in request.usernames {
        new_accounts.push(NewAccount::new(normalize_username(&username)?));
    }

    if new_accounts.is_empty() {
        return Err(AppError::BadRequest(
            "request must contain 'username' or 'usernames'".to_string(),
        ));
    }

    let mut accounts = Vec::with_capacity(new_accounts.len());
    for new_account in new_accounts {
        accounts.push(state.repository.upsert_account(new_account).await?);
    }

    let total = accounts.len();
    Ok((
        axum::http::StatusCode::CREATED,
        Json(CreateAccountsResponse { accounts, total }),
    ))
}

fn normalize_username(raw: &str) -> Result<String, AppError> {
    let username = raw.trim().trim_start_matches('@').to_string();
    if username.is_empty() {
        return Err(AppError::BadRequest("username must not be empty".to_string()));
    }
    Ok(username)
}

/// DELETE /v1/accounts/{username}
///
/// Remove an account and all of its posts.
pub async fn delete_account(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> HandlerResult<DeleteAccountResponse> {
    let posts_removed = state.repository.delete_account(&username).await?;

    Ok(Json(DeleteAccountResponse {
        username,
        posts_removed,
    }))
}

// =============================================================================
// Posts and Outliers
// =============================================================================

/// GET /v1/outliers
///
/// List flagged posts across all accounts, highest multiplier first by
/// default.
pub async fn get_outliers(
    State(state): State<AppState>,
    Query(params): Query<OutlierQueryParams>,
) -> HandlerResult<PostListResponse> {
    let account_id = match params.account {
        Some(username) => Some(resolve_account(&state, &username).await?.id),
        None => None,
    };

    let query = OutlierQuery {
        account_id,
        min_multiplier: params.min_multiplier,
        max_multiplier: params.max_multiplier,
        days_back: params.days_back,
        limit: clamp_limit(params.limit),
        sort: params.sort.unwrap_or_default(),
        outliers_only: !params.include_all,
    };

    let posts = state.repository.get_outlier_posts(query).await?;
    let posts: Vec<PostWithAccountDto> = posts.into_iter().map(Into::into).collect();
    let total = posts.len();

    Ok(Json(PostListResponse { posts, total }))
}

/// GET /v1/posts/recent
///
/// List the most recent posts, optionally filtered to one account.
pub async fn get_recent_posts(
    State(state): State<AppState>,
    Query(params): Query<RecentPostsParams>,
) -> HandlerResult<PostListResponse> {
    let account_id = match params.account {
        Some(username) => Some(resolve_account(&state, &username).await?.id),
        None => None,
    };

    let posts = state
        .repository
        .get_recent_posts(account_id, params.days_back, clamp_limit(params.limit))
        .await?;
    let posts: Vec<PostWithAccountDto> = posts.into_iter().map(Into::into).collect();
    let total = posts.len();

    Ok(Json(PostListResponse { posts, total }))
}

/// GET /v1/stats
///
/// Aggregate store counts.
pub async fn get_stats(State(state): State<AppState>) -> HandlerResult<StatsResponse> {
    let accounts = state.repository.get_all_accounts().await?.len();
    let posts = state.repository.count_posts().await?;
    let outliers = state.repository.count_outliers().await?;

    Ok(Json(StatsResponse {
        accounts,
        posts,
        outliers,
    }))
}

// =============================================================================
// Analysis
// =============================================================================

/// POST /v1/analyze
///
/// Run outlier analysis for one account, or the whole fleet when no
/// username is given.
pub async fn run_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalyzeRequest>,
) -> HandlerResult<AnalyzeResponse> {
    let mut config = AnalyzerConfig::default();
    if let Some(months_back) = request.months_back {
        if months_back == 0 {
            return Err(AppError::BadRequest("months_back must be positive".to_string()));
        }
        config = config.with_months_back(months_back);
    }
    if let Some(threshold) = request.threshold {
        if !threshold.is_finite() || threshold <= 0.0 {
            return Err(AppError::BadRequest(
                "threshold must be a positive number".to_string(),
            ));
        }
        config = config.with_threshold(threshold);
    }

    let results = match request.username {
        Some(username) => {
            let account = resolve_account(&state, &username).await?;
            let mut result =
                analyzer::analyze_account(state.repository.as_ref(), account.id, &config).await?;
            result.username = Some(account.username);
            vec![result]
        }
        None => analyzer::analyze_all_accounts(state.repository.as_ref(), &config).await?,
    };

    let total_outliers = results.iter().map(|r| r.outlier_count).sum();
    Ok(Json(AnalyzeResponse {
        accounts_analyzed: results.len(),
        total_outliers,
        results,
    }))
}

async fn resolve_account(state: &AppState, username: &str) -> Result<Account, AppError> {
    let username = username.trim().trim_start_matches('@');
    state
        .repository
        .get_account(username)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Account @{} not found", username)))
}

fn clamp_limit(limit: Option<usize>) -> usize {
    limit.unwrap_or(DEFAULT_LIST_LIMIT).min(MAX_LIST_LIMIT)
}
