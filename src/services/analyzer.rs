//! Outlier analysis orchestration.
//!
//! `analyze_account` runs the full pipeline for one account: fetch the post
//! window, compute the baseline, score and classify every post, persist the
//! derived fields in a single bulk write, and report the flagged posts.
//! `analyze_all_accounts` runs it across the whole fleet.

use chrono::{Duration, Utc};
use log::{debug, info, warn};

use crate::api::{
    AccountId, AnalysisResult, AnalyzerConfig, OutlierPost, PostUpdate,
};
use crate::db::{MetricsRepository, RepositoryResult};

use super::baseline::compute_baseline;
use super::classifier::{is_outlier, outlier_multiplier};
use super::scoring::post_score;

const PREVIEW_CHARS: usize = 100;

/// Analyze a single account's post window.
///
/// Every post in the window gets fresh derived fields (score, multiplier,
/// outlier flag), written back in one bulk update so a run is atomic from
/// the store's point of view. Re-running with unchanged counters is a
/// no-op on the stored values.
///
/// An account with no posts in the window yields a no-data result rather
/// than an error.
pub async fn analyze_account(
    repo: &dyn MetricsRepository,
    account_id: AccountId,
    config: &AnalyzerConfig,
) -> RepositoryResult<AnalysisResult> {
    let window_start = Utc::now() - Duration::days(config.months_back as i64 * 30);

    let posts = repo
        .get_posts_by_account(account_id, Some(window_start), None)
        .await?;

    if posts.is_empty() {
        debug!("account {}: no posts in window", account_id);
        return Ok(AnalysisResult::no_data(account_id));
    }

    let baseline = compute_baseline(&posts, &config.weights);

    let mut updates = Vec::with_capacity(posts.len());
    let mut outliers = Vec::new();

    for post in &posts {
        let score = post_score(post, &config.weights);
        let multiplier = outlier_multiplier(score, baseline.as_ref());
        let flagged = is_outlier(multiplier, config.threshold);

        updates.push(PostUpdate {
            post_id: post.post_id.clone(),
            outlier_multiplier: multiplier,
            is_outlier: flagged,
            total_engagement: score,
        });

        if flagged {
            outliers.push(OutlierPost {
                post_id: post.post_id.clone(),
                text_preview: text_preview(&post.text),
                multiplier,
                likes: post.likes,
                reshares: post.reshares,
                replies: post.replies,
                views: post.views,
                created_at: post.created_at,
            });
        }
    }

    repo.bulk_update_derived_fields(updates).await?;

    outliers.sort_by(|a, b| {
        b.multiplier
            .partial_cmp(&a.multiplier)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    info!(
        "account {}: {} posts analyzed, {} outliers",
        account_id,
        posts.len(),
        outliers.len()
    );

    Ok(AnalysisResult {
        account_id,
        username: None,
        baseline,
        outlier_count: outliers.len(),
        total_posts: posts.len(),
        outliers,
        error: None,
    })
}

/// Analyze every stored account sequentially.
///
/// A failure for one account is recorded in that account's result and does
/// not abort the rest of the run.
pub async fn analyze_all_accounts(
    repo: &dyn MetricsRepository,
    config: &AnalyzerConfig,
) -> RepositoryResult<Vec<AnalysisResult>> {
    let accounts = repo.get_all_accounts().await?;
    let mut results = Vec::with_capacity(accounts.len());

    for account in accounts {
        let mut result = match analyze_account(repo, account.id, config).await {
            Ok(result) => result,
            Err(e) => {
                warn!("account @{}: analysis failed: {}", account.username, e);
                AnalysisResult {
                    error: Some(e.to_string()),
                    ..AnalysisResult::no_data(account.id)
                }
            }
        };
        result.username = Some(account.username);
        results.push(result);
    }

    Ok(results)
}

/// Truncate a post body to the preview length, appending `...` when cut.
fn text_preview(text: &str) -> String {
    if text.chars().count() <= PREVIEW_CHARS {
        return text.to_string();
    }
    let mut preview: String = text.chars().take(PREVIEW_CHARS).collect();
    preview.push_str("...");
    preview
}
