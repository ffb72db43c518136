//! Bulk account import from CSV and plain-text files.
//!
//! CSV files need a header row; the username column is configurable and
//! `display_name` / `follower_count` columns are picked up when present.
//! Plain-text files carry one username per line, with `#` comment lines
//! ignored. Bad rows are collected as errors without aborting the import.

use std::path::Path;

use anyhow::{bail, Context, Result};
use log::{info, warn};
use tokio::fs;

use crate::api::NewAccount;
use crate::db::MetricsRepository;

/// Options for CSV imports.
#[derive(Debug, Clone)]
pub struct ImportOptions {
    /// Header name of the column holding usernames.
    pub username_column: String,
}

impl Default for ImportOptions {
    fn default() -> Self {
        Self {
            username_column: "username".to_string(),
        }
    }
}

/// Outcome of an import run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    /// Accounts successfully upserted.
    pub imported: usize,
    /// Per-row error messages, each prefixed with its row number.
    pub errors: Vec<String>,
}

/// Import accounts from a file, dispatching on the extension.
///
/// `.csv` files go through the CSV importer with default options; anything
/// else is treated as a plain-text username list.
pub async fn import_accounts_from_file(
    repo: &dyn MetricsRepository,
    path: impl AsRef<Path>,
) -> Result<ImportReport> {
    let path = path.as_ref();
    let is_csv = path
        .extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("csv"));

    if is_csv {
        import_accounts_from_csv(repo, path, &ImportOptions::default()).await
    } else {
        import_accounts_from_txt(repo, path).await
    }
}

/// Import accounts from a CSV file with a header row.
pub async fn import_accounts_from_csv(
    repo: &dyn MetricsRepository,
    path: impl AsRef<Path>,
    options: &ImportOptions,
) -> Result<ImportReport> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut lines = content.lines().enumerate();

    let header = match lines.next() {
        Some((_, line)) => split_csv_line(line),
        None => bail!("{}: empty file", path.display()),
    };
    let header: Vec<String> = header.iter().map(|h| h.trim().to_lowercase()).collect();

    let username_idx = header
        .iter()
        .position(|h| h == &options.username_column.to_lowercase())
        .with_context(|| {
            format!(
                "{}: no '{}' column in header",
                path.display(),
                options.username_column
            )
        })?;
    let display_name_idx = header.iter().position(|h| h == "display_name");
    let follower_count_idx = header.iter().position(|h| h == "follower_count");

    let mut report = ImportReport::default();

    for (line_no, line) in lines {
        let row_no = line_no + 1;
        if line.trim().is_empty() {
            continue;
        }

        let fields = split_csv_line(line);
        let username = match fields.get(username_idx).map(|f| normalize_username(f)) {
            Some(u) if !u.is_empty() => u,
            _ => {
                report.errors.push(format!("row {}: missing username", row_no));
                continue;
            }
        };

        let mut account = NewAccount::new(username);
        if let Some(idx) = display_name_idx {
            let name = fields.get(idx).map(|f| f.trim()).unwrap_or_default();
            if !name.is_empty() {
                account.display_name = Some(name.to_string());
            }
        }
        if let Some(idx) = follower_count_idx {
            let raw = fields.get(idx).map(|f| f.trim()).unwrap_or_default();
            if !raw.is_empty() {
                match raw.parse::<i64>() {
                    Ok(count) => account.follower_count = Some(count),
                    Err(_) => {
                        report
                            .errors
                            .push(format!("row {}: invalid follower_count '{}'", row_no, raw));
                        continue;
                    }
                }
            }
        }

        match repo.upsert_account(account).await {
            Ok(_) => report.imported += 1,
            Err(e) => {
                warn!("row {}: upsert failed: {}", row_no, e);
                report.errors.push(format!("row {}: {}", row_no, e));
            }
        }
    }

    info!(
        "{}: imported {} accounts, {} errors",
        path.display(),
        report.imported,
        report.errors.len()
    );
    Ok(report)
}

/// Import accounts from a plain-text file, one username per line.
pub async fn import_accounts_from_txt(
    repo: &dyn MetricsRepository,
    path: impl AsRef<Path>,
) -> Result<ImportReport> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;

    let mut report = ImportReport::default();

    for (line_no, line) in content.lines().enumerate() {
        let row_no = line_no + 1;
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }

        let username = normalize_username(trimmed);
        if username.is_empty() {
            report.errors.push(format!("row {}: missing username", row_no));
            continue;
        }

        match repo.upsert_account(NewAccount::new(username)).await {
            Ok(_) => report.imported += 1,
            Err(e) => {
                warn!("row {}: upsert failed: {}", row_no, e);
                report.errors.push(format!("row {}: {}", row_no, e));
            }
        }
    }

    info!(
        "{}: imported {} accounts, {} errors",
        path.display(),
        report.imported,
        report.errors.len()
    );
    Ok(report)
}

/// Strip whitespace and a leading `@` from a handle.
fn normalize_username(raw: &str) -> String {
    raw.trim().trim_start_matches('@').to_string()
}

/// Minimal CSV field splitter with double-quote support.
fn split_csv_line(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '"' if in_quotes && chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }
    fields.push(current);
    fields
}
