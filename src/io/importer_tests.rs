use std::path::PathBuf;

use crate::db::repositories::LocalRepository;
use crate::db::MetricsRepository;
use crate::io::importer::{
    import_accounts_from_csv, import_accounts_from_file, import_accounts_from_txt, ImportOptions,
};

struct TempFile {
    path: PathBuf,
}

impl TempFile {
    fn new(name: &str, content: &str) -> Self {
        let path = std::env::temp_dir().join(format!("postpulse-{}-{}", std::process::id(), name));
        std::fs::write(&path, content).unwrap();
        Self { path }
    }
}

impl Drop for TempFile {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.path);
    }
}

#[tokio::test]
async fn test_txt_import_strips_handles_and_comments() {
    let file = TempFile::new(
        "accounts.txt",
        "# watchlist\n@alice\nbob\n\n  @carol  \n",
    );
    let repo = LocalRepository::new();

    let report = import_accounts_from_txt(&repo, &file.path).await.unwrap();

    assert_eq!(report.imported, 3);
    assert!(report.errors.is_empty());
    assert!(repo.get_account("alice").await.unwrap().is_some());
    assert!(repo.get_account("bob").await.unwrap().is_some());
    assert!(repo.get_account("carol").await.unwrap().is_some());
}

#[tokio::test]
async fn test_csv_import_with_optional_columns() {
    let file = TempFile::new(
        "accounts.csv",
        "username,display_name,follower_count\n\
         @alice,Alice A,1200\n\
         bob,,\n",
    );
    let repo = LocalRepository::new();

    let report = import_accounts_from_csv(&repo, &file.path, &ImportOptions::default())
        .await
        .unwrap();

    assert_eq!(report.imported, 2);
    assert!(report.errors.is_empty());

    let alice = repo.get_account("alice").await.unwrap().unwrap();
    assert_eq!(alice.display_name.as_deref(), Some("Alice A"));
    assert_eq!(alice.follower_count, 1200);

    let bob = repo.get_account("bob").await.unwrap().unwrap();
    assert!(bob.display_name.is_none());
}

#[tokio::test]
async fn test_csv_import_collects_row_errors() {
    let file = TempFile::new(
        "bad-rows.csv",
        "username,follower_count\n\
         alice,not-a-number\n\
         ,50\n\
         carol,10\n",
    );
    let repo = LocalRepository::new();

    let report = import_accounts_from_csv(&repo, &file.path, &ImportOptions::default())
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    assert_eq!(report.errors.len(), 2);
    assert!(report.errors[0].starts_with("row 2:"));
    assert!(report.errors[1].starts_with("row 3:"));
    assert!(repo.get_account("carol").await.unwrap().is_some());
}

#[tokio::test]
async fn test_csv_import_custom_username_column() {
    let file = TempFile::new("handles.csv", "handle\n@alice\n");
    let repo = LocalRepository::new();

    let options = ImportOptions {
        username_column: "handle".to_string(),
    };
    let report = import_accounts_from_csv(&repo, &file.path, &options)
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
}

#[tokio::test]
async fn test_csv_import_missing_username_column_fails() {
    let file = TempFile::new("no-username.csv", "name\nalice\n");
    let repo = LocalRepository::new();

    let result = import_accounts_from_csv(&repo, &file.path, &ImportOptions::default()).await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_file_import_dispatches_on_extension() {
    let txt = TempFile::new("list.txt", "alice\n");
    let csv = TempFile::new("list.csv", "username\nbob\n");
    let repo = LocalRepository::new();

    let report = import_accounts_from_file(&repo, &txt.path).await.unwrap();
    assert_eq!(report.imported, 1);

    let report = import_accounts_from_file(&repo, &csv.path).await.unwrap();
    assert_eq!(report.imported, 1);

    assert!(repo.get_account("alice").await.unwrap().is_some());
    assert!(repo.get_account("bob").await.unwrap().is_some());
}

#[tokio::test]
async fn test_quoted_csv_fields() {
    let file = TempFile::new(
        "quoted.csv",
        "username,display_name\nalice,\"Doe, Alice\"\n",
    );
    let repo = LocalRepository::new();

    let report = import_accounts_from_csv(&repo, &file.path, &ImportOptions::default())
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    let alice = repo.get_account("alice").await.unwrap().unwrap();
    assert_eq!(alice.display_name.as_deref(), Some("Doe, Alice"));
}
