//! File-based ingestion helpers.

pub mod importer;

pub use importer::{
    import_accounts_from_csv, import_accounts_from_file, import_accounts_from_txt, ImportOptions,
    ImportReport,
};

#[cfg(test)]
#[path = "importer_tests.rs"]
mod importer_tests;
