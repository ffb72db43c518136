//! # Postpulse
//!
//! Engagement analysis engine for social media post metrics.
//!
//! This crate scores posts by a weighted engagement formula, builds
//! per-account baselines over a trailing window, and flags posts whose
//! engagement is an outlier relative to that baseline. The backend exposes
//! a REST API via Axum.
//!
//! ## Features
//!
//! - **Scoring**: Weighted engagement score over likes, reshares, replies
//!   and views
//! - **Baselines**: Mean/median engagement per account over a trailing
//!   window
//! - **Outlier detection**: Uncapped multipliers against the account mean,
//!   flagged at a configurable threshold
//! - **Ingestion**: Pluggable metrics source plus CSV/TXT account import
//! - **HTTP API**: RESTful endpoints for account management and analysis
//!
//! ## Architecture
//!
//! The crate is organized into several logical modules:
//!
//! - [`api`]: Domain types shared across layers
//! - [`db`]: Repository pattern storage layer (in-memory and Postgres)
//! - [`services`]: Scoring, baselines, classification, orchestration
//! - [`io`]: File-based account import
//! - [`http`]: Axum-based HTTP server and request handlers

// Allow large error types - RepositoryError contains rich context for debugging
#![allow(clippy::result_large_err)]

pub mod api;

pub mod db;

pub mod io;

pub mod services;

#[cfg(feature = "http-server")]
pub mod http;
