//! Core types, configuration, and error handling for churn analysis.
//!
//! This crate provides the shared foundation used by the other churn crates:
//! - [`ChurnError`] — unified error type using `thiserror`
//! - [`ChurnConfig`] — configuration loaded from `.churn.toml`
//! - Shared types: [`ChurnRecord`], [`ChurnRanking`], [`ChurnOutput`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{parse_date, ChurnConfig, ChurnSection};
pub use error::{ChurnError, VcsCommandError, VcsFailureKind};
pub use types::{ChurnChanges, ChurnOutput, ChurnRanking, ChurnRecord, OutputFormat};
