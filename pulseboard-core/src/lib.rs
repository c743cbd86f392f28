//! # pulseboard-core
//!
//! Metrics aggregation engine for AI coding session dashboards.
//!
//! This library provides:
//! - Domain types for session records and teams
//! - Record sources (in-memory snapshots and the dashboard SQLite database)
//! - The metrics engine: bucketing, aggregation, trends, ranking and reports
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Example
//!
//! ```rust,no_run
//! use pulseboard_core::{Config, MetricsService, SqliteSource};
//!
//! let config = Config::load().expect("failed to load config");
//! let source = SqliteSource::open(&config.source.database_path()).expect("failed to open database");
//! let service = MetricsService::with_config(source, config.metrics.clone());
//!
//! let summary = service.team_summary(None).expect("failed to compute summary");
//! println!("{}", serde_json::to_string_pretty(&summary).unwrap());
//! ```

// Re-export commonly used items at the crate root
pub use config::Config;
pub use error::{Error, Result};
pub use metrics::MetricsService;
pub use source::{MemorySource, RecordQuery, SessionSource, Snapshot, SqliteSource};
pub use types::*;

// Public modules
pub mod config;
pub mod error;
pub mod format;
pub mod logging;
pub mod metrics;
pub mod source;
pub mod types;
