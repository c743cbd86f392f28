//! Metrics engine
//!
//! Layered bottom-up:
//! - [`bucket`]: fixed labeled ranges (health deciles, health bands, token bands)
//! - [`aggregate`]: whole-collection summary, project and daily rollups
//! - [`trend`]: direction of change across a daily series
//! - [`rank`]: top-N sessions by a metric
//! - [`report`]: serializable payloads built from one record snapshot
//! - [`service`]: [`MetricsService`], the reporting operations over a
//!   [`SessionSource`](crate::source::SessionSource)
//!
//! Everything below [`service`] is pure: functions take a slice of records
//! and return owned values.

pub mod aggregate;
pub mod bucket;
pub mod rank;
pub mod report;
pub mod service;
pub mod trend;

pub use aggregate::{
    daily_rollup, project_rollup, summarize, type_counts, DailyStats, ProjectStats, Summary,
};
pub use bucket::{bucket, BucketCounts, HealthBand, HealthDecile, Scheme, TokenBand};
pub use rank::{rank, RankMetric, RankedSession};
pub use report::{
    HealthDistributionReport, ProjectList, SessionDurationReport, SessionStats, TeamSummary,
    TokenUsageReport, TopSessionsReport, TrendsReport, NO_SESSIONS,
};
pub use service::{MetricsService, ALL_TEAMS};
pub use trend::{trend, Trend, TrendDirection};
