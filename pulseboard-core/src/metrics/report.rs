//! Report payloads.
//!
//! Each report is built from one owned snapshot of records by a pure
//! `from_records` constructor, and serializes to the JSON shape dashboard
//! clients consume. [`MetricsService`](super::MetricsService) only selects
//! the records and hands them here.

use super::aggregate::{daily_rollup, project_rollup, summarize, DailyStats, ProjectStats};
use super::bucket::{
    BucketCounts, CountDistribution, HealthBand, HealthDecile, ShareDistribution, TokenBand,
};
use super::rank::{rank, RankMetric, RankedSession};
use super::trend::{trend, TrendDirection};
use crate::config::MetricsConfig;
use crate::format::{ratio, round_to};
use crate::types::{status, SessionRecord};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Message attached to every report computed over zero records.
pub const NO_SESSIONS: &str = "No sessions found";

fn average_health(records: &[SessionRecord]) -> f64 {
    let sum: f64 = records.iter().map(|r| r.health_score).sum();
    round_to(ratio(sum, records.len() as f64), 2)
}

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

// ============================================
// Team summary
// ============================================

/// Team overview: counters, health bands, session types and top projects.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TeamSummary {
    /// The team (or corpus) has no sessions
    NoSessions {
        team_name: String,
        total_sessions: usize,
        message: &'static str,
    },
    Computed(Box<TeamSummaryDetail>),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TeamSummaryDetail {
    pub team_name: String,
    pub summary: SummaryBlock,
    pub health_distribution: HealthBands,
    pub session_types: BTreeMap<String, usize>,
    pub top_projects: Vec<ProjectStats>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryBlock {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub completed_sessions: usize,
    pub failed_sessions: usize,
    /// Every observed status, including ones without a dedicated counter
    pub status_counts: BTreeMap<String, usize>,
    pub total_tokens: u64,
    pub average_tokens_per_session: f64,
    pub average_health_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthBands {
    pub healthy: usize,
    pub warning: usize,
    pub critical: usize,
    pub percentages: BandPercentages,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandPercentages {
    pub healthy: f64,
    pub warning: f64,
    pub critical: f64,
}

impl From<&BucketCounts<HealthBand>> for HealthBands {
    fn from(bands: &BucketCounts<HealthBand>) -> Self {
        Self {
            healthy: bands.count(HealthBand::Healthy),
            warning: bands.count(HealthBand::Warning),
            critical: bands.count(HealthBand::Critical),
            percentages: BandPercentages {
                healthy: bands.percentage(HealthBand::Healthy),
                warning: bands.percentage(HealthBand::Warning),
                critical: bands.percentage(HealthBand::Critical),
            },
        }
    }
}

impl TeamSummary {
    pub fn from_records(
        team_name: impl Into<String>,
        records: &[SessionRecord],
        config: &MetricsConfig,
    ) -> Self {
        let team_name = team_name.into();
        if records.is_empty() {
            return TeamSummary::NoSessions {
                team_name,
                total_sessions: 0,
                message: NO_SESSIONS,
            };
        }

        let summary = summarize(records);
        TeamSummary::Computed(Box::new(TeamSummaryDetail {
            team_name,
            summary: SummaryBlock {
                total_sessions: summary.total_sessions,
                active_sessions: summary.status_count(status::ACTIVE),
                completed_sessions: summary.status_count(status::COMPLETED),
                failed_sessions: summary.status_count(status::FAILED),
                total_tokens: summary.total_tokens,
                average_tokens_per_session: round_to(summary.average_tokens, 2),
                average_health_score: round_to(summary.average_health, 2),
                status_counts: summary.status_counts,
            },
            health_distribution: HealthBands::from(&summary.health_bands),
            session_types: summary.session_types,
            top_projects: project_rollup(records, Some(config.top_projects_limit)),
        }))
    }

    pub fn team_name(&self) -> &str {
        match self {
            TeamSummary::NoSessions { team_name, .. } => team_name,
            TeamSummary::Computed(detail) => &detail.team_name,
        }
    }

    pub fn total_sessions(&self) -> usize {
        match self {
            TeamSummary::NoSessions { .. } => 0,
            TeamSummary::Computed(detail) => detail.summary.total_sessions,
        }
    }
}

// ============================================
// Trends
// ============================================

/// Daily activity over a trailing window and its overall direction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendsReport {
    pub period_days: u32,
    pub total_sessions: usize,
    pub trend: TrendDirection,
    pub trend_percentage: f64,
    pub daily_breakdown: Vec<DailyStats>,
}

impl TrendsReport {
    /// `records` must already be restricted to the window.
    pub fn from_records(period_days: u32, records: &[SessionRecord]) -> Self {
        let daily_breakdown = daily_rollup(records);
        let overall = trend(&daily_breakdown);
        Self {
            period_days,
            total_sessions: records.len(),
            trend: overall.direction,
            trend_percentage: overall.percent_change,
            daily_breakdown,
        }
    }
}

// ============================================
// Health distribution
// ============================================

/// Health scores bucketed into deciles.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HealthDistributionReport {
    pub total_sessions: usize,
    /// Decile label to count and percentage, highest decile first
    pub distribution: ShareDistribution,
    pub average_health: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

impl HealthDistributionReport {
    pub fn from_records(records: &[SessionRecord]) -> Self {
        if records.is_empty() {
            return Self {
                total_sessions: 0,
                distribution: ShareDistribution::default(),
                average_health: 0.0,
                message: Some(NO_SESSIONS),
            };
        }

        let deciles =
            BucketCounts::<HealthDecile>::from_values(records.iter().map(|r| r.health_score));
        Self {
            total_sessions: records.len(),
            distribution: deciles.to_shares(),
            average_health: average_health(records),
            message: None,
        }
    }
}

// ============================================
// Top sessions
// ============================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopSessionsReport {
    /// Metric name as requested, even when it fell back to health score
    pub metric: String,
    pub sessions: Vec<RankedSession>,
    pub count: usize,
}

impl TopSessionsReport {
    pub fn from_records(records: &[SessionRecord], metric: &str, limit: usize) -> Self {
        let sessions = rank(records, RankMetric::from_name(metric), limit);
        Self {
            metric: metric.to_string(),
            count: sessions.len(),
            sessions,
        }
    }
}

// ============================================
// Token usage
// ============================================

/// Token consumption statistics and sessions close to their limit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenUsageReport {
    pub total_sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token_stats: Option<TokenStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distribution: Option<CountDistribution>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sessions_approaching_limit: Option<Vec<ApproachingLimit>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TokenStats {
    pub total_tokens: u64,
    pub average_tokens: f64,
    pub max_tokens: u64,
    pub min_tokens: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApproachingLimit {
    pub id: String,
    pub token_count: u64,
    pub token_limit: u64,
    pub usage_percentage: f64,
    pub project_name: Option<String>,
}

impl TokenUsageReport {
    pub fn from_records(records: &[SessionRecord], config: &MetricsConfig) -> Self {
        if records.is_empty() {
            return Self {
                total_sessions: 0,
                token_stats: None,
                distribution: None,
                sessions_approaching_limit: None,
                message: Some(NO_SESSIONS),
            };
        }

        let total_tokens = records
            .iter()
            .fold(0u64, |acc, r| acc.saturating_add(r.token_count));
        let max_tokens = records.iter().map(|r| r.token_count).max().unwrap_or(0);
        let min_tokens = records.iter().map(|r| r.token_count).min().unwrap_or(0);

        let mut approaching: Vec<ApproachingLimit> = records
            .iter()
            .filter_map(|r| {
                let usage = r.token_usage_ratio()?;
                (usage > config.approaching_limit_ratio).then(|| ApproachingLimit {
                    id: r.id.clone(),
                    token_count: r.token_count,
                    token_limit: r.token_limit,
                    usage_percentage: round_to(usage * 100.0, 1),
                    project_name: r.project_name.clone(),
                })
            })
            .collect();
        approaching.sort_by(|a, b| descending(a.usage_percentage, b.usage_percentage));
        approaching.truncate(config.approaching_limit_count);

        Self {
            total_sessions: records.len(),
            token_stats: Some(TokenStats {
                total_tokens,
                average_tokens: round_to(ratio(total_tokens as f64, records.len() as f64), 2),
                max_tokens,
                min_tokens,
            }),
            distribution: Some(
                BucketCounts::<TokenBand>::from_values(records.iter().map(|r| r.token_count))
                    .to_counts(),
            ),
            sessions_approaching_limit: Some(approaching),
            message: None,
        }
    }
}

// ============================================
// Session duration
// ============================================

/// Elapsed time between start and last activity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDurationReport {
    /// Sessions with both timestamps
    pub total_sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_stats: Option<DurationStats>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub longest_sessions: Option<Vec<SessionDuration>>,
    /// Sessions left out for a missing timestamp
    #[serde(skip_serializing_if = "is_zero")]
    pub skipped_sessions: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
}

fn is_zero(n: &usize) -> bool {
    *n == 0
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DurationStats {
    pub average_minutes: f64,
    pub max_minutes: f64,
    pub min_minutes: f64,
    pub median_minutes: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionDuration {
    pub session_id: String,
    pub duration_minutes: f64,
    pub project_name: Option<String>,
    pub status: String,
}

impl DurationStats {
    /// Statistics over already-rounded minutes. `None` for an empty slice.
    ///
    /// The median is the lower-middle element for even counts.
    pub fn from_minutes(minutes: &[f64]) -> Option<Self> {
        if minutes.is_empty() {
            return None;
        }
        let mut sorted = minutes.to_vec();
        sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));

        let sum: f64 = sorted.iter().sum();
        Some(Self {
            average_minutes: round_to(sum / sorted.len() as f64, 1),
            max_minutes: round_to(sorted[sorted.len() - 1], 1),
            min_minutes: round_to(sorted[0], 1),
            median_minutes: round_to(sorted[(sorted.len() - 1) / 2], 1),
        })
    }
}

impl SessionDurationReport {
    pub fn from_records(records: &[SessionRecord], config: &MetricsConfig) -> Self {
        let mut durations: Vec<SessionDuration> = records
            .iter()
            .filter_map(|r| {
                Some(SessionDuration {
                    session_id: r.id.clone(),
                    duration_minutes: round_to(r.duration_minutes()?, 1),
                    project_name: r.project_name.clone(),
                    status: r.status.clone(),
                })
            })
            .collect();
        let skipped_sessions = records.len() - durations.len();
        if skipped_sessions > 0 {
            tracing::debug!(skipped_sessions, "Excluded sessions missing a timestamp");
        }

        let minutes: Vec<f64> = durations.iter().map(|d| d.duration_minutes).collect();
        let Some(stats) = DurationStats::from_minutes(&minutes) else {
            return Self {
                total_sessions: 0,
                duration_stats: None,
                longest_sessions: None,
                skipped_sessions,
                message: Some(NO_SESSIONS),
            };
        };

        durations.sort_by(|a, b| descending(a.duration_minutes, b.duration_minutes));
        durations.truncate(config.longest_sessions_limit);

        Self {
            total_sessions: minutes.len(),
            duration_stats: Some(stats),
            longest_sessions: Some(durations),
            skipped_sessions,
            message: None,
        }
    }
}

// ============================================
// Session stats and project listing
// ============================================

/// Quick counters for the dashboard header.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub active_sessions: usize,
    pub total_tokens: u64,
    pub average_health: f64,
}

impl SessionStats {
    pub fn from_records(records: &[SessionRecord]) -> Self {
        Self {
            total_sessions: records.len(),
            active_sessions: records.iter().filter(|r| r.is_active()).count(),
            total_tokens: records
                .iter()
                .fold(0u64, |acc, r| acc.saturating_add(r.token_count)),
            average_health: average_health(records),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectList {
    pub projects: Vec<ProjectEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectEntry {
    pub project_name: String,
    pub session_count: usize,
}

impl ProjectList {
    pub fn from_records(records: &[SessionRecord]) -> Self {
        Self {
            projects: project_rollup(records, None)
                .into_iter()
                .map(|p| ProjectEntry {
                    project_name: p.name,
                    session_count: p.session_count,
                })
                .collect(),
        }
    }
}
