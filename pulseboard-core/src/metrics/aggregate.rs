//! Summary statistics and groupings over a record collection.

use super::bucket::{BucketCounts, HealthBand};
use crate::format::{ratio, round_to};
use crate::types::{status, SessionRecord};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// Whole-collection statistics.
///
/// Averages are kept unrounded; reports round them when shaping output.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    /// Number of records
    pub total_sessions: usize,
    /// Count per observed status string
    pub status_counts: BTreeMap<String, usize>,
    /// Count per observed session type
    pub session_types: BTreeMap<String, usize>,
    /// Sum of `token_count`
    pub total_tokens: u64,
    /// Mean `token_count`, 0 for an empty collection
    pub average_tokens: f64,
    /// Sum of `health_score`
    pub total_health: f64,
    /// Mean `health_score`, 0 for an empty collection
    pub average_health: f64,
    /// healthy / warning / critical tallies
    pub health_bands: BucketCounts<HealthBand>,
}

impl Summary {
    /// Count for one status, 0 if never observed.
    pub fn status_count(&self, status: &str) -> usize {
        self.status_counts.get(status).copied().unwrap_or(0)
    }
}

/// Compute [`Summary`] for `records`.
pub fn summarize(records: &[SessionRecord]) -> Summary {
    let mut status_counts = BTreeMap::new();
    let mut total_tokens: u64 = 0;
    let mut total_health = 0.0;
    let mut health_bands = BucketCounts::new();

    for record in records {
        *status_counts.entry(record.status.clone()).or_insert(0) += 1;
        total_tokens = total_tokens.saturating_add(record.token_count);
        total_health += record.health_score;
        health_bands.add(record.health_score);
    }

    let total = records.len() as f64;
    Summary {
        total_sessions: records.len(),
        status_counts,
        session_types: type_counts(records),
        total_tokens,
        average_tokens: ratio(total_tokens as f64, total),
        total_health,
        average_health: ratio(total_health, total),
        health_bands,
    }
}

/// Count records per session type.
pub fn type_counts(records: &[SessionRecord]) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for record in records {
        *counts.entry(record.session_type.clone()).or_insert(0) += 1;
    }
    counts
}

// ============================================
// Project rollup
// ============================================

/// Per-project aggregate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectStats {
    /// Project name
    pub name: String,
    /// Number of sessions
    pub session_count: usize,
    /// Total tokens across the project's sessions
    pub total_tokens: u64,
    /// Mean health, two decimals
    pub avg_health: f64,
}

#[derive(Debug)]
struct ProjectAccumulator {
    name: String,
    session_count: usize,
    total_tokens: u64,
    health_sum: f64,
}

/// Group records by non-empty project name, largest first.
///
/// Projects with equal session counts keep the order in which they were
/// first seen. `limit` caps the result when set.
pub fn project_rollup(records: &[SessionRecord], limit: Option<usize>) -> Vec<ProjectStats> {
    let mut order: Vec<ProjectAccumulator> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for record in records {
        let Some(name) = record.project() else {
            continue;
        };
        let slot = *index.entry(name).or_insert_with(|| {
            order.push(ProjectAccumulator {
                name: name.to_string(),
                session_count: 0,
                total_tokens: 0,
                health_sum: 0.0,
            });
            order.len() - 1
        });
        let acc = &mut order[slot];
        acc.session_count += 1;
        acc.total_tokens = acc.total_tokens.saturating_add(record.token_count);
        acc.health_sum += record.health_score;
    }

    // Stable: ties stay in first-seen order.
    order.sort_by(|a, b| b.session_count.cmp(&a.session_count));

    order
        .into_iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|acc| ProjectStats {
            avg_health: round_to(ratio(acc.health_sum, acc.session_count as f64), 2),
            name: acc.name,
            session_count: acc.session_count,
            total_tokens: acc.total_tokens,
        })
        .collect()
}

// ============================================
// Daily rollup
// ============================================

/// Per-day aggregate keyed by the calendar date of `start_time`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyStats {
    /// Calendar date (`YYYY-MM-DD`)
    pub date: NaiveDate,
    /// Sessions started that day
    pub session_count: usize,
    /// Tokens across those sessions
    pub total_tokens: u64,
    /// Mean health, two decimals
    pub avg_health: f64,
    /// Sessions with status `active`
    pub active_count: usize,
    /// Sessions with status `completed`
    pub completed_count: usize,
    /// Sessions with status `failed`
    pub failed_count: usize,
    /// Count per observed status string
    pub status_counts: BTreeMap<String, usize>,
}

#[derive(Debug, Default)]
struct DayAccumulator {
    session_count: usize,
    total_tokens: u64,
    health_sum: f64,
    status_counts: BTreeMap<String, usize>,
}

/// Group records by start date, oldest first.
///
/// Records without a `start_time` cannot be placed on a day and are skipped.
pub fn daily_rollup(records: &[SessionRecord]) -> Vec<DailyStats> {
    let mut days: BTreeMap<NaiveDate, DayAccumulator> = BTreeMap::new();

    for record in records {
        let Some(start) = record.start_time else {
            continue;
        };
        let acc = days.entry(start.date_naive()).or_default();
        acc.session_count += 1;
        acc.total_tokens = acc.total_tokens.saturating_add(record.token_count);
        acc.health_sum += record.health_score;
        *acc.status_counts.entry(record.status.clone()).or_insert(0) += 1;
    }

    days.into_iter()
        .map(|(date, acc)| {
            let count_of = |s: &str| acc.status_counts.get(s).copied().unwrap_or(0);
            DailyStats {
                date,
                session_count: acc.session_count,
                total_tokens: acc.total_tokens,
                avg_health: round_to(ratio(acc.health_sum, acc.session_count as f64), 2),
                active_count: count_of(status::ACTIVE),
                completed_count: count_of(status::COMPLETED),
                failed_count: count_of(status::FAILED),
                status_counts: acc.status_counts.clone(),
            }
        })
        .collect()
}
