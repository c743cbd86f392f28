//! Top-N ordering of sessions by a numeric metric.

use crate::format::round_to;
use crate::types::SessionRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::cmp::Ordering;

/// Field sessions can be ranked by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RankMetric {
    #[default]
    HealthScore,
    TokenCount,
}

impl RankMetric {
    /// Parse a metric name. Unrecognized names fall back to health score.
    pub fn from_name(name: &str) -> Self {
        match name {
            "token_count" => RankMetric::TokenCount,
            _ => RankMetric::HealthScore,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RankMetric::HealthScore => "health_score",
            RankMetric::TokenCount => "token_count",
        }
    }

    fn value(self, record: &SessionRecord) -> f64 {
        match self {
            RankMetric::HealthScore => record.health_score,
            RankMetric::TokenCount => record.token_count as f64,
        }
    }
}

/// One row of a ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedSession {
    pub id: String,
    #[serde(rename = "type")]
    pub session_type: String,
    pub status: String,
    pub health_score: f64,
    pub token_count: u64,
    pub project_name: Option<String>,
    pub start_time: Option<DateTime<Utc>>,
    /// Signed minutes from start to last activity, one decimal, 0 when a
    /// timestamp is missing
    pub duration_minutes: f64,
}

impl From<&SessionRecord> for RankedSession {
    fn from(record: &SessionRecord) -> Self {
        Self {
            id: record.id.clone(),
            session_type: record.session_type.clone(),
            status: record.status.clone(),
            health_score: record.health_score,
            token_count: record.token_count,
            project_name: record.project_name.clone(),
            start_time: record.start_time,
            duration_minutes: record
                .duration_minutes()
                .map(|m| round_to(m, 1))
                .unwrap_or(0.0),
        }
    }
}

/// The `limit` highest records by `metric`, highest first.
///
/// Equal values keep their input order. NaN health scores sort last.
pub fn rank(records: &[SessionRecord], metric: RankMetric, limit: usize) -> Vec<RankedSession> {
    let mut ordered: Vec<&SessionRecord> = records.iter().collect();
    ordered.sort_by(|a, b| descending(metric.value(a), metric.value(b)));
    ordered.into_iter().take(limit).map(RankedSession::from).collect()
}

fn descending(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}
