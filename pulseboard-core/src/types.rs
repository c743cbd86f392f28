//! Core domain types for pulseboard
//!
//! These types describe the read-only input to the metrics engine. Records
//! are produced upstream (the session manager and the dashboard backend);
//! the engine never mutates them.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Session** | One AI coding session observed by the session manager |
//! | **Team** | A group of people whose sessions are reported together |
//! | **Health score** | Upstream fitness indicator for a session, nominally 0-100 |
//! | **Token limit** | Configured context ceiling for a session; 0 means none |

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Status strings with dedicated counters in reports.
///
/// Statuses are free-form; anything else is still counted in the
/// per-status maps.
pub mod status {
    pub const ACTIVE: &str = "active";
    pub const COMPLETED: &str = "completed";
    pub const FAILED: &str = "failed";
}

// ============================================
// Teams
// ============================================

/// A team that sessions can be assigned to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    /// Unique identifier
    pub id: String,
    /// Display name
    pub name: String,
}

impl Team {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

// ============================================
// Sessions
// ============================================

/// A session record as loaded from the record source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionRecord {
    /// Unique identifier for this session
    pub id: String,
    /// Owning team, `None` when unassigned
    #[serde(default)]
    pub team_id: Option<String>,
    /// Free-form session category (e.g. "claude_code", "cursor")
    #[serde(rename = "type", default)]
    pub session_type: String,
    /// Free-form status; see [`status`] for the well-known values
    #[serde(default)]
    pub status: String,
    /// Upstream health score, nominally 0-100 but not clamped
    #[serde(default)]
    pub health_score: f64,
    /// Tokens consumed so far
    #[serde(default)]
    pub token_count: u64,
    /// Configured token ceiling, 0 when none is configured
    #[serde(default)]
    pub token_limit: u64,
    /// When the session started
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub start_time: Option<DateTime<Utc>>,
    /// Most recent activity, `None` if the session never progressed
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub last_activity: Option<DateTime<Utc>>,
    /// Project the session worked on
    #[serde(default)]
    pub project_name: Option<String>,
}

impl SessionRecord {
    /// Create a record with the given id and every other field empty.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            team_id: None,
            session_type: String::new(),
            status: String::new(),
            health_score: 0.0,
            token_count: 0,
            token_limit: 0,
            start_time: None,
            last_activity: None,
            project_name: None,
        }
    }

    /// Project name if present and non-empty.
    pub fn project(&self) -> Option<&str> {
        self.project_name.as_deref().filter(|name| !name.is_empty())
    }

    pub fn is_active(&self) -> bool {
        self.status == status::ACTIVE
    }

    /// Signed minutes from start to last activity, unrounded.
    ///
    /// `None` when either timestamp is missing. A last activity recorded
    /// before the start yields a negative value.
    pub fn duration_minutes(&self) -> Option<f64> {
        let (start, last) = (self.start_time?, self.last_activity?);
        let delta = last.signed_duration_since(start);
        Some(delta.num_milliseconds() as f64 / 60_000.0)
    }

    /// Fraction of the token limit consumed, `None` without a limit.
    pub fn token_usage_ratio(&self) -> Option<f64> {
        (self.token_limit > 0).then(|| self.token_count as f64 / self.token_limit as f64)
    }
}

/// Accept RFC 3339 or the backend's naive timestamp layouts.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(value) if value.trim().is_empty() => Ok(None),
        Some(value) => crate::format::parse_timestamp(&value)
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp: {value}"))),
    }
}
