//! Record sources for the metrics engine
//!
//! The engine never queries storage itself. Every report asks a
//! [`SessionSource`] for one snapshot of records and works on that owned copy,
//! so concurrent reports never share mutable state.
//!
//! Two sources ship with the crate:
//! - [`MemorySource`]: records held in memory, optionally loaded from a JSON
//!   snapshot file
//! - [`SqliteSource`]: read-only view over the dashboard backend's database

pub mod memory;
pub mod sqlite;

pub use memory::{MemorySource, Snapshot};
pub use sqlite::SqliteSource;

use crate::error::Result;
use crate::types::{SessionRecord, Team};
use chrono::{DateTime, Utc};
use std::sync::Arc;

/// Selection applied by a source before records reach the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordQuery {
    /// Only sessions owned by this team
    pub team_id: Option<String>,
    /// Only sessions whose `start_time` is at or after this instant
    pub since: Option<DateTime<Utc>>,
}

impl RecordQuery {
    /// Every record in the corpus.
    pub fn all() -> Self {
        Self::default()
    }

    /// Records for an optional team.
    pub fn for_team(team_id: Option<&str>) -> Self {
        Self {
            team_id: team_id.map(str::to_string),
            since: None,
        }
    }

    /// Restrict to sessions started at or after `since`.
    pub fn since(mut self, since: DateTime<Utc>) -> Self {
        self.since = Some(since);
        self
    }

    /// Whether `record` satisfies this query.
    ///
    /// With a time window set, records without a start time never match.
    pub fn matches(&self, record: &SessionRecord) -> bool {
        if let Some(team_id) = &self.team_id {
            if record.team_id.as_deref() != Some(team_id.as_str()) {
                return false;
            }
        }
        match self.since {
            Some(since) => record.start_time.is_some_and(|start| start >= since),
            None => true,
        }
    }
}

/// Supplies session records and team lookups to the metrics engine.
///
/// Implementations must return a fresh, owned snapshot per call.
pub trait SessionSource: Send + Sync {
    /// Look up a team by id.
    fn find_team(&self, team_id: &str) -> Result<Option<Team>>;

    /// Fetch every session matching `query`.
    fn fetch_sessions(&self, query: &RecordQuery) -> Result<Vec<SessionRecord>>;
}

impl<S: SessionSource + ?Sized> SessionSource for Arc<S> {
    fn find_team(&self, team_id: &str) -> Result<Option<Team>> {
        (**self).find_team(team_id)
    }

    fn fetch_sessions(&self, query: &RecordQuery) -> Result<Vec<SessionRecord>> {
        (**self).fetch_sessions(query)
    }
}

impl<S: SessionSource + ?Sized> SessionSource for Box<S> {
    fn find_team(&self, team_id: &str) -> Result<Option<Team>> {
        (**self).find_team(team_id)
    }

    fn fetch_sessions(&self, query: &RecordQuery) -> Result<Vec<SessionRecord>> {
        (**self).fetch_sessions(query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn record(id: &str, team: Option<&str>, start: Option<DateTime<Utc>>) -> SessionRecord {
        let mut record = SessionRecord::new(id);
        record.team_id = team.map(str::to_string);
        record.start_time = start;
        record
    }

    #[test]
    fn test_query_team_filter() {
        let query = RecordQuery::for_team(Some("alpha"));
        assert!(query.matches(&record("a", Some("alpha"), None)));
        assert!(!query.matches(&record("b", Some("beta"), None)));
        assert!(!query.matches(&record("c", None, None)));
        assert!(RecordQuery::all().matches(&record("c", None, None)));
    }

    #[test]
    fn test_query_window_is_inclusive() {
        let cutoff = Utc.with_ymd_and_hms(2025, 5, 1, 0, 0, 0).unwrap();
        let query = RecordQuery::all().since(cutoff);

        assert!(query.matches(&record("on", None, Some(cutoff))));
        assert!(query.matches(&record("after", None, Some(cutoff + Duration::hours(1)))));
        assert!(!query.matches(&record("before", None, Some(cutoff - Duration::seconds(1)))));
        assert!(!query.matches(&record("undated", None, None)));
    }
}
