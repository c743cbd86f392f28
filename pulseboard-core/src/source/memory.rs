//! In-memory record source and JSON snapshots.

use super::{RecordQuery, SessionSource};
use crate::error::{Error, Result};
use crate::types::{SessionRecord, Team};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized form of a dashboard export.
///
/// ```json
/// { "teams": [{"id": "t1", "name": "Platform"}], "sessions": [{"id": "s1", "...": "..."}] }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Snapshot {
    #[serde(default)]
    pub teams: Vec<Team>,
    #[serde(default)]
    pub sessions: Vec<SessionRecord>,
}

/// Records held in memory.
///
/// Every fetch clones the matching records, so callers own their snapshot.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    teams: Vec<Team>,
    sessions: Vec<SessionRecord>,
}

impl MemorySource {
    pub fn new(teams: Vec<Team>, sessions: Vec<SessionRecord>) -> Self {
        Self { teams, sessions }
    }

    /// Load a JSON snapshot file.
    pub fn from_snapshot_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Source(format!("failed to read snapshot {}: {}", path.display(), e))
        })?;
        let snapshot: Snapshot = serde_json::from_str(&content)?;

        tracing::debug!(
            path = %path.display(),
            teams = snapshot.teams.len(),
            sessions = snapshot.sessions.len(),
            "Loaded session snapshot"
        );

        Ok(Self::from(snapshot))
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn sessions(&self) -> &[SessionRecord] {
        &self.sessions
    }
}

impl From<Snapshot> for MemorySource {
    fn from(snapshot: Snapshot) -> Self {
        Self::new(snapshot.teams, snapshot.sessions)
    }
}

impl SessionSource for MemorySource {
    fn find_team(&self, team_id: &str) -> Result<Option<Team>> {
        Ok(self.teams.iter().find(|team| team.id == team_id).cloned())
    }

    fn fetch_sessions(&self, query: &RecordQuery) -> Result<Vec<SessionRecord>> {
        Ok(self
            .sessions
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }
}
