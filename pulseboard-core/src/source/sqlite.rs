//! Read-only record source over the dashboard database
//!
//! Reads the `teams` and `sessions` tables written by the dashboard
//! backend. The schema belongs to the backend; this adapter only selects
//! from it and never creates or migrates tables.

use super::{RecordQuery, SessionSource};
use crate::error::{Error, Result};
use crate::format::parse_timestamp;
use crate::types::{SessionRecord, Team};
use chrono::{DateTime, Utc};
use rusqlite::{Connection, OpenFlags, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

const SESSION_COLUMNS: &str = "id, team_id, type, status, health_score, token_count, \
                               token_limit, start_time, last_activity, project_name";

/// Dashboard database handle (single read-only connection)
pub struct SqliteSource {
    conn: Mutex<Connection>,
}

impl SqliteSource {
    /// Open an existing dashboard database read-only.
    pub fn open(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::Config(format!(
                "dashboard database not found at {}",
                path.display()
            )));
        }

        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(std::time::Duration::from_secs(5))?;

        tracing::debug!(path = %path.display(), "Opened dashboard database");

        Ok(Self::from_connection(conn))
    }

    /// Wrap an already-open connection.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| Error::Source("dashboard database connection poisoned".to_string()))
    }

    fn row_to_team(row: &Row) -> rusqlite::Result<Team> {
        Ok(Team {
            id: row.get("id")?,
            name: row.get("name")?,
        })
    }

    fn row_to_session(row: &Row) -> rusqlite::Result<SessionRecord> {
        let start_time: Option<String> = row.get("start_time")?;
        let last_activity: Option<String> = row.get("last_activity")?;
        let token_count: Option<i64> = row.get("token_count")?;
        let token_limit: Option<i64> = row.get("token_limit")?;
        let id: String = row.get("id")?;

        Ok(SessionRecord {
            start_time: stored_timestamp(&id, "start_time", start_time.as_deref()),
            last_activity: stored_timestamp(&id, "last_activity", last_activity.as_deref()),
            id,
            team_id: row.get("team_id")?,
            session_type: row.get::<_, Option<String>>("type")?.unwrap_or_default(),
            status: row.get::<_, Option<String>>("status")?.unwrap_or_default(),
            health_score: row.get::<_, Option<f64>>("health_score")?.unwrap_or(0.0),
            token_count: token_count.unwrap_or(0).max(0) as u64,
            token_limit: token_limit.unwrap_or(0).max(0) as u64,
            project_name: row.get("project_name")?,
        })
    }
}

/// Parse a stored timestamp column, treating unreadable values as absent.
fn stored_timestamp(id: &str, column: &str, raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?;
    let parsed = parse_timestamp(raw);
    if parsed.is_none() && !raw.trim().is_empty() {
        tracing::debug!(session_id = id, column, value = raw, "Unparseable timestamp ignored");
    }
    parsed
}

impl SessionSource for SqliteSource {
    fn find_team(&self, team_id: &str) -> Result<Option<Team>> {
        let conn = self.lock()?;
        conn.query_row("SELECT id, name FROM teams WHERE id = ?", [team_id], |row| {
            Self::row_to_team(row)
        })
        .optional()
        .map_err(Error::from)
    }

    fn fetch_sessions(&self, query: &RecordQuery) -> Result<Vec<SessionRecord>> {
        let conn = self.lock()?;

        let mut sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE 1=1");
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = vec![];

        if let Some(team_id) = &query.team_id {
            sql.push_str(" AND team_id = ?");
            params.push(Box::new(team_id.clone()));
        }

        sql.push_str(" ORDER BY rowid");

        let params_refs: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_refs.as_slice(), Self::row_to_session)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        // Stored timestamps mix layouts, so the window is applied after parsing.
        let fetched = rows.len();
        let sessions: Vec<_> = rows.into_iter().filter(|r| query.matches(r)).collect();

        tracing::debug!(
            team_id = query.team_id.as_deref().unwrap_or("*"),
            fetched,
            matched = sessions.len(),
            "Fetched session snapshot"
        );

        Ok(sessions)
    }
}
