//! Integration tests for the metrics engine over both record sources
//!
//! The fixture in `tests/fixtures/snapshot.json` is loaded directly and also
//! written into a SQLite database laid out like the dashboard backend's, so
//! every report can be checked against both sources.

use pulseboard_core::metrics::report::TeamSummary;
use pulseboard_core::metrics::{MetricsService, TrendDirection};
use pulseboard_core::{Error, MemorySource, SessionRecord, SqliteSource};
use rusqlite::{params, Connection};
use std::path::PathBuf;
use tempfile::TempDir;

/// Get the path to a fixture file
fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures")
        .join(name)
}

fn memory_source() -> MemorySource {
    MemorySource::from_snapshot_file(&fixture_path("snapshot.json")).expect("fixture should load")
}

fn naive(ts: Option<chrono::DateTime<chrono::Utc>>) -> Option<String> {
    ts.map(|t| t.format("%Y-%m-%d %H:%M:%S%.6f").to_string())
}

/// Write the fixture into a database with the backend's table layout.
fn sqlite_source(dir: &TempDir) -> SqliteSource {
    let path = dir.path().join("sessions.db");
    let conn = Connection::open(&path).unwrap();
    conn.execute_batch(
        r#"
        CREATE TABLE teams (
            id VARCHAR PRIMARY KEY, name VARCHAR NOT NULL UNIQUE, description TEXT,
            settings JSON, created_at DATETIME, updated_at DATETIME
        );
        CREATE TABLE sessions (
            id VARCHAR PRIMARY KEY, pid INTEGER NOT NULL, type VARCHAR NOT NULL,
            status VARCHAR NOT NULL, start_time DATETIME, last_activity DATETIME,
            working_directory VARCHAR NOT NULL, token_count INTEGER, token_limit INTEGER,
            health_score FLOAT, message_count INTEGER, project_name VARCHAR,
            team_id VARCHAR REFERENCES teams(id)
        );
        "#,
    )
    .unwrap();

    let memory = memory_source();
    for team in memory.teams() {
        conn.execute(
            "INSERT INTO teams (id, name) VALUES (?1, ?2)",
            params![team.id, team.name],
        )
        .unwrap();
    }
    for (pid, s) in memory.sessions().iter().enumerate() {
        conn.execute(
            "INSERT INTO sessions (id, pid, type, status, start_time, last_activity,
                working_directory, token_count, token_limit, health_score, project_name, team_id)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, '/tmp', ?7, ?8, ?9, ?10, ?11)",
            params![
                s.id,
                pid as i64,
                s.session_type,
                s.status,
                naive(s.start_time),
                naive(s.last_activity),
                s.token_count as i64,
                s.token_limit as i64,
                s.health_score,
                s.project_name,
                s.team_id,
            ],
        )
        .unwrap();
    }
    drop(conn);

    SqliteSource::open(&path).expect("database should open read-only")
}

// ============================================
// Reports over the fixture
// ============================================

#[test]
fn test_team_summary_for_platform() {
    let service = MetricsService::new(memory_source());
    let summary = service.team_summary(Some("t1")).unwrap();

    let TeamSummary::Computed(detail) = summary else {
        panic!("expected computed summary");
    };
    assert_eq!(detail.team_name, "Platform");
    assert_eq!(detail.summary.total_sessions, 4);
    assert_eq!(detail.summary.active_sessions, 1);
    assert_eq!(detail.summary.completed_sessions, 2);
    assert_eq!(detail.summary.failed_sessions, 1);
    assert_eq!(detail.summary.total_tokens, 322_850);
    assert_eq!(detail.summary.average_health_score, 69.25);
    assert_eq!(detail.health_distribution.healthy, 2);
    assert_eq!(detail.health_distribution.warning, 1);
    assert_eq!(detail.health_distribution.critical, 1);
    assert_eq!(detail.session_types.get("cursor"), Some(&1));

    let names: Vec<_> = detail.top_projects.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["api", "web"]);
    assert_eq!(detail.top_projects[0].avg_health, 88.5);
}

#[test]
fn test_team_summary_edge_cases() {
    let service = MetricsService::new(memory_source());

    let err = service.team_summary(Some("missing")).unwrap_err();
    assert!(matches!(err, Error::TeamNotFound(_)));

    let idle = serde_json::to_value(service.team_summary(Some("t3")).unwrap()).unwrap();
    assert_eq!(idle["team_name"], "Idle");
    assert_eq!(idle["total_sessions"], 0);
    assert_eq!(idle["message"], "No sessions found");

    let all = service.team_summary(None).unwrap();
    assert_eq!(all.team_name(), "All Teams");
    assert_eq!(all.total_sessions(), 5);
}

#[test]
fn test_health_distribution_deciles() {
    let service = MetricsService::new(memory_source());
    let report = service.health_distribution(Some("t1")).unwrap();

    assert_eq!(report.average_health, 69.25);
    let counted: usize = report.distribution.0.iter().map(|(_, s)| s.count).sum();
    assert_eq!(counted, 4);
    let percent: f64 = report.distribution.0.iter().map(|(_, s)| s.percentage).sum();
    assert!((percent - 100.0).abs() < 0.5);
    for label in ["90-100", "80-89", "60-69", "40-49"] {
        assert_eq!(report.distribution.get(label).unwrap().count, 1, "{label}");
    }
}

#[test]
fn test_token_usage_flags_sessions_near_limit() {
    let service = MetricsService::new(memory_source());
    let report = service.token_usage(Some("t1")).unwrap();

    let approaching = report.sessions_approaching_limit.unwrap();
    let ids: Vec<_> = approaching.iter().map(|a| a.id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s4"]);
    assert_eq!(approaching[0].usage_percentage, 85.0);
    assert_eq!(approaching[1].usage_percentage, 83.3);

    let distribution = report.distribution.unwrap();
    assert_eq!(distribution.get("0-10k"), Some(1));
    assert_eq!(distribution.get("10k-50k"), Some(1));
    assert_eq!(distribution.get("50k-100k"), Some(1));
    assert_eq!(distribution.get("200k+"), Some(1));
}

#[test]
fn test_session_duration_excludes_open_sessions() {
    let service = MetricsService::new(memory_source());
    let report = service.session_duration(Some("t1")).unwrap();

    assert_eq!(report.total_sessions, 3);
    assert_eq!(report.skipped_sessions, 1);
    let stats = report.duration_stats.unwrap();
    assert_eq!(stats.median_minutes, 45.0);
    assert_eq!(stats.average_minutes, 51.7);
    assert_eq!(stats.max_minutes, 90.0);
    assert_eq!(stats.min_minutes, 20.0);
    assert_eq!(report.longest_sessions.unwrap()[0].session_id, "s1");
}

#[test]
fn test_top_sessions_by_tokens() {
    let service = MetricsService::new(memory_source());
    let report = service.top_sessions(None, "token_count", Some(2)).unwrap();
    assert_eq!(report.count, 2);
    assert_eq!(report.sessions[0].id, "s4");
    assert_eq!(report.sessions[1].id, "s3");
    assert_eq!(report.sessions[0].duration_minutes, 20.0);
    assert_eq!(report.sessions[1].duration_minutes, 0.0);
}

#[test]
fn test_trends_over_fixture_window() {
    let service = MetricsService::new(memory_source());
    let now = chrono::DateTime::parse_from_rfc3339("2025-06-04T00:00:00Z")
        .unwrap()
        .with_timezone(&chrono::Utc);

    let report = service.trends_at(Some("t1"), Some(7), now).unwrap();
    let counts: Vec<_> = report.daily_breakdown.iter().map(|d| d.session_count).collect();
    assert_eq!(counts, vec![2, 1, 1]);
    assert_eq!(report.trend, TrendDirection::Decreasing);
    assert_eq!(report.trend_percentage, -50.0);
}

// ============================================
// SQLite source
// ============================================

#[test]
fn test_sqlite_and_snapshot_reports_agree() {
    let dir = TempDir::new().unwrap();
    let from_db = MetricsService::new(sqlite_source(&dir));
    let from_json = MetricsService::new(memory_source());

    for team in [None, Some("t1"), Some("t2"), Some("nobody")] {
        let pairs = [
            (
                serde_json::to_value(from_db.health_distribution(team).unwrap()).unwrap(),
                serde_json::to_value(from_json.health_distribution(team).unwrap()).unwrap(),
            ),
            (
                serde_json::to_value(from_db.token_usage(team).unwrap()).unwrap(),
                serde_json::to_value(from_json.token_usage(team).unwrap()).unwrap(),
            ),
            (
                serde_json::to_value(from_db.session_duration(team).unwrap()).unwrap(),
                serde_json::to_value(from_json.session_duration(team).unwrap()).unwrap(),
            ),
            (
                serde_json::to_value(from_db.projects(team).unwrap()).unwrap(),
                serde_json::to_value(from_json.projects(team).unwrap()).unwrap(),
            ),
        ];
        for (db, json) in pairs {
            assert_eq!(db, json, "team = {team:?}");
        }
    }

    let summary = from_db.team_summary(Some("t2")).unwrap();
    assert_eq!(summary.team_name(), "Research");
}

#[test]
fn test_sqlite_source_never_writes() {
    let dir = TempDir::new().unwrap();
    let source = sqlite_source(&dir);
    let before = std::fs::metadata(dir.path().join("sessions.db")).unwrap().len();

    let service = MetricsService::new(source);
    service.session_stats(None).unwrap();
    service.team_summary(None).unwrap();

    let after = std::fs::metadata(dir.path().join("sessions.db")).unwrap().len();
    assert_eq!(before, after);
}

#[test]
fn test_session_stats() {
    let service = MetricsService::new(memory_source());
    let stats = service.session_stats(None).unwrap();
    assert_eq!(stats.total_sessions, 5);
    assert_eq!(stats.active_sessions, 2);
    assert_eq!(stats.total_tokens, 327_850);
    assert_eq!(stats.average_health, 69.4);

    let source = memory_source();
    let record: &SessionRecord = &source.sessions()[2];
    assert!(record.last_activity.is_none());
}
