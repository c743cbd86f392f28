//! Reporting operations over a record source.

use super::report::{
    HealthDistributionReport, ProjectList, SessionDurationReport, SessionStats, TeamSummary,
    TokenUsageReport, TopSessionsReport, TrendsReport,
};
use crate::config::MetricsConfig;
use crate::error::{Error, Result};
use crate::source::{RecordQuery, SessionSource};
use crate::types::SessionRecord;
use chrono::{DateTime, Duration, Utc};

/// Team name reported when no team filter is given.
pub const ALL_TEAMS: &str = "All Teams";

/// Computes dashboard reports from a [`SessionSource`].
///
/// Every operation fetches one snapshot at call start and computes over it
/// without touching the source again. The service holds no mutable state,
/// so a shared reference can serve concurrent callers.
pub struct MetricsService<S> {
    source: S,
    config: MetricsConfig,
}

impl<S: SessionSource> MetricsService<S> {
    /// Create a service with default report settings.
    pub fn new(source: S) -> Self {
        Self::with_config(source, MetricsConfig::default())
    }

    pub fn with_config(source: S, config: MetricsConfig) -> Self {
        Self { source, config }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn config(&self) -> &MetricsConfig {
        &self.config
    }

    fn snapshot(&self, query: &RecordQuery, report: &'static str) -> Result<Vec<SessionRecord>> {
        let records = self.source.fetch_sessions(query)?;
        tracing::debug!(
            report,
            team_id = query.team_id.as_deref().unwrap_or("*"),
            records = records.len(),
            "Computing report"
        );
        Ok(records)
    }

    /// Overview for one team, or for every team when `team_id` is `None`.
    ///
    /// Returns [`Error::TeamNotFound`] when a named team does not exist.
    pub fn team_summary(&self, team_id: Option<&str>) -> Result<TeamSummary> {
        let team_name = match team_id {
            Some(id) => match self.source.find_team(id)? {
                Some(team) => team.name,
                None => {
                    tracing::warn!(team_id = id, "Team summary requested for unknown team");
                    return Err(Error::TeamNotFound(id.to_string()));
                }
            },
            None => ALL_TEAMS.to_string(),
        };

        let records = self.snapshot(&RecordQuery::for_team(team_id), "team_summary")?;
        Ok(TeamSummary::from_records(team_name, &records, &self.config))
    }

    /// Daily activity over the trailing `days` (default from config).
    pub fn trends(&self, team_id: Option<&str>, days: Option<u32>) -> Result<TrendsReport> {
        self.trends_at(team_id, days, Utc::now())
    }

    /// [`trends`](Self::trends) with an explicit clock.
    pub fn trends_at(
        &self,
        team_id: Option<&str>,
        days: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<TrendsReport> {
        let days = days.unwrap_or(self.config.trend_days);
        let cutoff = now
            .checked_sub_signed(Duration::days(i64::from(days)))
            .unwrap_or(DateTime::<Utc>::MIN_UTC);
        let query = RecordQuery::for_team(team_id).since(cutoff);

        let records = self.snapshot(&query, "trends")?;
        Ok(TrendsReport::from_records(days, &records))
    }

    pub fn health_distribution(&self, team_id: Option<&str>) -> Result<HealthDistributionReport> {
        let records = self.snapshot(&RecordQuery::for_team(team_id), "health_distribution")?;
        Ok(HealthDistributionReport::from_records(&records))
    }

    /// Sessions ranked by `metric` (`health_score` or `token_count`).
    ///
    /// Unknown metric names rank by health score; the name is echoed as given.
    pub fn top_sessions(
        &self,
        team_id: Option<&str>,
        metric: &str,
        limit: Option<usize>,
    ) -> Result<TopSessionsReport> {
        let limit = limit.unwrap_or(self.config.top_sessions_limit);
        let records = self.snapshot(&RecordQuery::for_team(team_id), "top_sessions")?;
        Ok(TopSessionsReport::from_records(&records, metric, limit))
    }

    pub fn token_usage(&self, team_id: Option<&str>) -> Result<TokenUsageReport> {
        let records = self.snapshot(&RecordQuery::for_team(team_id), "token_usage")?;
        Ok(TokenUsageReport::from_records(&records, &self.config))
    }

    pub fn session_duration(&self, team_id: Option<&str>) -> Result<SessionDurationReport> {
        let records = self.snapshot(&RecordQuery::for_team(team_id), "session_duration")?;
        Ok(SessionDurationReport::from_records(&records, &self.config))
    }

    pub fn session_stats(&self, team_id: Option<&str>) -> Result<SessionStats> {
        let records = self.snapshot(&RecordQuery::for_team(team_id), "session_stats")?;
        Ok(SessionStats::from_records(&records))
    }

    pub fn projects(&self, team_id: Option<&str>) -> Result<ProjectList> {
        let records = self.snapshot(&RecordQuery::for_team(team_id), "projects")?;
        Ok(ProjectList::from_records(&records))
    }
}
