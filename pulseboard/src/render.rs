//! Plain-text rendering of reports.

use pulseboard_core::format::{format_minutes, format_tokens};
use pulseboard_core::metrics::report::{
    HealthDistributionReport, ProjectList, SessionDurationReport, SessionStats, TeamSummary,
    TokenUsageReport, TopSessionsReport, TrendsReport,
};
use pulseboard_core::metrics::NO_SESSIONS;
use serde::Serialize;
use std::fmt::{self, Write};

/// Any report the CLI can print.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum Report {
    Summary(TeamSummary),
    Trends(TrendsReport),
    Health(HealthDistributionReport),
    Top(TopSessionsReport),
    Tokens(TokenUsageReport),
    Duration(SessionDurationReport),
    Stats(SessionStats),
    Projects(ProjectList),
}

pub fn render_text(report: &Report, out: &mut impl Write) -> fmt::Result {
    match report {
        Report::Summary(r) => summary(r, out),
        Report::Trends(r) => trends(r, out),
        Report::Health(r) => health(r, out),
        Report::Top(r) => top(r, out),
        Report::Tokens(r) => tokens(r, out),
        Report::Duration(r) => duration(r, out),
        Report::Stats(r) => stats(r, out),
        Report::Projects(r) => projects(r, out),
    }
}

fn summary(report: &TeamSummary, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "Team: {}", report.team_name())?;
    let detail = match report {
        TeamSummary::NoSessions { message, .. } => return writeln!(out, "{message}"),
        TeamSummary::Computed(detail) => detail,
    };

    let s = &detail.summary;
    writeln!(
        out,
        "Sessions: {} ({} active, {} completed, {} failed)",
        s.total_sessions, s.active_sessions, s.completed_sessions, s.failed_sessions
    )?;
    writeln!(
        out,
        "Tokens:   {} total, {:.2} avg per session",
        format_tokens(s.total_tokens),
        s.average_tokens_per_session
    )?;
    writeln!(out, "Health:   {:.2} avg", s.average_health_score)?;

    let bands = &detail.health_distribution;
    writeln!(out, "  healthy   {:>5} ({:.1}%)", bands.healthy, bands.percentages.healthy)?;
    writeln!(out, "  warning   {:>5} ({:.1}%)", bands.warning, bands.percentages.warning)?;
    writeln!(out, "  critical  {:>5} ({:.1}%)", bands.critical, bands.percentages.critical)?;

    writeln!(out, "Session types:")?;
    for (session_type, count) in &detail.session_types {
        writeln!(out, "  {session_type:<16} {count:>5}")?;
    }

    if !detail.top_projects.is_empty() {
        writeln!(out, "Top projects:")?;
        for project in &detail.top_projects {
            writeln!(
                out,
                "  {:<24} {:>5} sessions  {:>8} tokens  {:>6.2} health",
                project.name,
                project.session_count,
                format_tokens(project.total_tokens),
                project.avg_health
            )?;
        }
    }
    Ok(())
}

fn trends(report: &TrendsReport, out: &mut impl Write) -> fmt::Result {
    writeln!(
        out,
        "Last {} days: {} sessions, trend {} ({:+.1}%)",
        report.period_days, report.total_sessions, report.trend, report.trend_percentage
    )?;
    for day in &report.daily_breakdown {
        writeln!(
            out,
            "  {}  {:>5} sessions  {:>8} tokens  {:>6.2} health  ({} active, {} completed, {} failed)",
            day.date,
            day.session_count,
            format_tokens(day.total_tokens),
            day.avg_health,
            day.active_count,
            day.completed_count,
            day.failed_count
        )?;
    }
    Ok(())
}

fn health(report: &HealthDistributionReport, out: &mut impl Write) -> fmt::Result {
    if let Some(message) = report.message {
        return writeln!(out, "{message}");
    }
    writeln!(
        out,
        "{} sessions, average health {:.2}",
        report.total_sessions, report.average_health
    )?;
    for (label, share) in &report.distribution.0 {
        writeln!(out, "  {label:>6}  {:>5} ({:.1}%)", share.count, share.percentage)?;
    }
    Ok(())
}

fn top(report: &TopSessionsReport, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "Top {} sessions by {}", report.count, report.metric)?;
    for session in &report.sessions {
        let started = session
            .start_time
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "  {:<12} {:<12} {:<10} {:>6.1} health  {:>8} tokens  {:>8}  {}  {}",
            session.id,
            session.session_type,
            session.status,
            session.health_score,
            format_tokens(session.token_count),
            format_minutes(session.duration_minutes),
            started,
            session.project_name.as_deref().unwrap_or("(no project)")
        )?;
    }
    Ok(())
}

fn tokens(report: &TokenUsageReport, out: &mut impl Write) -> fmt::Result {
    let (Some(stats), Some(distribution)) = (&report.token_stats, &report.distribution) else {
        return writeln!(out, "{}", report.message.unwrap_or(NO_SESSIONS));
    };

    writeln!(
        out,
        "{} sessions, {} tokens total ({:.2} avg, max {}, min {})",
        report.total_sessions,
        format_tokens(stats.total_tokens),
        stats.average_tokens,
        stats.max_tokens,
        stats.min_tokens
    )?;
    for (label, count) in &distribution.0 {
        writeln!(out, "  {label:>9}  {count:>5}")?;
    }

    let approaching = report.sessions_approaching_limit.as_deref().unwrap_or_default();
    if !approaching.is_empty() {
        writeln!(out, "Approaching limit:")?;
        for session in approaching {
            writeln!(
                out,
                "  {:<12} {:>5.1}%  {} / {}  {}",
                session.id,
                session.usage_percentage,
                session.token_count,
                session.token_limit,
                session.project_name.as_deref().unwrap_or("(no project)")
            )?;
        }
    }
    Ok(())
}

fn duration(report: &SessionDurationReport, out: &mut impl Write) -> fmt::Result {
    let Some(stats) = &report.duration_stats else {
        return writeln!(out, "{}", report.message.unwrap_or(NO_SESSIONS));
    };

    writeln!(
        out,
        "{} sessions: avg {:.1} min, median {:.1} min, max {:.1} min, min {:.1} min",
        report.total_sessions,
        stats.average_minutes,
        stats.median_minutes,
        stats.max_minutes,
        stats.min_minutes
    )?;
    if report.skipped_sessions > 0 {
        writeln!(out, "  ({} sessions without a usable duration)", report.skipped_sessions)?;
    }

    writeln!(out, "Longest sessions:")?;
    for session in report.longest_sessions.as_deref().unwrap_or_default() {
        writeln!(
            out,
            "  {:<12} {:>8}  {:<10} {}",
            session.session_id,
            format_minutes(session.duration_minutes),
            session.status,
            session.project_name.as_deref().unwrap_or("(no project)")
        )?;
    }
    Ok(())
}

fn stats(report: &SessionStats, out: &mut impl Write) -> fmt::Result {
    writeln!(out, "Sessions:       {}", report.total_sessions)?;
    writeln!(out, "Active:         {}", report.active_sessions)?;
    writeln!(out, "Tokens:         {}", format_tokens(report.total_tokens))?;
    writeln!(out, "Average health: {:.2}", report.average_health)
}

fn projects(report: &ProjectList, out: &mut impl Write) -> fmt::Result {
    if report.projects.is_empty() {
        return writeln!(out, "No projects found");
    }
    for project in &report.projects {
        writeln!(out, "  {:<32} {:>5}", project.project_name, project.session_count)?;
    }
    Ok(())
}
