//! pulseboard - team dashboard metrics for AI coding sessions
//!
//! Reads session records from the dashboard database (or a JSON snapshot)
//! and prints one report per invocation.

mod render;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use pulseboard_core::{
    Config, Error as CoreError, MemorySource, MetricsService, SessionSource, SqliteSource,
};
use render::Report;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "pulseboard")]
#[command(about = "Team dashboard metrics for AI coding sessions")]
#[command(version)]
struct Cli {
    /// Restrict the report to one team
    #[arg(short, long, global = true)]
    team: Option<String>,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,

    /// Dashboard database to read (overrides config)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// JSON snapshot to read instead of a database
    #[arg(long, global = true, conflicts_with = "db")]
    snapshot: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Command {
    /// Team overview: counters, health bands, session types, top projects
    Summary,
    /// Daily activity and its trend over a trailing window
    Trends {
        /// Days of history to analyze (default from config)
        #[arg(short, long)]
        days: Option<u32>,
    },
    /// Health score distribution by decile
    Health,
    /// Top sessions ranked by a metric
    Top {
        /// Ranking metric: health_score or token_count
        #[arg(short, long, default_value = "health_score")]
        metric: String,

        /// Number of sessions (default from config)
        #[arg(short, long)]
        limit: Option<usize>,
    },
    /// Token usage statistics and sessions near their limit
    Tokens,
    /// Session duration statistics
    Duration,
    /// Quick session counters
    Stats,
    /// Every project with its session count
    Projects,
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        pulseboard_core::logging::init(&config.logging).context("failed to initialize logging")?;

    let source = open_source(&cli, &config)?;
    let service = MetricsService::with_config(source, config.metrics.clone());

    let team = cli.team.as_deref();
    let report = match &cli.command {
        Command::Summary => service.team_summary(team).map(Report::Summary),
        Command::Trends { days } => service.trends(team, *days).map(Report::Trends),
        Command::Health => service.health_distribution(team).map(Report::Health),
        Command::Top { metric, limit } => service
            .top_sessions(team, metric, *limit)
            .map(Report::Top),
        Command::Tokens => service.token_usage(team).map(Report::Tokens),
        Command::Duration => service.session_duration(team).map(Report::Duration),
        Command::Stats => service.session_stats(team).map(Report::Stats),
        Command::Projects => service.projects(team).map(Report::Projects),
    };

    match report {
        Ok(report) => {
            print_report(&report, cli.format)?;
            Ok(ExitCode::SUCCESS)
        }
        Err(err) if err.is_not_found() => {
            tracing::warn!(error = %err, "Report rejected");
            print_error(&err, cli.format)?;
            Ok(ExitCode::FAILURE)
        }
        Err(err) => {
            tracing::error!(error = %err, "Report failed");
            Err(anyhow::Error::new(err).context("failed to compute report"))
        }
    }
}

/// Pick the record source: CLI flags first, then config.
fn open_source(cli: &Cli, config: &Config) -> Result<Box<dyn SessionSource>> {
    let snapshot = cli
        .snapshot
        .clone()
        .or_else(|| cli.db.is_none().then(|| config.source.snapshot.clone()).flatten());

    if let Some(path) = snapshot {
        let source = MemorySource::from_snapshot_file(&path)
            .with_context(|| format!("failed to load snapshot {}", path.display()))?;
        return Ok(Box::new(source));
    }

    let db_path = cli
        .db
        .clone()
        .unwrap_or_else(|| config.source.database_path());
    let source = SqliteSource::open(&db_path).context("failed to open dashboard database")?;
    Ok(Box::new(source))
}

fn print_report(report: &Report, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(report).context("failed to serialize report")?;
            println!("{json}");
        }
        OutputFormat::Text => {
            let mut out = String::new();
            render::render_text(report, &mut out).context("failed to render report")?;
            print!("{out}");
        }
    }
    Ok(())
}

fn print_error(err: &CoreError, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let payload = serde_json::json!({ "error": err.public_message() });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload).context("failed to serialize error")?
            );
        }
        OutputFormat::Text => eprintln!("Error: {}", err.public_message()),
    }
    Ok(())
}
