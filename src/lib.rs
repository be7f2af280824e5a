pub mod bracket;
pub mod cli;
pub mod config;
pub mod database;
pub mod domain;
pub mod errors;
pub mod scoring;
pub mod services;

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser};
use clap_complete::Shell;
use cli::Cli;
use colored::Colorize;
use log::info;

use crate::cli::Command;
use crate::config::settings::AppConfig;
use crate::errors::RunOutcome;
use crate::scoring::SeededJitter;
use crate::services::{DailyScoreProcessor, DaySummary, IngestionService, MatchupSummary, WeeklyMatchupResolver};

pub fn interpret() -> Command {
    let cli = Cli::parse();
    cli.command
}

pub fn handle_init() -> Result<()> {
    let config = AppConfig::from_env();
    let pool = database::create_pool(&config.persistence)?;
    let conn = database::get_connection(&pool)?;
    database::setup::init_schema(&conn)?;
    info!("Schema ready at {}", config.persistence.database_path);
    Ok(())
}

pub fn handle_import(path: &Path) -> Result<()> {
    let config = AppConfig::from_env();
    let pool = database::create_pool(&config.persistence)?;
    let summary = IngestionService::new(pool).run(path)?;
    println!(
        "{} {} new scores from {} events ({} skipped)",
        "Imported".green().bold(),
        summary.scores_inserted,
        summary.events_read,
        summary.events_skipped
    );
    Ok(())
}

/// What one `process` invocation did. `matchups` is set on week boundaries.
#[derive(Debug, Clone, PartialEq)]
pub struct DayReport {
    pub scoring: RunOutcome<DaySummary>,
    pub matchups: Option<RunOutcome<MatchupSummary>>,
}

pub fn handle_process(day: u32, seed: Option<u64>) -> Result<()> {
    let report = process_day(AppConfig::from_env(), day, seed)?;
    report_day(&report.scoring);
    if let Some(matchups) = &report.matchups {
        report_matchups(matchups);
    }
    Ok(())
}

/// Scores `day`, then resolves matchups when the day closes a week. The
/// resolver runs even when there was nothing to score that day.
pub fn process_day(config: AppConfig, day: u32, seed: Option<u64>) -> Result<DayReport> {
    let run_timeout = config.persistence.run_timeout;
    let pool = database::create_pool(&config.persistence)?;

    let jitter = seed.map_or_else(SeededJitter::from_entropy, SeededJitter::new);
    info!("Jitter seed for day {}: {}", day, jitter.seed());

    let processor = DailyScoreProcessor::new(config.clone(), pool.clone(), Box::new(jitter));
    let resolver = WeeklyMatchupResolver::new(config, pool);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async move {
        let scoring = with_run_timeout(run_timeout, "Daily scoring", move || processor.run(day)).await?;

        let matchups = if day % 7 == 0 {
            Some(with_run_timeout(run_timeout, "Matchup resolution", move || resolver.run(day)).await?)
        } else {
            None
        };
        Ok(DayReport { scoring, matchups })
    });
    runtime.shutdown_background();
    result
}

pub fn handle_resolve_matchups(day: u32) -> Result<()> {
    let config = AppConfig::from_env();
    let run_timeout = config.persistence.run_timeout;
    let pool = database::create_pool(&config.persistence)?;
    let resolver = WeeklyMatchupResolver::new(config, pool);

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(async move {
        let outcome = with_run_timeout(run_timeout, "Matchup resolution", move || resolver.run(day)).await?;
        report_matchups(&outcome);
        Ok(())
    });
    runtime.shutdown_background();
    result
}

pub fn handle_completions(shell: Shell) -> Result<()> {
    let mut command = Cli::command();
    let name = command.get_name().to_string();
    clap_complete::generate(shell, &mut command, name, &mut std::io::stdout());
    Ok(())
}

/// Runs a blocking job as one unit. On timeout the job is abandoned and the
/// caller retries the whole day.
async fn with_run_timeout<T, F>(timeout: Duration, what: &str, job: F) -> Result<T>
where
    F: FnOnce() -> Result<T> + Send + 'static,
    T: Send + 'static,
{
    let task = tokio::task::spawn_blocking(job);
    match tokio::time::timeout(timeout, task).await {
        Ok(joined) => joined.with_context(|| format!("{} task failed", what))?,
        Err(_) => bail!("{} did not finish within {}s", what, timeout.as_secs()),
    }
}

fn report_day(outcome: &RunOutcome<DaySummary>) {
    match outcome {
        RunOutcome::Completed(summary) => println!(
            "{} day {}: {} corps in {} shows, {} awards, {} coins",
            "Scored".green().bold(),
            summary.day,
            summary.corps_scored,
            summary.shows_scored,
            summary.awards_written,
            summary.currency_awarded
        ),
        RunOutcome::Skipped(reason) => println!("{} {}", "Skipped:".yellow().bold(), reason),
    }
}

fn report_matchups(outcome: &RunOutcome<MatchupSummary>) {
    match outcome {
        RunOutcome::Completed(summary) => println!(
            "{} week {}: {} matchups ({} byes, {} ties), {} already decided",
            "Resolved".green().bold(),
            summary.week,
            summary.resolved,
            summary.byes,
            summary.ties,
            summary.skipped
        ),
        RunOutcome::Skipped(reason) => println!("{} {}", "Skipped:".yellow().bold(), reason),
    }
}
