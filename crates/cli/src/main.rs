//! Review Hours CLI
//!
//! Works on GitHub payloads that were already fetched to disk; all logs go
//! to stderr and the report to stdout.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use common::models::PullRequest;
use github::{timeline, GitHubPullRequest, GitHubReviewComment};
use processor::timezone::parse_zone;
use processor::{diff_working_hours, PrStatsEvaluator, UserTimeZone};
use tracing::info;

mod report;

#[derive(Parser, Debug)]
#[command(name = "review-hours", version, about = "Working-hours review statistics for pull requests")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Review statistics for one merged PR
    Stats {
        /// PR payload (`GET /repos/{owner}/{repo}/pulls/{number}`)
        #[arg(long)]
        pr: PathBuf,
        /// Timeline payload (`GET /repos/{owner}/{repo}/issues/{number}/timeline`)
        #[arg(long)]
        timeline: PathBuf,
        /// Diff comments payload (`GET /repos/{owner}/{repo}/pulls/{number}/comments`)
        #[arg(long)]
        comments: Option<PathBuf>,
    },
    /// Working time between two RFC 3339 instants
    Diff {
        #[arg(long)]
        start: DateTime<Utc>,
        #[arg(long)]
        end: DateTime<Utc>,
        /// IANA zone id or city name, defaults to DEFAULT_TIMEZONE
        #[arg(long)]
        zone: Option<String>,
    },
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cli=info".parse()?)
                .add_directive("processor=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = common::Config::from_env()?;

    let output = match cli.command {
        Command::Stats {
            pr,
            timeline,
            comments,
        } => {
            let pr: GitHubPullRequest = read_json(&pr)?;
            let events = timeline::parse_timeline(&read_file(&timeline)?)
                .with_context(|| format!("Invalid timeline in {}", timeline.display()))?;
            let comments: Vec<GitHubReviewComment> = match comments {
                Some(path) => read_json(&path)?,
                None => Vec::new(),
            };

            let pr: PullRequest = pr.into();
            let evaluator = PrStatsEvaluator::new(
                UserTimeZone::from_config(&config)?,
                config.ignored_users.iter().cloned(),
            );
            info!("Analyzing {} timeline events", events.len());
            let stats = evaluator.evaluate(&pr, &events, &comments)?;
            report::pr_stats(&stats)
        }
        Command::Diff { start, end, zone } => {
            let zone = parse_zone(zone.as_deref().unwrap_or(&config.default_timezone))?;
            let working = diff_working_hours(start, end, zone)?;
            report::working_time(start, end, zone, working)
        }
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn read_file(path: &Path) -> anyhow::Result<String> {
    fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let raw = read_file(path)?;
    serde_json::from_str(&raw).with_context(|| format!("Invalid JSON in {}", path.display()))
}
