use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::AppConfig;
use crate::extract::Extractor;
use crate::migrate::filter::filter_tasks;
use crate::migrate::{MigrationReport, Migrator, Step, StepStatus};
use crate::providers::jira::JiraClient;
use crate::providers::notion::NotionClient;
use crate::store;

pub const DEFAULT_BATCH_FILE: &str = "tasks_notion.json";

#[derive(Debug, Parser)]
#[command(name = "notion-jira")]
#[command(about = "Migrate tasks from a Notion database into a Jira board")]
#[command(version)]
pub struct Cli {
    /// Path to TOML config file [default: ~/.notion-jira/config.toml]
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log verbosity: debug, info, warn, error
    #[arg(long, default_value = "info", global = true)]
    pub verbosity: String,

    /// Log format: text or json
    #[arg(long, default_value = "text", global = true)]
    pub log_format: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Extract and normalize all tasks into a batch file
    Extract {
        /// Override the Notion database id
        #[arg(long)]
        database_id: Option<String>,

        #[arg(short, long, default_value = DEFAULT_BATCH_FILE)]
        output: PathBuf,
    },

    /// Load a batch file, filter it and create the Jira issues
    Migrate {
        #[arg(short, long, default_value = DEFAULT_BATCH_FILE)]
        input: PathBuf,

        /// Map and log every task without writing to Jira
        #[arg(long)]
        dry_run: bool,
    },
}

pub async fn handle_extract(
    config: &AppConfig,
    database_id: Option<String>,
    output: &Path,
) -> Result<()> {
    let mut config = config.clone();
    if let Some(id) = database_id {
        config.notion.database_id = id;
    }
    config.validate_notion()?;

    let client = NotionClient::new(&config.notion)?;
    let extractor = Extractor::new(&client);

    let (pages, meta) = extractor
        .extract_all_tasks(&config.notion.database_id)
        .await
        .context("Notion extraction failed")?;
    if !meta.data_sources.is_empty() {
        info!(data_sources = ?meta.data_sources, "queried data sources");
    }
    let tasks = extractor
        .normalize_tasks(&pages)
        .await
        .context("Failed to fetch task content")?;

    store::save_tasks(output, &tasks)
        .with_context(|| format!("Failed to write {}", output.display()))?;

    println!("Extracted {} tasks using {}.", meta.count, meta.mode);
    println!(
        "Wrote {} normalized tasks to {}",
        tasks.len(),
        output.display()
    );
    Ok(())
}

pub async fn handle_migrate(config: &AppConfig, input: &Path, dry_run: bool) -> Result<()> {
    config.validate_jira()?;

    let tasks = store::load_tasks(input)
        .with_context(|| format!("Failed to read {}", input.display()))?;
    let tasks = filter_tasks(tasks, config.migration.archive_cutoff);
    println!("After filter: {} tasks", tasks.len());

    let client = JiraClient::new(&config.jira)?;
    let report = Migrator::new(&client, config)
        .migrate_tasks(&tasks, dry_run)
        .await
        .context("Migration aborted")?;

    print_report(&report);
    Ok(())
}

fn print_report(report: &MigrationReport) {
    for line in report_lines(report) {
        println!("{line}");
    }
    println!("\nCreated: {:?}", report.created);
}

/// One progress line per task in input order, followed by its failed steps.
fn report_lines(report: &MigrationReport) -> Vec<String> {
    let total = report.total;
    let mut entries: Vec<(usize, Vec<String>)> = Vec::new();

    for outcome in &report.outcomes {
        let moved = match outcome.status(Step::Transition) {
            Some(StepStatus::Done) => " (transitioned)",
            _ => "",
        };
        let mut lines = vec![format!(
            "[{}/{}] {} created={}{}",
            outcome.index, total, outcome.summary, outcome.key, moved
        )];
        if outcome.has_failures() {
            for (step, status) in &outcome.steps {
                if let StepStatus::Failed(reason) = status {
                    lines.push(format!("    {step:?} failed: {reason}"));
                }
            }
        }
        entries.push((outcome.index, lines));
    }
    for rejected in &report.rejected {
        entries.push((
            rejected.index,
            vec![format!(
                "[{}/{}] skipped \"{}\": {}",
                rejected.index, total, rejected.title, rejected.reason
            )],
        ));
    }

    entries.sort_by_key(|(index, _)| *index);
    entries.into_iter().flat_map(|(_, lines)| lines).collect()
}
