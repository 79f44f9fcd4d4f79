//! Main runner: validate credential, then run tasks one after another

use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::Result;
use tabline_core::{FetchError, ProgressContext, WriteError, write_json};

use crate::api::{ApiToken, MissingCredential, PageSource};
use crate::fetch::fetch_all;
use crate::task::{Task, TaskEntry};
use crate::transform::{LinkRule, Output, transform};

/// Settings shared by every task of a run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Base for relative `outputFile` paths
    pub root: PathBuf,
    /// Rules for tasks using the graph policy
    pub link_rules: Vec<LinkRule>,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            link_rules: LinkRule::defaults(),
        }
    }
}

/// Run execution summary
#[derive(Debug, Default)]
pub struct Summary {
    pub total_tasks: usize,
    pub completed_tasks: usize,
    pub skipped_tasks: usize,
    pub failed_tasks: usize,
    /// Records written across completed tasks
    pub total_records: usize,
    pub elapsed: Duration,
}

/// Failure of one task. The batch goes on.
#[derive(Debug)]
pub enum TaskError {
    Fetch(FetchError),
    Write(WriteError),
}

impl std::fmt::Display for TaskError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fetch(e) => write!(f, "fetch failed: {e}"),
            Self::Write(e) => write!(f, "write failed: {e}"),
        }
    }
}

impl std::error::Error for TaskError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Fetch(e) => Some(e),
            Self::Write(e) => Some(e),
        }
    }
}

impl From<FetchError> for TaskError {
    fn from(e: FetchError) -> Self {
        Self::Fetch(e)
    }
}

impl From<WriteError> for TaskError {
    fn from(e: WriteError) -> Self {
        Self::Write(e)
    }
}

/// Run a batch of tasks.
///
/// The token is checked before anything else: without one the run stops
/// with [`MissingCredential`] and `connect` is never called, so no request
/// goes out. Otherwise `connect` builds the page source once and each task
/// runs in order. Invalid tasks (missing fields or a malformed entry) are
/// skipped with a warning and failed tasks are logged; neither stops the batch.
pub fn run<S, F>(
    token: Option<&str>,
    connect: F,
    entries: Vec<TaskEntry>,
    options: &RunOptions,
    progress: &ProgressContext,
) -> Result<Summary>
where
    S: PageSource,
    F: FnOnce(ApiToken) -> Result<S>,
{
    let start = Instant::now();

    let token = token.ok_or(MissingCredential).and_then(ApiToken::new)?;

    if entries.is_empty() {
        log::warn!("No extraction tasks configured");
        return Ok(Summary {
            elapsed: start.elapsed(),
            ..Default::default()
        });
    }

    let source = connect(token)?;
    let mut summary = Summary {
        total_tasks: entries.len(),
        ..Default::default()
    };

    for (i, entry) in entries.into_iter().enumerate() {
        let task = match entry.validate(i + 1) {
            Ok(task) => task,
            Err(e) => {
                log::warn!("Skipping {e}");
                summary.skipped_tasks += 1;
                continue;
            }
        };

        log::info!("--- Running Task: {} ---", task.name);
        match run_task(&source, &task, options, progress) {
            Ok(count) => {
                summary.completed_tasks += 1;
                summary.total_records += count;
                log::info!("--- Task: {} Completed ---", task.name);
            }
            Err(e) => {
                summary.failed_tasks += 1;
                log::error!(
                    "Task '{}' ({}/{}) failed: {e}",
                    task.name,
                    task.query.base_id,
                    task.query.table_id
                );
            }
        }
    }

    summary.elapsed = start.elapsed();

    log::info!("=== Extraction Summary ===");
    log::info!(
        "Tasks: {}/{} completed ({} skipped, {} failed)",
        summary.completed_tasks,
        summary.total_tasks,
        summary.skipped_tasks,
        summary.failed_tasks
    );
    log::info!("Records: {}", summary.total_records);
    log::info!("Time: {:.1}s", summary.elapsed.as_secs_f64());

    Ok(summary)
}

/// Fetch, transform and write one task. Returns the number of records.
pub fn run_task<S: PageSource>(
    source: &S,
    task: &Task,
    options: &RunOptions,
    progress: &ProgressContext,
) -> Result<usize, TaskError> {
    log::info!("Fetching data from {} as {}...", task.query, task.policy);

    let pb = progress.task_line(&task.name);
    let fetched = fetch_all(source, &task.query, &pb);
    pb.finish_and_clear();
    let records = fetched?;
    let count = records.len();

    let output = transform(records, task.policy, &options.link_rules);
    if let Output::Graph(graph) = &output {
        log::info!(
            "{}: {} nodes, {} links",
            task.name,
            graph.nodes.len(),
            graph.links.len()
        );
    }

    let path = task.resolve_output(&options.root);
    write_json(&path, &output)?;
    log::info!("Saved {count} records to {}", path.display());

    Ok(count)
}
