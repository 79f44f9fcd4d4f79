//! Subcommands

pub mod fetch;
pub mod run;

use std::path::PathBuf;

use anyhow::Result;
use comfy_table::{Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL};
use tabline_airtable::{AirtableClient, ApiConfig, RunOptions, Summary, TaskEntry};
use tabline_core::ProgressContext;

use crate::config::Config;

/// Run tasks against the configured API, print the summary, and fail
/// when any task failed.
fn execute(
    title: &str,
    tasks: Vec<TaskEntry>,
    root: PathBuf,
    config: &Config,
    progress: &ProgressContext,
) -> Result<()> {
    let options = RunOptions {
        root,
        link_rules: config.graph.rules.clone(),
    };
    let base_url = config.api.base_url.clone();

    let summary = tabline_airtable::run(
        config.api.token.as_deref(),
        |token| AirtableClient::new(ApiConfig { base_url, token }),
        tasks,
        &options,
        progress,
    )?;

    print_summary(title, &summary);

    if summary.failed_tasks > 0 {
        anyhow::bail!("{} task(s) failed", summary.failed_tasks);
    }
    Ok(())
}

/// Print a key-value summary table on stderr
fn print_summary(title: &str, summary: &Summary) {
    let rows = [
        (
            "Tasks",
            format!(
                "{}/{} ({} skipped, {} failed)",
                summary.completed_tasks,
                summary.total_tasks,
                summary.skipped_tasks,
                summary.failed_tasks
            ),
        ),
        ("Records", summary.total_records.to_string()),
        ("Time", format!("{:.1}s", summary.elapsed.as_secs_f64())),
    ];

    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(vec![
            Cell::new(title).fg(Color::Cyan),
            Cell::new("Value").fg(Color::Cyan),
        ]);
    for (label, value) in rows {
        table.add_row(vec![Cell::new(label), Cell::new(value)]);
    }
    eprintln!("\n{table}");
}
