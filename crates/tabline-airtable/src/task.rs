//! Extraction tasks and the task file

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value;

use crate::api::TableQuery;
use crate::transform::Policy;

/// One entry of `extractionTasks`, as written in the task file.
///
/// Nothing is required at this stage; [`TaskSpec::validate`] decides.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskSpec {
    pub task_name: Option<String>,
    pub base_id: Option<String>,
    pub table_id: Option<String>,
    pub view_id: Option<String>,
    pub output_file: Option<PathBuf>,
    #[serde(default)]
    pub transform: Policy,
}

/// A task that has everything needed to run
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub query: TableQuery,
    pub output_file: PathBuf,
    pub policy: Policy,
}

/// Task skipped before it runs
#[derive(Debug, Clone, PartialEq)]
pub enum InvalidTask {
    /// Required fields absent or blank
    Missing {
        name: String,
        fields: Vec<&'static str>,
    },
    /// Entry that does not decode as a task (wrong type, unknown transform)
    Malformed { name: String, message: String },
}

impl InvalidTask {
    pub fn name(&self) -> &str {
        match self {
            Self::Missing { name, .. } | Self::Malformed { name, .. } => name,
        }
    }
}

impl std::fmt::Display for InvalidTask {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Missing { name, fields } => {
                write!(f, "task '{name}': missing {}", fields.join(", "))
            }
            Self::Malformed { name, message } => {
                write!(f, "task '{name}': malformed entry: {message}")
            }
        }
    }
}

impl std::error::Error for InvalidTask {}

/// A task as handed to the runner: either built in code or still the raw
/// task-file entry, decoded only when its turn comes.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskEntry {
    Spec(TaskSpec),
    Raw(Value),
}

impl From<TaskSpec> for TaskEntry {
    fn from(spec: TaskSpec) -> Self {
        Self::Spec(spec)
    }
}

impl TaskEntry {
    /// Decode (for raw entries) and validate. `position` is 1-based.
    pub fn validate(self, position: usize) -> Result<Task, InvalidTask> {
        let spec = match self {
            Self::Spec(spec) => spec,
            Self::Raw(value) => {
                let name = value
                    .get("taskName")
                    .and_then(Value::as_str)
                    .map(String::from);
                serde_json::from_value(value).map_err(|e| InvalidTask::Malformed {
                    name: non_empty(name).unwrap_or_else(|| default_name(position)),
                    message: e.to_string(),
                })?
            }
        };
        spec.validate(position)
    }
}

fn default_name(position: usize) -> String {
    format!("Unnamed Task {position}")
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

impl TaskSpec {
    /// Check required fields. `position` is 1-based and names unnamed tasks.
    pub fn validate(self, position: usize) -> Result<Task, InvalidTask> {
        let name = non_empty(self.task_name).unwrap_or_else(|| default_name(position));
        let base_id = non_empty(self.base_id);
        let table_id = non_empty(self.table_id);
        let output_file = self.output_file.filter(|p| !p.as_os_str().is_empty());

        match (base_id, table_id, output_file) {
            (Some(base_id), Some(table_id), Some(output_file)) => Ok(Task {
                name,
                query: TableQuery {
                    base_id,
                    table_id,
                    view_id: non_empty(self.view_id),
                },
                output_file,
                policy: self.transform,
            }),
            (base_id, table_id, output_file) => {
                let missing = [
                    ("baseId", base_id.is_none()),
                    ("tableId", table_id.is_none()),
                    ("outputFile", output_file.is_none()),
                ]
                .into_iter()
                .filter_map(|(field, absent)| absent.then_some(field))
                .collect();
                Err(InvalidTask::Missing {
                    name,
                    fields: missing,
                })
            }
        }
    }
}

impl Task {
    /// Output path; relative paths resolve against `root`
    pub fn resolve_output(&self, root: &Path) -> PathBuf {
        if self.output_file.is_absolute() {
            self.output_file.clone()
        } else {
            root.join(&self.output_file)
        }
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct TaskFile {
    #[serde(default)]
    extraction_tasks: Value,
}

/// Parse task file content.
///
/// A missing or `null` `extractionTasks` yields no tasks; any other
/// non-array value is an error. Entries stay raw so that one bad entry
/// only skips its own task.
pub fn parse_tasks(json: &str) -> anyhow::Result<Vec<TaskEntry>> {
    let file: TaskFile = serde_json::from_str(json).context("Could not decode task file JSON")?;
    match file.extraction_tasks {
        Value::Null => Ok(Vec::new()),
        Value::Array(items) => Ok(items.into_iter().map(TaskEntry::Raw).collect()),
        _ => anyhow::bail!("'extractionTasks' should be a list"),
    }
}

/// Read and parse a task file
pub fn load_tasks(path: &Path) -> anyhow::Result<Vec<TaskEntry>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Cannot read task file: {}", path.display()))?;
    let entries =
        parse_tasks(&content).with_context(|| format!("Invalid task file: {}", path.display()))?;
    log::info!("Loaded {} task(s) from {}", entries.len(), path.display());
    Ok(entries)
}
