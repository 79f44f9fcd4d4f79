//! End-to-end runs against an in-memory page source
//!
//! Run with: cargo test -p tabline-airtable --test pipeline

use std::cell::Cell;
use std::collections::HashMap;
use std::path::Path;

use serde_json::{Value, json};
use tabline_airtable::{
    Page, PageSource, Policy, Record, RunOptions, TableQuery, TaskEntry, TaskSpec, load_tasks,
    run,
};
use tabline_core::{FetchError, ProgressContext};

/// Tables keyed by table id; offsets are `page-N`
struct FakeAirtable {
    tables: HashMap<String, Vec<Page>>,
    calls: Cell<usize>,
}

impl FakeAirtable {
    fn new() -> Self {
        Self {
            tables: HashMap::new(),
            calls: Cell::new(0),
        }
    }

    /// Add a table split into pages of the given sizes
    fn table(mut self, table_id: &str, page_sizes: &[usize]) -> Self {
        let mut n = 0;
        let pages = page_sizes
            .iter()
            .enumerate()
            .map(|(i, &size)| Page {
                records: (0..size)
                    .map(|_| {
                        n += 1;
                        Record::new(format!("{table_id}-rec{n}"), Default::default())
                    })
                    .collect(),
                offset: (i + 1 < page_sizes.len()).then(|| format!("page-{}", i + 1)),
            })
            .collect();
        self.tables.insert(table_id.to_string(), pages);
        self
    }

    /// Add a single-page table with explicit records
    fn records(mut self, table_id: &str, records: Value) -> Self {
        let records: Vec<Record> = serde_json::from_value(records).unwrap();
        self.tables.insert(
            table_id.to_string(),
            vec![Page {
                records,
                offset: None,
            }],
        );
        self
    }
}

impl PageSource for FakeAirtable {
    fn fetch_page(&self, query: &TableQuery, offset: Option<&str>) -> Result<Page, FetchError> {
        self.calls.set(self.calls.get() + 1);
        let Some(pages) = self.tables.get(&query.table_id) else {
            return Err(FetchError::from_status(
                reqwest::StatusCode::NOT_FOUND,
                r#"{"error":"NOT_FOUND"}"#,
            ));
        };
        let index = offset
            .and_then(|o| o.strip_prefix("page-"))
            .map_or(0, |n| n.parse::<usize>().unwrap());
        Ok(pages[index].clone())
    }
}

fn spec(name: &str, table_id: &str, output: Option<&str>) -> TaskEntry {
    TaskSpec {
        task_name: Some(name.to_string()),
        base_id: Some("appTEST".to_string()),
        table_id: Some(table_id.to_string()),
        view_id: None,
        output_file: output.map(Into::into),
        transform: Policy::List,
    }
    .into()
}

fn options(root: &Path) -> RunOptions {
    RunOptions {
        root: root.to_path_buf(),
        ..Default::default()
    }
}

fn read_json(path: &Path) -> Value {
    serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
}

#[test]
fn pages_are_accumulated_into_one_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeAirtable::new().table("tblSteps", &[2, 2, 1]);

    let summary = run(
        Some("patTEST"),
        |_| Ok(&source),
        vec![spec("Steps", "tblSteps", Some("out/steps.json"))],
        &options(dir.path()),
        &ProgressContext::hidden(),
    )
    .unwrap();

    assert_eq!(source.calls.get(), 3);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(summary.total_records, 5);

    let written = read_json(&dir.path().join("out/steps.json"));
    let ids: Vec<&str> = written
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_str().unwrap())
        .collect();
    assert_eq!(
        ids,
        [
            "tblSteps-rec1",
            "tblSteps-rec2",
            "tblSteps-rec3",
            "tblSteps-rec4",
            "tblSteps-rec5"
        ]
    );
}

#[test]
fn invalid_task_is_skipped_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeAirtable::new()
        .table("tblA", &[1])
        .table("tblB", &[3]);

    let summary = run(
        Some("patTEST"),
        |_| Ok(&source),
        vec![
            spec("No output", "tblA", None),
            spec("Second", "tblB", Some("b.json")),
        ],
        &options(dir.path()),
        &ProgressContext::hidden(),
    )
    .unwrap();

    assert_eq!(summary.total_tasks, 2);
    assert_eq!(summary.skipped_tasks, 1);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(source.calls.get(), 1);
    assert_eq!(read_json(&dir.path().join("b.json")).as_array().unwrap().len(), 3);
}

#[test]
fn failed_fetch_writes_nothing_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let source = FakeAirtable::new().table("tblOk", &[2]);

    let summary = run(
        Some("patTEST"),
        |_| Ok(&source),
        vec![
            spec("Broken", "tblMissing", Some("broken.json")),
            spec("Fine", "tblOk", Some("fine.json")),
        ],
        &options(dir.path()),
        &ProgressContext::hidden(),
    )
    .unwrap();

    assert_eq!(summary.failed_tasks, 1);
    assert_eq!(summary.completed_tasks, 1);
    assert!(!dir.path().join("broken.json").exists());
    assert!(dir.path().join("fine.json").exists());
}

#[test]
fn failed_write_does_not_stop_batch() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("blocker"), b"not a dir").unwrap();
    let source = FakeAirtable::new().table("tblA", &[1]);

    let summary = run(
        Some("patTEST"),
        |_| Ok(&source),
        vec![
            spec("Blocked", "tblA", Some("blocker/a.json")),
            spec("Open", "tblA", Some("a.json")),
        ],
        &options(dir.path()),
        &ProgressContext::hidden(),
    )
    .unwrap();

    assert_eq!(summary.failed_tasks, 1);
    assert_eq!(summary.completed_tasks, 1);
}

#[test]
fn existing_output_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("steps.json");
    std::fs::write(&path, r#"[{"id": "stale"}, {"id": "stale2"}]"#).unwrap();
    let source = FakeAirtable::new().table("tblSteps", &[1]);

    run(
        Some("patTEST"),
        |_| Ok(&source),
        vec![spec("Steps", "tblSteps", Some("steps.json"))],
        &options(dir.path()),
        &ProgressContext::hidden(),
    )
    .unwrap();

    let written = read_json(&path);
    assert_eq!(written.as_array().unwrap().len(), 1);
    assert_eq!(written[0]["id"], "tblSteps-rec1");
}

#[test]
fn graph_task_from_task_file() {
    let dir = tempfile::tempdir().unwrap();
    let task_file = dir.path().join("airtable_config.json");
    std::fs::write(
        &task_file,
        r#"{
            "extractionTasks": [
                {
                    "taskName": "Workflow",
                    "baseId": "appTEST",
                    "tableId": "tblWorkflow",
                    "outputFile": "public/data/workflow.json",
                    "transform": "graph"
                }
            ]
        }"#,
    )
    .unwrap();
    let source = FakeAirtable::new().records(
        "tblWorkflow",
        json!([
            {"id": "recA", "fields": {"Name": "Intake", "Next Steps": ["recB", "recGone"]}},
            {"id": "recB", "fields": {"Name": "Review", "Dependencies": ["recA"]}}
        ]),
    );

    let entries = load_tasks(&task_file).unwrap();
    let summary = run(
        Some("patTEST"),
        |_| Ok(&source),
        entries,
        &options(dir.path()),
        &ProgressContext::hidden(),
    )
    .unwrap();
    assert_eq!(summary.completed_tasks, 1);

    let written = read_json(&dir.path().join("public/data/workflow.json"));
    assert_eq!(
        written,
        json!({
            "nodes": [
                {"id": "recA", "Name": "Intake", "Next Steps": ["recB", "recGone"]},
                {"id": "recB", "Name": "Review", "Dependencies": ["recA"]}
            ],
            "links": [
                {"source": "recA", "target": "recB", "type": "next_step"},
                {"source": "recA", "target": "recB", "type": "dependency"}
            ]
        })
    );
}

#[test]
fn malformed_entry_is_skipped_and_batch_continues() {
    let dir = tempfile::tempdir().unwrap();
    let task_file = dir.path().join("airtable_config.json");
    std::fs::write(
        &task_file,
        r#"{
            "extractionTasks": [
                {"taskName": "Bad", "baseId": "appTEST", "tableId": "tblA", "outputFile": 5},
                {"taskName": "Good", "baseId": "appTEST", "tableId": "tblA", "outputFile": "good.json"}
            ]
        }"#,
    )
    .unwrap();
    let source = FakeAirtable::new().table("tblA", &[2]);

    let entries = load_tasks(&task_file).unwrap();
    let summary = run(
        Some("patTEST"),
        |_| Ok(&source),
        entries,
        &options(dir.path()),
        &ProgressContext::hidden(),
    )
    .unwrap();

    assert_eq!(summary.total_tasks, 2);
    assert_eq!(summary.skipped_tasks, 1);
    assert_eq!(summary.completed_tasks, 1);
    assert_eq!(source.calls.get(), 1);
    assert_eq!(read_json(&dir.path().join("good.json")).as_array().unwrap().len(), 2);
}
