//! Tabline Airtable - Airtable table extraction pipeline
//!
//! Fetches every page of a table (or view) from the Airtable REST API,
//! shapes the records as a flat list or a node/link graph, and writes
//! the result to a JSON file.
//!
//! # Example
//!
//! ```ignore
//! use tabline_airtable::{AirtableClient, ApiConfig, RunOptions, load_tasks, run};
//! use tabline_core::ProgressContext;
//!
//! let tasks = load_tasks("airtable_config.json".as_ref())?;
//! let token = std::env::var("AIRTABLE_API_KEY").ok();
//! let summary = run(
//!     token.as_deref(),
//!     |token| AirtableClient::new(ApiConfig::new(token)),
//!     tasks,
//!     &RunOptions::default(),
//!     &ProgressContext::hidden(),
//! )?;
//! println!("{} records written", summary.total_records);
//! ```

pub mod api;
pub mod fetch;
pub mod record;
pub mod runner;
pub mod task;
pub mod transform;

// Re-exports
pub use api::{
    AirtableClient, ApiConfig, ApiToken, DEFAULT_BASE_URL, MissingCredential, PageSource,
    TOKEN_ENV_VAR, TableQuery,
};
pub use fetch::fetch_all;
pub use record::{Page, Record};
pub use runner::{RunOptions, Summary, TaskError, run, run_task};
pub use task::{InvalidTask, Task, TaskEntry, TaskSpec, load_tasks, parse_tasks};
pub use transform::{Direction, Graph, Link, LinkRule, Output, Policy, build_graph, transform};
