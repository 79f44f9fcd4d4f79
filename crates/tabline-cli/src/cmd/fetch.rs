//! Fetch subcommand - one table into one file

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tabline_airtable::{Policy, TaskSpec};
use tabline_core::SharedProgress;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Airtable base ID (app...)
    #[arg(long)]
    pub base_id: String,

    /// Table ID or name (tbl...)
    #[arg(long)]
    pub table_id: String,

    /// View ID or name; the view's filters and sort apply
    #[arg(long)]
    pub view_id: Option<String>,

    /// Output file (default: output.default_file from config)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Write a {nodes, links} graph instead of the record list
    #[arg(long)]
    pub graph: bool,
}

impl FetchArgs {
    fn into_spec(self, config: &Config) -> TaskSpec {
        TaskSpec {
            task_name: Some(format!("{}/{}", self.base_id, self.table_id)),
            base_id: Some(self.base_id),
            table_id: Some(self.table_id),
            view_id: self.view_id,
            output_file: Some(
                self.output
                    .unwrap_or_else(|| config.output.default_file.clone()),
            ),
            transform: if self.graph {
                Policy::Graph
            } else {
                Policy::List
            },
        }
    }
}

pub fn run(args: FetchArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    let spec = args.into_spec(config);
    super::execute("Fetch", vec![spec.into()], PathBuf::from("."), config, progress)
}
