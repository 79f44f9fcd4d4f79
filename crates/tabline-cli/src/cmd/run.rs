//! `tabline run` - every task of a task file, in order

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;
use tabline_airtable::load_tasks;
use tabline_core::SharedProgress;

use crate::config::Config;

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Task file with an `extractionTasks` list
    #[arg(default_value = "airtable_config.json")]
    pub tasks: PathBuf,

    /// Directory that relative `outputFile` paths resolve against
    #[arg(long, default_value = ".")]
    pub root: PathBuf,
}

pub fn run(args: RunArgs, config: &Config, progress: &SharedProgress) -> Result<()> {
    config.api.require_token()?;
    let tasks = load_tasks(&args.tasks)?;
    log::info!("Output root: {}", args.root.display());
    super::execute("Run", tasks, args.root, config, progress)
}
