//! tabline - Extract Airtable tables to JSON files
//!
//! Pages through a table (or one of its views), then writes the records
//! as a JSON list or as a node/link graph.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod cmd;
mod config;

use config::Config;

#[derive(Parser)]
#[command(name = "tabline")]
#[command(about = "Extract Airtable tables to JSON files")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    /// Config file path (default: ./tabline.toml or ~/.config/tabline/config.toml)
    #[arg(short, long, global = true)]
    config: Option<std::path::PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch one table into one file
    Fetch(cmd::fetch::FetchArgs),
    /// Run every task of a task file, one after another
    Run(cmd::run::RunArgs),
    /// Show current configuration
    Config,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Before logging and config, so both see variables from .env
    let dotenv = config::load_dotenv(None)?;

    // Progress context (TTY auto-detect)
    let progress = Arc::new(tabline_core::ProgressContext::new());
    let multi = progress.is_tty().then(|| progress.multi());
    tabline_core::init_logging(cli.debug, multi).context("failed to init logger")?;
    if let Some(path) = dotenv {
        log::debug!("Loaded environment from {}", path.display());
    }

    let config = if let Some(path) = cli.config {
        Config::from_file(&path)?
    } else {
        Config::load()?
    };

    match cli.command {
        Command::Fetch(args) => cmd::fetch::run(args, &config, &progress),
        Command::Run(args) => cmd::run::run(args, &config, &progress),
        Command::Config => {
            use comfy_table::{
                Cell, Color, Table, modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL,
            };

            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .apply_modifier(UTF8_ROUND_CORNERS)
                .set_header(vec![
                    Cell::new("Setting").fg(Color::Cyan),
                    Cell::new("Value").fg(Color::Cyan),
                ]);

            table.add_row(vec!["API base URL", &config.api.base_url]);
            table.add_row(vec![
                "API token",
                if config.api.token.is_some() {
                    "configured"
                } else {
                    "not set"
                },
            ]);
            table.add_row(vec![
                "Default output",
                &config.output.default_file.display().to_string(),
            ]);
            for rule in &config.graph.rules {
                table.add_row(vec![
                    format!("Link rule ({})", rule.link_type),
                    format!("{:?} via \"{}\"", rule.direction, rule.field),
                ]);
            }

            eprintln!("\n{table}");
            Ok(())
        }
    }
}
