//! CLI for bunkrdl.

mod commands;

use anyhow::Result;
use bunkrdl_core::config::{self, Options};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use commands::{run_completions, run_config, run_man, run_name, run_plan};

/// Base URL file pages are opened under when none is given.
pub const DEFAULT_BASE_URL: &str = "https://bunkr.cr/f/";

/// Top-level CLI for bunkrdl.
#[derive(Debug, Parser)]
#[command(name = "bunkrdl")]
#[command(about = "bunkrdl: paced file-page opening and download naming", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Show the effective options.
    Config {
        /// Print the config file path instead.
        #[arg(long)]
        path: bool,
    },

    /// Print when each item of a batch would be opened, and which URLs would be tried.
    Plan {
        /// JSON file with an array of items ({"href", "name"?, "thumb"?}).
        items: PathBuf,
        /// Base URL for file pages.
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base: String,
        /// Override the configured pacing interval.
        #[arg(long, value_name = "MS", allow_hyphen_values = true)]
        pacing_ms: Option<i64>,
    },

    /// Show the destination a download would be given.
    Name {
        /// Download URL (final URL after redirects), given positionally.
        url: String,
        /// Filename the browser would pick on its own.
        #[arg(long)]
        default_filename: Option<String>,
        /// Display name reported by the file page.
        #[arg(long)]
        expected: Option<String>,
    },

    /// Generate shell completions on stdout.
    Completions {
        shell: clap_complete::Shell,
    },

    /// Render the man page on stdout.
    Man,
}

impl CliCommand {
    pub async fn run_from_args() -> Result<()> {
        let cli = Cli::parse();

        match cli.command {
            CliCommand::Config { path } => run_config(&load_options()?, path)?,
            CliCommand::Plan {
                items,
                base,
                pacing_ms,
            } => run_plan(&load_options()?, &items, &base, pacing_ms)?,
            CliCommand::Name {
                url,
                default_filename,
                expected,
            } => run_name(
                &load_options()?,
                &url,
                default_filename.as_deref(),
                expected.as_deref(),
            ),
            CliCommand::Completions { shell } => run_completions(shell)?,
            CliCommand::Man => run_man()?,
        }

        Ok(())
    }
}

fn load_options() -> Result<Options> {
    let opts = config::load_or_init()?;
    tracing::debug!("loaded options: {:?}", opts);
    Ok(opts)
}

#[cfg(test)]
mod tests;
