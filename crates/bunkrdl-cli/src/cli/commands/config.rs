//! `bunkrdl config` – show the effective options.

use anyhow::Result;
use bunkrdl_core::config::{self, Options};

pub fn run_config(opts: &Options, path_only: bool) -> Result<()> {
    if path_only {
        println!("{}", config::config_path()?.display());
        return Ok(());
    }
    print!("{}", toml::to_string_pretty(opts)?);
    Ok(())
}
