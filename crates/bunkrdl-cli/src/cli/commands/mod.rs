//! CLI command handlers, one per file.

mod completions;
mod config;
mod name;
mod plan;

pub use completions::{run_completions, run_man};
pub use config::run_config;
pub use name::run_name;
pub use plan::run_plan;

#[cfg(test)]
pub(crate) use name::preview;
#[cfg(test)]
pub(crate) use plan::render_plan;
