pub mod config;
pub mod logging;

pub mod association;
pub mod background;
pub mod host;
pub mod lifecycle;
pub mod naming;
pub mod options;
pub mod orchestrator;
