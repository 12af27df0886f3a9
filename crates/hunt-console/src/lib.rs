//! Hunt console library exports.
//!
//! # Modules
//!
//! - `cli`: Command-line argument parsing with clap
//! - `commands`: Command implementations

pub mod cli;
pub mod commands;

pub use cli::{AdminCommands, Cli, Commands, HuntCommands, LogCommands, NodeCommands};
pub use commands::{execute, init_tracing, load_settings, open_service, run};
