//! Hunt Console
//!
//! Research hunts, their journal, and a canvas of notes that places related
//! notes near each other.
//!
//! # Usage
//!
//! ```bash
//! hunt-console hunt create "Lost city" --terrain jungle
//! hunt-console node add 1 --text "search for buried gold"
//! hunt-console analyze 1
//! ```
//!
//! # Configuration
//!
//! Configuration is loaded in order (later sources override earlier):
//! 1. Built-in defaults
//! 2. Config file (~/.config/hunt-console/config.toml)
//! 3. Environment variables (HUNT_*)
//! 4. CLI flags

use anyhow::Result;
use clap::Parser;

use hunt_console::{run, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    run(Cli::parse()).await
}
