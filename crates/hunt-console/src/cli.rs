//! CLI argument parsing for the hunt console.
//!
//! CLI flags override every other config source.

use clap::{Parser, Subcommand};
use hunt_types::NodeType;

/// Hunt Console
///
/// Track research hunts, their journal and a canvas of notes that arranges
/// itself by meaning.
#[derive(Parser, Debug)]
#[command(name = "hunt-console")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to config file (overrides default ~/.config/hunt-console/config.toml)
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Set log level (trace, debug, info, warn, error)
    #[arg(short, long, global = true)]
    pub log_level: Option<String>,

    /// Override database path
    #[arg(long, global = true)]
    pub db_path: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage hunts
    Hunt {
        #[command(subcommand)]
        command: HuntCommands,
    },

    /// Manage canvas nodes
    Node {
        #[command(subcommand)]
        command: NodeCommands,
    },

    /// Manage journal logs
    Log {
        #[command(subcommand)]
        command: LogCommands,
    },

    /// Group a hunt's nodes into similarity clusters
    Analyze {
        hunt_id: u64,
    },

    /// Show where a note would be placed, without storing it
    Place {
        hunt_id: u64,

        /// Note text
        #[arg(long)]
        text: String,
    },

    /// Administrative commands
    Admin {
        #[command(subcommand)]
        command: AdminCommands,
    },

    /// Report service health
    Health,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HuntCommands {
    /// List all hunts
    List,

    /// Create a hunt
    Create {
        name: String,

        #[arg(long)]
        terrain: Option<String>,

        #[arg(long)]
        victory_conditions: Option<String>,

        #[arg(long)]
        failure_modes: Option<String>,

        #[arg(long)]
        duration: Option<String>,

        /// Defaults to "active"
        #[arg(long)]
        status: Option<String>,
    },

    /// Show one hunt
    Show { hunt_id: u64 },

    /// Update fields of a hunt
    Update {
        hunt_id: u64,

        #[arg(long)]
        name: Option<String>,

        #[arg(long)]
        terrain: Option<String>,

        #[arg(long)]
        victory_conditions: Option<String>,

        #[arg(long)]
        failure_modes: Option<String>,

        #[arg(long)]
        duration: Option<String>,

        #[arg(long)]
        status: Option<String>,
    },

    /// Delete a hunt with all its logs and nodes
    Delete { hunt_id: u64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum NodeCommands {
    /// List a hunt's nodes
    List { hunt_id: u64 },

    /// Add a node to a hunt's canvas
    Add {
        hunt_id: u64,

        #[arg(long)]
        text: String,

        /// Position used when no related note is found
        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        x: f64,

        #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
        y: f64,

        #[arg(long)]
        width: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        /// note or llm
        #[arg(long = "type", default_value = "note")]
        node_type: NodeType,

        /// Ids of connected nodes (comma separated)
        #[arg(long, value_delimiter = ',')]
        connect: Vec<u64>,

        /// Keep the given position instead of placing near related notes
        #[arg(long)]
        no_semantic: bool,
    },

    /// Update fields of a node
    Update {
        node_id: u64,

        #[arg(long, allow_hyphen_values = true)]
        x: Option<f64>,

        #[arg(long, allow_hyphen_values = true)]
        y: Option<f64>,

        #[arg(long)]
        width: Option<f64>,

        #[arg(long)]
        height: Option<f64>,

        #[arg(long)]
        text: Option<String>,

        #[arg(long = "type")]
        node_type: Option<NodeType>,

        /// Replace connections (comma separated)
        #[arg(long, value_delimiter = ',')]
        connect: Option<Vec<u64>>,
    },

    /// Delete a node
    Delete { node_id: u64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum LogCommands {
    /// List a hunt's logs, newest first
    List { hunt_id: u64 },

    /// Add a journal entry
    Add {
        hunt_id: u64,

        #[arg(long)]
        week: Option<i32>,

        #[arg(long)]
        entry: Option<String>,

        /// Repeat for several
        #[arg(long = "breakthrough")]
        breakthroughs: Vec<String>,

        /// Repeat for several
        #[arg(long = "failed")]
        failed_approaches: Vec<String>,
    },

    /// Update fields of a journal entry
    Update {
        log_id: u64,

        #[arg(long)]
        week: Option<i32>,

        #[arg(long)]
        entry: Option<String>,

        /// Replaces the existing list
        #[arg(long = "breakthrough")]
        breakthroughs: Option<Vec<String>>,

        /// Replaces the existing list
        #[arg(long = "failed")]
        failed_approaches: Option<Vec<String>>,
    },

    /// Delete a journal entry
    Delete { log_id: u64 },
}

#[derive(Subcommand, Debug, Clone)]
pub enum AdminCommands {
    /// Show database statistics
    Stats,

    /// Trigger RocksDB compaction
    Compact,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_with_config() {
        let cli = Cli::parse_from(["hunt-console", "--config", "/path/to/config.toml", "health"]);
        assert_eq!(cli.config, Some("/path/to/config.toml".to_string()));
        assert!(matches!(cli.command, Commands::Health));
    }

    #[test]
    fn test_cli_global_flags_after_command() {
        let cli = Cli::parse_from([
            "hunt-console",
            "hunt",
            "list",
            "--db-path",
            "/custom/db",
            "--log-level",
            "debug",
        ]);
        assert_eq!(cli.db_path, Some("/custom/db".to_string()));
        assert_eq!(cli.log_level, Some("debug".to_string()));
    }

    #[test]
    fn test_cli_hunt_create() {
        let cli = Cli::parse_from([
            "hunt-console",
            "hunt",
            "create",
            "Lost city",
            "--terrain",
            "jungle",
        ]);
        match cli.command {
            Commands::Hunt {
                command: HuntCommands::Create { name, terrain, status, .. },
            } => {
                assert_eq!(name, "Lost city");
                assert_eq!(terrain, Some("jungle".to_string()));
                assert_eq!(status, None);
            }
            _ => panic!("Expected hunt create command"),
        }
    }

    #[test]
    fn test_cli_node_add() {
        let cli = Cli::parse_from([
            "hunt-console",
            "node",
            "add",
            "3",
            "--text",
            "search for buried gold",
            "--x",
            "-40",
            "--type",
            "llm",
            "--connect",
            "1,2",
            "--no-semantic",
        ]);
        match cli.command {
            Commands::Node {
                command:
                    NodeCommands::Add {
                        hunt_id,
                        x,
                        y,
                        node_type,
                        connect,
                        no_semantic,
                        ..
                    },
            } => {
                assert_eq!(hunt_id, 3);
                assert_eq!((x, y), (-40.0, 0.0));
                assert_eq!(node_type, NodeType::Llm);
                assert_eq!(connect, vec![1, 2]);
                assert!(no_semantic);
            }
            _ => panic!("Expected node add command"),
        }
    }

    #[test]
    fn test_cli_node_add_defaults() {
        let cli = Cli::parse_from(["hunt-console", "node", "add", "1", "--text", "old well"]);
        match cli.command {
            Commands::Node {
                command:
                    NodeCommands::Add {
                        node_type,
                        connect,
                        no_semantic,
                        ..
                    },
            } => {
                assert_eq!(node_type, NodeType::Note);
                assert!(connect.is_empty());
                assert!(!no_semantic);
            }
            _ => panic!("Expected node add command"),
        }
    }

    #[test]
    fn test_cli_rejects_unknown_node_type() {
        let result = Cli::try_parse_from([
            "hunt-console",
            "node",
            "add",
            "1",
            "--text",
            "old well",
            "--type",
            "sketch",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_log_add_repeated_lists() {
        let cli = Cli::parse_from([
            "hunt-console",
            "log",
            "add",
            "2",
            "--week",
            "4",
            "--breakthrough",
            "found the map",
            "--breakthrough",
            "decoded the cipher",
            "--failed",
            "dug at the river",
        ]);
        match cli.command {
            Commands::Log {
                command:
                    LogCommands::Add {
                        week,
                        breakthroughs,
                        failed_approaches,
                        ..
                    },
            } => {
                assert_eq!(week, Some(4));
                assert_eq!(breakthroughs.len(), 2);
                assert_eq!(failed_approaches, vec!["dug at the river".to_string()]);
            }
            _ => panic!("Expected log add command"),
        }
    }

    #[test]
    fn test_cli_place() {
        let cli = Cli::parse_from(["hunt-console", "place", "5", "--text", "find the treasure map"]);
        match cli.command {
            Commands::Place { hunt_id, text } => {
                assert_eq!(hunt_id, 5);
                assert_eq!(text, "find the treasure map");
            }
            _ => panic!("Expected place command"),
        }
    }

    #[test]
    fn test_cli_admin_stats() {
        let cli = Cli::parse_from(["hunt-console", "admin", "stats"]);
        assert!(matches!(
            cli.command,
            Commands::Admin {
                command: AdminCommands::Stats
            }
        ));
    }
}
