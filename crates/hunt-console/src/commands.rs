//! Command implementations for the hunt console.
//!
//! Every command runs against a [`HuntService`] and produces a JSON value;
//! `run` prints it to stdout. Logs go to stderr so output stays parseable.

use std::fs;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::info;

use hunt_layout::SharedClusterer;
use hunt_service::HuntService;
use hunt_storage::Storage;
use hunt_types::{
    HuntPatch, LogPatch, NewHunt, NewLog, NewNode, NodePatch, Settings, DEFAULT_NODE_HEIGHT,
    DEFAULT_NODE_WIDTH,
};

use crate::cli::{AdminCommands, Cli, Commands, HuntCommands, LogCommands, NodeCommands};

/// Load configuration and apply CLI overrides (highest precedence).
pub fn load_settings(cli: &Cli) -> Result<Settings> {
    let mut settings =
        Settings::load(cli.config.as_deref()).context("Failed to load configuration")?;

    if let Some(db_path) = &cli.db_path {
        settings.db_path = db_path.clone();
    }
    if let Some(log_level) = &cli.log_level {
        settings.log_level = log_level.clone();
    }
    Ok(settings)
}

/// Install the global tracing subscriber, writing to stderr.
pub fn init_tracing(log_level: &str) -> Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set tracing subscriber")?;
    Ok(())
}

/// Open storage and wire up the semantic layout engine.
///
/// The embedding model is not loaded here; it loads on the first command
/// that needs it.
pub fn open_service(settings: &Settings) -> Result<HuntService> {
    let db_path = settings.expanded_db_path();
    info!("Opening storage at {:?}", db_path);

    if let Some(parent) = db_path.parent() {
        fs::create_dir_all(parent).context("Failed to create database directory")?;
    }

    let storage = Arc::new(Storage::open(&db_path).context("Failed to open storage")?);
    let clusterer =
        SharedClusterer::candle(settings.layout.clone(), settings.expanded_model_cache_dir())
            .context("Invalid layout settings")?;

    Ok(HuntService::new(storage, clusterer))
}

/// Run a parsed command line and print its result.
pub async fn run(cli: Cli) -> Result<()> {
    let settings = load_settings(&cli)?;
    init_tracing(&settings.log_level)?;

    let service = open_service(&settings)?;
    let output = execute(&service, cli.command).await?;
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

fn to_json<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).context("Failed to serialize output")
}

/// Execute one command against the service.
pub async fn execute(service: &HuntService, command: Commands) -> Result<Value> {
    match command {
        Commands::Hunt { command } => handle_hunt(service, command),
        Commands::Node { command } => handle_node(service, command).await,
        Commands::Log { command } => handle_log(service, command),
        Commands::Analyze { hunt_id } => {
            let analysis = service
                .semantic_analysis(hunt_id)
                .await
                .with_context(|| format!("Failed to analyze hunt {}", hunt_id))?;
            to_json(&analysis)
        }
        Commands::Place { hunt_id, text } => {
            let proposal = service.propose_position(hunt_id, &text).await?;
            to_json(&proposal)
        }
        Commands::Admin { command } => handle_admin(service, command),
        Commands::Health => to_json(&service.health()),
    }
}

fn handle_hunt(service: &HuntService, command: HuntCommands) -> Result<Value> {
    match command {
        HuntCommands::List => to_json(&service.list_hunts()?),
        HuntCommands::Create {
            name,
            terrain,
            victory_conditions,
            failure_modes,
            duration,
            status,
        } => {
            let hunt = service.create_hunt(NewHunt {
                name,
                terrain,
                victory_conditions,
                failure_modes,
                duration,
                status,
            })?;
            to_json(&hunt)
        }
        HuntCommands::Show { hunt_id } => to_json(&service.get_hunt(hunt_id)?),
        HuntCommands::Update {
            hunt_id,
            name,
            terrain,
            victory_conditions,
            failure_modes,
            duration,
            status,
        } => {
            let hunt = service.update_hunt(
                hunt_id,
                HuntPatch {
                    name,
                    terrain,
                    victory_conditions,
                    failure_modes,
                    duration,
                    status,
                },
            )?;
            to_json(&hunt)
        }
        HuntCommands::Delete { hunt_id } => {
            service.delete_hunt(hunt_id)?;
            Ok(json!({ "deleted": hunt_id }))
        }
    }
}

async fn handle_node(service: &HuntService, command: NodeCommands) -> Result<Value> {
    match command {
        NodeCommands::List { hunt_id } => to_json(&service.list_nodes(hunt_id)?),
        NodeCommands::Add {
            hunt_id,
            text,
            x,
            y,
            width,
            height,
            node_type,
            connect,
            no_semantic,
        } => {
            let draft = NewNode {
                x,
                y,
                width: width.unwrap_or(DEFAULT_NODE_WIDTH),
                height: height.unwrap_or(DEFAULT_NODE_HEIGHT),
                text,
                node_type,
                connections: connect,
                use_semantic: !no_semantic,
            };
            to_json(&service.create_node(hunt_id, draft).await?)
        }
        NodeCommands::Update {
            node_id,
            x,
            y,
            width,
            height,
            text,
            node_type,
            connect,
        } => {
            let node = service.update_node(
                node_id,
                NodePatch {
                    x,
                    y,
                    width,
                    height,
                    text,
                    node_type,
                    connections: connect,
                },
            )?;
            to_json(&node)
        }
        NodeCommands::Delete { node_id } => {
            service.delete_node(node_id)?;
            Ok(json!({ "deleted": node_id }))
        }
    }
}

fn handle_log(service: &HuntService, command: LogCommands) -> Result<Value> {
    match command {
        LogCommands::List { hunt_id } => to_json(&service.list_logs(hunt_id)?),
        LogCommands::Add {
            hunt_id,
            week,
            entry,
            breakthroughs,
            failed_approaches,
        } => {
            let log = service.create_log(
                hunt_id,
                NewLog {
                    week_number: week,
                    entry,
                    breakthroughs,
                    failed_approaches,
                },
            )?;
            to_json(&log)
        }
        LogCommands::Update {
            log_id,
            week,
            entry,
            breakthroughs,
            failed_approaches,
        } => {
            let log = service.update_log(
                log_id,
                LogPatch {
                    week_number: week,
                    entry,
                    breakthroughs,
                    failed_approaches,
                },
            )?;
            to_json(&log)
        }
        LogCommands::Delete { log_id } => {
            service.delete_log(log_id)?;
            Ok(json!({ "deleted": log_id }))
        }
    }
}

fn handle_admin(service: &HuntService, command: AdminCommands) -> Result<Value> {
    match command {
        AdminCommands::Stats => to_json(&service.stats()?),
        AdminCommands::Compact => {
            service.compact()?;
            Ok(json!({ "compacted": true }))
        }
    }
}
