use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use audit_trail::cli::{
    handle_export_command, handle_history_command, handle_replay_command, handle_show_command,
    ExportArgs, HistoryArgs,
};
use audit_trail::config::{AuditPaths, SchemaFile, Settings};
use audit_trail::storage::Storage;

#[derive(Parser)]
#[command(
    name = "trail",
    version,
    about = "Field-level audit trails for application entities",
    long_about = "trail records who changed which field of which entity, grouped into \
                  one admin trail and one public trail per entity, action and day, \
                  and lets you browse, replay and export that history."
)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show current configuration and paths
    Config,

    /// List the most recent trails of an entity
    History(HistoryArgs),

    /// Show one trail with its groups and entries
    Show {
        /// Trail ID (full UUID or trl-xxxxxxxx)
        trail: String,
    },

    /// Replay a scripted session (JSON or YAML)
    Replay {
        /// Path to the script
        file: PathBuf,
    },

    /// Export the audit store
    Export(ExportArgs),
}

fn init_logging(verbose: u8, settings: &Settings) {
    let level = match verbose {
        0 => settings.log_level.clone(),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize paths and settings
    let paths = AuditPaths::new()?;
    let settings = Settings::load_or_create(&paths)?;
    init_logging(cli.verbose, &settings);
    debug!("Using data directory {}", paths.base_dir().display());

    // Initialize storage
    let mut storage = Storage::new(paths.clone())?;
    storage.load_all()?;

    match cli.command {
        Some(Commands::Config) => {
            let schema = SchemaFile::load_or_default(paths.schema_file())?;

            println!("audit-trail Configuration");
            println!("=========================");
            println!("Base directory:   {}", paths.base_dir().display());
            println!("Data directory:   {}", paths.data_dir().display());
            println!("Schema file:      {}", paths.schema_file().display());
            println!();
            println!("Settings:");
            println!("  Multi-value delimiter: {:?}", settings.multi_value_delimiter);
            println!("  Recent trail limit:    {}", settings.recent_trail_limit);
            println!("  Date format:           {}", settings.date_format);
            println!("  Log level:             {}", settings.log_level);
            println!();
            if schema.entities.is_empty() {
                println!("No audited entity types declared.");
            } else {
                println!("Audited entity types:");
                for (entity_type, fields) in &schema.entities {
                    println!("  {} ({} fields)", entity_type, fields.len());
                }
            }
        }
        Some(Commands::History(args)) => {
            handle_history_command(&storage, &settings, args)?;
        }
        Some(Commands::Show { trail }) => {
            handle_show_command(&storage, &settings, &trail)?;
        }
        Some(Commands::Replay { file }) => {
            let schema = SchemaFile::load_or_default(paths.schema_file())?;
            handle_replay_command(&storage, &settings, &schema, &file)?;
        }
        Some(Commands::Export(args)) => {
            handle_export_command(&storage, args)?;
        }
        None => {
            println!("trail - field-level audit trails");
            println!();
            println!("Run 'trail --help' for usage information.");
        }
    }

    Ok(())
}
