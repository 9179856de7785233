//! CLI command handlers
//!
//! This module contains the implementation of CLI commands,
//! bridging the clap argument parsing with the service layer.

pub mod export;
pub mod history;
pub mod replay;

pub use export::{handle_export_command, ExportArgs, ExportFormat};
pub use history::{handle_history_command, handle_show_command, HistoryArgs};
pub use replay::handle_replay_command;
