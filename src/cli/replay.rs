//! CLI command for replaying scripted audit sessions

use crate::config::{Settings, SchemaFile};
use crate::error::AuditResult;
use crate::replay::{ReplayRunner, ReplayScript};
use crate::services::AuditService;
use crate::storage::Storage;
use std::path::Path;

/// Handle `trail replay`
pub fn handle_replay_command(
    storage: &Storage,
    settings: &Settings,
    schema: &SchemaFile,
    file: &Path,
) -> AuditResult<()> {
    let script = ReplayScript::load(file)?;
    let registry = script.registry(schema)?;
    let service = AuditService::new(storage, &registry, settings);

    let summary = ReplayRunner::new(&service).run(&script)?;

    println!("Replayed {} steps from {}", summary.steps, file.display());
    println!("  Events recorded: {}", summary.events_recorded);
    println!("  Events skipped:  {}", summary.events_skipped);
    println!("  Trails touched:  {}", summary.trails_touched);
    println!("  Entries written: {}", summary.entries_written);

    Ok(())
}
