//! CLI commands for browsing audit history

use crate::config::Settings;
use crate::display::{format_trail_details, format_trail_list};
use crate::error::{AuditError, AuditResult};
use crate::models::{EntityKey, EntityType, Visibility};
use crate::services::HistoryService;
use crate::storage::Storage;
use clap::Args;

/// Arguments of `trail history`
#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Entity type tag (e.g. Order)
    pub entity_type: String,

    /// Entity ID
    pub entity_id: u64,

    /// Show the public view instead of the admin view
    #[arg(long)]
    pub public: bool,

    /// Number of trails to show (defaults to the configured limit)
    #[arg(short, long)]
    pub limit: Option<usize>,
}

/// Handle `trail history`
pub fn handle_history_command(
    storage: &Storage,
    settings: &Settings,
    args: HistoryArgs,
) -> AuditResult<()> {
    let entity_type = EntityType::new(args.entity_type);
    if !entity_type.is_valid() {
        return Err(AuditError::Validation(format!(
            "Invalid entity type '{}'",
            entity_type
        )));
    }

    let limit = args.limit.unwrap_or(settings.recent_trail_limit);
    if limit == 0 {
        return Err(AuditError::Validation("Limit must be at least 1".into()));
    }

    let visibility = if args.public {
        Visibility::Public
    } else {
        Visibility::Admin
    };

    let entity = EntityKey::new(entity_type, args.entity_id);
    let trails = HistoryService::new(storage).audit_for(&entity, Some(visibility), limit)?;

    println!("{} history of {}", visibility, entity);
    println!();
    print!("{}", format_trail_list(&trails, &settings.date_format));
    if trails.is_empty() {
        println!();
    }

    Ok(())
}

/// Handle `trail show`
pub fn handle_show_command(storage: &Storage, settings: &Settings, trail: &str) -> AuditResult<()> {
    let detail = HistoryService::new(storage).trail_detail(trail)?;
    print!("{}", format_trail_details(&detail, &settings.date_format));
    Ok(())
}
