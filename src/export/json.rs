//! JSON Export functionality
//!
//! Exports the complete audit store to JSON format with schema versioning.

use crate::error::{AuditError, AuditResult};
use crate::models::{AuditFieldEntry, AuditGroup, AuditMultiFieldEntry, AuditTrail};
use crate::storage::Storage;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io::Write;

/// Current export schema version
pub const EXPORT_SCHEMA_VERSION: &str = "1.0.0";

/// Full audit store export structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditExport {
    /// Schema version for compatibility checking
    pub schema_version: String,

    /// Export timestamp
    pub exported_at: DateTime<Utc>,

    /// Application version that created the export
    pub app_version: String,

    /// All trails, oldest audit day first
    pub trails: Vec<AuditTrail>,

    pub groups: Vec<AuditGroup>,

    pub field_entries: Vec<AuditFieldEntry>,

    pub multi_field_entries: Vec<AuditMultiFieldEntry>,

    /// Export metadata
    pub metadata: ExportMetadata,
}

/// Export metadata for reference
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportMetadata {
    pub trail_count: usize,
    pub group_count: usize,
    pub entry_count: usize,

    /// Earliest audit day
    pub earliest_audit: Option<String>,

    /// Latest audit day
    pub latest_audit: Option<String>,
}

impl AuditExport {
    /// Create a new full export from storage
    pub fn from_storage(storage: &Storage) -> AuditResult<Self> {
        let trails = storage.trails.get_all()?;

        let mut groups = Vec::new();
        for trail in &trails {
            groups.extend(storage.trails.get_groups(trail.id)?);
        }

        let field_entries = storage.entries.all_fields()?;
        let multi_field_entries = storage.entries.all_multi_fields()?;

        let metadata = ExportMetadata {
            trail_count: trails.len(),
            group_count: groups.len(),
            entry_count: field_entries.len() + multi_field_entries.len(),
            earliest_audit: trails.iter().map(|t| t.audit_date).min().map(|d| d.to_string()),
            latest_audit: trails.iter().map(|t| t.audit_date).max().map(|d| d.to_string()),
        };

        Ok(Self {
            schema_version: EXPORT_SCHEMA_VERSION.to_string(),
            exported_at: Utc::now(),
            app_version: env!("CARGO_PKG_VERSION").to_string(),
            trails,
            groups,
            field_entries,
            multi_field_entries,
            metadata,
        })
    }

    /// Validate the export structure
    pub fn validate(&self) -> Result<(), String> {
        if self.schema_version != EXPORT_SCHEMA_VERSION {
            return Err(format!(
                "Schema version mismatch: expected {}, got {}",
                EXPORT_SCHEMA_VERSION, self.schema_version
            ));
        }

        let trail_ids: HashSet<_> = self.trails.iter().map(|t| t.id).collect();
        let trail_keys: HashSet<_> = self.trails.iter().map(|t| t.key()).collect();
        if trail_keys.len() != self.trails.len() {
            return Err("Two trails share the same key".into());
        }

        for group in &self.groups {
            if !trail_ids.contains(&group.trail_id) {
                return Err(format!(
                    "Group {} references unknown trail {}",
                    group.id, group.trail_id
                ));
            }
        }

        let orphan = self
            .field_entries
            .iter()
            .map(|e| (e.id.to_string(), e.trail_id))
            .chain(
                self.multi_field_entries
                    .iter()
                    .map(|e| (e.id.to_string(), e.trail_id)),
            )
            .find(|(_, trail_id)| !trail_ids.contains(trail_id));

        if let Some((entry, trail_id)) = orphan {
            return Err(format!(
                "Entry {} references unknown trail {}",
                entry, trail_id
            ));
        }

        Ok(())
    }
}

/// Export the full audit store to JSON
pub fn export_full_json<W: Write>(
    storage: &Storage,
    writer: &mut W,
    pretty: bool,
) -> AuditResult<()> {
    let export = AuditExport::from_storage(storage)?;
    export.validate().map_err(AuditError::Export)?;

    if pretty {
        serde_json::to_writer_pretty(writer, &export)
    } else {
        serde_json::to_writer(writer, &export)
    }
    .map_err(|e| AuditError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::AuditPaths;
    use crate::models::{AuditAction, EntityKey, TrailKey, TrailId, Visibility};
    use crate::storage::TrailStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_storage() -> (TempDir, Storage) {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();
        (temp_dir, storage)
    }

    fn seed(storage: &Storage) -> AuditTrail {
        let key = TrailKey::new(
            Visibility::Admin,
            EntityKey::new("Order", 42),
            AuditAction::Modified,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        );
        let trail = storage.upsert_trail(&key, "ORDER(42)", None).unwrap();
        storage.get_or_create_group(trail.id, "workflow").unwrap();
        storage
            .insert_field_entry(AuditFieldEntry::new(
                trail.id,
                "status",
                Some("pending".into()),
                Some("shipped".into()),
                None,
            ))
            .unwrap();
        storage
            .insert_multi_field_entry(AuditMultiFieldEntry::new(trail.id, "tags", "red", "", None))
            .unwrap();
        trail
    }

    #[test]
    fn test_full_export() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let export = AuditExport::from_storage(&storage).unwrap();

        assert_eq!(export.schema_version, EXPORT_SCHEMA_VERSION);
        assert_eq!(export.metadata.trail_count, 1);
        assert_eq!(export.metadata.group_count, 1);
        assert_eq!(export.metadata.entry_count, 2);
        assert_eq!(export.metadata.earliest_audit.as_deref(), Some("2026-10-19"));
        assert!(export.validate().is_ok());
    }

    #[test]
    fn test_json_output_parses() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut json_output = Vec::new();
        export_full_json(&storage, &mut json_output, true).unwrap();

        let parsed: AuditExport = serde_json::from_slice(&json_output).unwrap();
        assert_eq!(parsed.trails.len(), 1);
        assert_eq!(parsed.field_entries[0].new_value.as_deref(), Some("shipped"));
    }

    #[test]
    fn test_validate_rejects_orphan_entry() {
        let (_temp_dir, storage) = create_test_storage();
        seed(&storage);

        let mut export = AuditExport::from_storage(&storage).unwrap();
        export.field_entries[0].trail_id = TrailId::new();

        let err = export.validate().unwrap_err();
        assert!(err.contains("unknown trail"));
    }

    #[test]
    fn test_empty_store() {
        let (_temp_dir, storage) = create_test_storage();

        let export = AuditExport::from_storage(&storage).unwrap();
        assert_eq!(export.metadata.trail_count, 0);
        assert!(export.metadata.latest_audit.is_none());
    }
}
