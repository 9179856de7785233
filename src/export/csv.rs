//! CSV Export functionality
//!
//! Exports recorded field entries to CSV, one row per entry, with the
//! owning trail's header columns repeated on every row.

use crate::error::{AuditError, AuditResult};
use crate::models::{ActorRef, AuditTrail};
use crate::storage::Storage;
use std::collections::HashMap;
use std::io::Write;

const HEADER: [&str; 12] = [
    "Trail",
    "Date",
    "View",
    "Action",
    "Entity Type",
    "Entity ID",
    "Field",
    "Kind",
    "Old / Added",
    "New / Removed",
    "Modified By",
    "Recorded At",
];

fn export_err(e: csv::Error) -> AuditError {
    AuditError::Export(e.to_string())
}

fn actor_name(actor: &Option<ActorRef>) -> String {
    actor
        .as_ref()
        .map(|a| a.username.clone())
        .unwrap_or_default()
}

/// Export all field entries to CSV
pub fn export_entries_csv<W: Write>(storage: &Storage, writer: &mut W) -> AuditResult<()> {
    let trails: HashMap<_, AuditTrail> = storage
        .trails
        .get_all()?
        .into_iter()
        .map(|t| (t.id, t))
        .collect();

    let mut out = csv::Writer::from_writer(writer);
    out.write_record(HEADER).map_err(export_err)?;

    let mut rows = Vec::new();
    for entry in storage.entries.all_fields()? {
        rows.push((
            entry.recorded_at,
            entry.trail_id,
            entry.field_name,
            "scalar",
            entry.old_value.unwrap_or_default(),
            entry.new_value.unwrap_or_default(),
            actor_name(&entry.modified_by),
        ));
    }
    for entry in storage.entries.all_multi_fields()? {
        rows.push((
            entry.recorded_at,
            entry.trail_id,
            entry.field_name,
            "multi",
            entry.added,
            entry.removed,
            actor_name(&entry.modified_by),
        ));
    }
    rows.sort_by_key(|row| row.0);

    for (recorded_at, trail_id, field, kind, first, second, actor) in rows {
        let trail = trails.get(&trail_id).ok_or_else(|| {
            AuditError::Export(format!("Entry references unknown trail {}", trail_id))
        })?;

        out.write_record([
            trail.id.to_string(),
            trail.audit_date.to_string(),
            trail.visibility.to_string(),
            trail.action.to_string(),
            trail.entity_type.to_string(),
            trail.entity_id.to_string(),
            field,
            kind.to_string(),
            first,
            second,
            actor,
            recorded_at.to_rfc3339(),
        ])
        .map_err(export_err)?;
    }

    out.flush().map_err(|e| AuditError::Export(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::AuditPaths;
    use crate::models::{
        Actor, AuditAction, AuditFieldEntry, AuditMultiFieldEntry, EntityKey, TrailKey, Visibility,
    };
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

    #[test]
    fn test_entries_csv() {
        let (_temp_dir, storage) = create_test_storage();
        let key = TrailKey::new(
            Visibility::Admin,
            EntityKey::new("Order", 42),
            AuditAction::Modified,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        );
        let u1 = Actor::new("U1").reference();
        let trail = storage.upsert_trail(&key, "ORDER(42)", Some(&u1)).unwrap();
        storage
            .insert_field_entry(AuditFieldEntry::new(
                trail.id,
                "note",
                None,
                Some("leave at door, please".into()),
                Some(u1.clone()),
            ))
            .unwrap();
        storage
            .insert_multi_field_entry(AuditMultiFieldEntry::new(
                trail.id,
                "tags",
                "red, blue",
                "",
                Some(u1),
            ))
            .unwrap();

        let mut output = Vec::new();
        export_entries_csv(&storage, &mut output).unwrap();
        let csv_string = String::from_utf8(output).unwrap();
        let lines: Vec<_> = csv_string.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Trail,Date,View,Action"));
        assert!(lines[1].contains(",2026-10-19,Admin,Modified,Order,42,note,scalar,,\"leave at door, please\",U1,"));
        assert!(lines[2].contains(",tags,multi,\"red, blue\",,U1,"));
    }

    #[test]
    fn test_empty_store_has_header_only() {
        let (_temp_dir, storage) = create_test_storage();

        let mut output = Vec::new();
        export_entries_csv(&storage, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap().lines().count(), 1);
    }
}
