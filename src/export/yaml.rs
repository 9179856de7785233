//! YAML Export functionality
//!
//! Exports the complete audit store to YAML format for human review.

use crate::error::{AuditError, AuditResult};
use crate::export::json::AuditExport;
use crate::storage::Storage;
use std::io::Write;

/// Export the full audit store to YAML format
pub fn export_full_yaml<W: Write>(storage: &Storage, writer: &mut W) -> AuditResult<()> {
    let export = AuditExport::from_storage(storage)?;
    export.validate().map_err(AuditError::Export)?;

    writeln!(writer, "# audit-trail export")
        .and_then(|_| writeln!(writer, "# Generated: {}", export.exported_at))
        .and_then(|_| writeln!(writer, "# App Version: {}", export.app_version))
        .and_then(|_| writeln!(writer))
        .map_err(|e| AuditError::Export(e.to_string()))?;

    serde_yaml::to_writer(writer, &export).map_err(|e| AuditError::Export(e.to_string()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::paths::AuditPaths;
    use crate::models::{AuditAction, EntityKey, TrailKey, Visibility};
    use crate::storage::TrailStore;
    use chrono::NaiveDate;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_export() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        let key = TrailKey::new(
            Visibility::Public,
            EntityKey::new("Order", 42),
            AuditAction::Created,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        );
        storage.upsert_trail(&key, "Order #42", None).unwrap();

        let mut output = Vec::new();
        export_full_yaml(&storage, &mut output).unwrap();
        let yaml = String::from_utf8(output).unwrap();

        assert!(yaml.starts_with("# audit-trail export"));
        let parsed: AuditExport = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.trails[0].display_name, "Order #42");
        assert!(yaml.contains("visibility: public"));
        assert!(yaml.contains("action: created"));
        assert!(yaml.contains("trail_count: 1"));
    }
}
