//! Entry repository for JSON storage
//!
//! Field entries are append-only: the repository offers inserts and reads,
//! never updates or deletes.

use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::debug;

use crate::error::AuditError;
use crate::models::{AuditFieldEntry, AuditMultiFieldEntry, TrailId};

use super::file_io::{read_json, write_json_atomic};

/// Serializable entry data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct EntryData {
    #[serde(default)]
    fields: Vec<AuditFieldEntry>,
    #[serde(default)]
    multi_fields: Vec<AuditMultiFieldEntry>,
}

/// Repository for scalar and multi-valued field entries
pub struct EntryRepository {
    path: PathBuf,
    data: RwLock<EntryData>,
}

impl EntryRepository {
    /// Create a new entry repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(EntryData::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, EntryData>, AuditError> {
        self.data
            .read()
            .map_err(|e| AuditError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, EntryData>, AuditError> {
        self.data
            .write()
            .map_err(|e| AuditError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load entries from disk
    pub fn load(&self) -> Result<(), AuditError> {
        let file_data: EntryData = read_json(&self.path)?;
        *self.write()? = file_data;
        Ok(())
    }

    /// Save entries to disk, in insertion order
    pub fn save(&self) -> Result<(), AuditError> {
        let data = self.read()?;
        write_json_atomic(&self.path, &*data)
    }

    /// Append a scalar field entry
    pub fn insert_field(&self, entry: AuditFieldEntry) -> Result<(), AuditError> {
        debug!(
            "Recording '{}' under {}: {:?} -> {:?}",
            entry.field_name, entry.trail_id, entry.old_value, entry.new_value
        );
        self.write()?.fields.push(entry);
        Ok(())
    }

    /// Append a multi-valued field entry
    pub fn insert_multi_field(&self, entry: AuditMultiFieldEntry) -> Result<(), AuditError> {
        debug!(
            "Recording relation '{}' under {}: +[{}] -[{}]",
            entry.field_name, entry.trail_id, entry.added, entry.removed
        );
        self.write()?.multi_fields.push(entry);
        Ok(())
    }

    /// Scalar entries recorded under a trail, oldest first
    pub fn fields_for(&self, trail_id: TrailId) -> Result<Vec<AuditFieldEntry>, AuditError> {
        Ok(self
            .read()?
            .fields
            .iter()
            .filter(|entry| entry.trail_id == trail_id)
            .cloned()
            .collect())
    }

    /// Multi-valued entries recorded under a trail, oldest first
    pub fn multi_fields_for(
        &self,
        trail_id: TrailId,
    ) -> Result<Vec<AuditMultiFieldEntry>, AuditError> {
        Ok(self
            .read()?
            .multi_fields
            .iter()
            .filter(|entry| entry.trail_id == trail_id)
            .cloned()
            .collect())
    }

    /// Every scalar entry
    pub fn all_fields(&self) -> Result<Vec<AuditFieldEntry>, AuditError> {
        Ok(self.read()?.fields.clone())
    }

    /// Every multi-valued entry
    pub fn all_multi_fields(&self) -> Result<Vec<AuditMultiFieldEntry>, AuditError> {
        Ok(self.read()?.multi_fields.clone())
    }

    /// Count all entries of both kinds
    pub fn count(&self) -> Result<usize, AuditError> {
        let data = self.read()?;
        Ok(data.fields.len() + data.multi_fields.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, EntryRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("entries.json");
        let repo = EntryRepository::new(path);
        (temp_dir, repo)
    }

    #[test]
    fn test_insert_and_filter_by_trail() {
        let (_temp_dir, repo) = create_test_repo();
        let trail_a = TrailId::new();
        let trail_b = TrailId::new();

        repo.insert_field(AuditFieldEntry::new(
            trail_a,
            "status",
            Some("pending".into()),
            Some("shipped".into()),
            None,
        ))
        .unwrap();
        repo.insert_field(AuditFieldEntry::new(trail_b, "status", None, Some("new".into()), None))
            .unwrap();
        repo.insert_multi_field(AuditMultiFieldEntry::new(trail_a, "tags", "red", "", None))
            .unwrap();

        assert_eq!(repo.fields_for(trail_a).unwrap().len(), 1);
        assert_eq!(repo.fields_for(trail_b).unwrap().len(), 1);
        assert_eq!(repo.multi_fields_for(trail_a).unwrap().len(), 1);
        assert!(repo.multi_fields_for(trail_b).unwrap().is_empty());
        assert_eq!(repo.count().unwrap(), 3);
    }

    #[test]
    fn test_save_and_reload() {
        let (temp_dir, repo) = create_test_repo();
        let trail = TrailId::new();

        repo.insert_field(AuditFieldEntry::new(
            trail,
            "status",
            Some("pending".into()),
            None,
            None,
        ))
        .unwrap();
        repo.save().unwrap();

        let repo2 = EntryRepository::new(temp_dir.path().join("entries.json"));
        repo2.load().unwrap();

        let fields = repo2.fields_for(trail).unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].old_value.as_deref(), Some("pending"));
        assert_eq!(fields[0].new_value, None);
    }
}
