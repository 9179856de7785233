//! Storage layer for audit-trail
//!
//! Provides JSON file storage with atomic writes for trails, groups and
//! field entries, and the `TrailStore` port the recorder writes through.

pub mod entries;
pub mod file_io;
mod store;
pub mod trails;

pub use entries::EntryRepository;
pub use file_io::{read_json, write_json_atomic};
pub use store::TrailStore;
pub use trails::TrailRepository;

use crate::config::paths::AuditPaths;
use crate::error::{AuditError, AuditResult};
use crate::models::{
    ActorRef, AuditFieldEntry, AuditGroup, AuditMultiFieldEntry, AuditTrail, EntityKey, TrailId,
    TrailKey,
};

/// Main storage coordinator that provides access to all repositories
///
/// Assumes a single writer. Each handle works on the snapshot it loaded, and
/// `save_all` rewrites both files from that snapshot, so rows saved by
/// another handle or process since the last `load_all` are overwritten.
pub struct Storage {
    paths: AuditPaths,
    pub trails: TrailRepository,
    pub entries: EntryRepository,
}

impl Storage {
    /// Create a new Storage instance
    pub fn new(paths: AuditPaths) -> Result<Self, AuditError> {
        paths.ensure_directories()?;

        Ok(Self {
            trails: TrailRepository::new(paths.trails_file()),
            entries: EntryRepository::new(paths.entries_file()),
            paths,
        })
    }

    /// Get the paths configuration
    pub fn paths(&self) -> &AuditPaths {
        &self.paths
    }

    /// Load all data from disk
    pub fn load_all(&mut self) -> Result<(), AuditError> {
        self.trails.load()?;
        self.entries.load()?;
        Ok(())
    }

    /// Save all data to disk
    pub fn save_all(&self) -> Result<(), AuditError> {
        self.trails.save()?;
        self.entries.save()?;
        Ok(())
    }
}

impl TrailStore for Storage {
    fn upsert_trail(
        &self,
        key: &TrailKey,
        display_name: &str,
        actor: Option<&ActorRef>,
    ) -> AuditResult<AuditTrail> {
        self.trails.upsert(key, display_name, actor)
    }

    fn get_or_create_group(&self, trail_id: TrailId, name: &str) -> AuditResult<AuditGroup> {
        self.trails.get_or_create_group(trail_id, name)
    }

    fn insert_field_entry(&self, entry: AuditFieldEntry) -> AuditResult<()> {
        self.entries.insert_field(entry)
    }

    fn insert_multi_field_entry(&self, entry: AuditMultiFieldEntry) -> AuditResult<()> {
        self.entries.insert_multi_field(entry)
    }

    fn trail(&self, id: TrailId) -> AuditResult<Option<AuditTrail>> {
        self.trails.get(id)
    }

    fn trails_for(&self, entity: &EntityKey) -> AuditResult<Vec<AuditTrail>> {
        self.trails.get_for_entity(entity)
    }

    fn all_trails(&self) -> AuditResult<Vec<AuditTrail>> {
        self.trails.get_all()
    }

    fn groups_for(&self, trail_id: TrailId) -> AuditResult<Vec<AuditGroup>> {
        self.trails.get_groups(trail_id)
    }

    fn field_entries_for(&self, trail_id: TrailId) -> AuditResult<Vec<AuditFieldEntry>> {
        self.entries.fields_for(trail_id)
    }

    fn multi_field_entries_for(&self, trail_id: TrailId) -> AuditResult<Vec<AuditMultiFieldEntry>> {
        self.entries.multi_fields_for(trail_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AuditAction, Visibility};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn loaded(paths: &AuditPaths) -> Storage {
        let mut storage = Storage::new(paths.clone()).unwrap();
        storage.load_all().unwrap();
        storage
    }

    fn order_key(id: u64) -> TrailKey {
        TrailKey::new(
            Visibility::Admin,
            EntityKey::new("Order", id),
            AuditAction::Modified,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        )
    }

    #[test]
    fn test_storage_creation() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        let mut storage = Storage::new(paths).unwrap();
        storage.load_all().unwrap();

        assert!(temp_dir.path().join("data").exists());
        assert_eq!(storage.trails.count().unwrap(), 0);
        assert_eq!(storage.entries.count().unwrap(), 0);
    }

    #[test]
    fn test_save_all_writes_both_files() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        let storage = Storage::new(paths.clone()).unwrap();

        storage.save_all().unwrap();

        assert!(paths.trails_file().exists());
        assert!(paths.entries_file().exists());
    }

    #[test]
    fn test_save_all_writes_loaded_snapshot() {
        let temp_dir = TempDir::new().unwrap();
        let paths = AuditPaths::with_base_dir(temp_dir.path().to_path_buf());
        let first = loaded(&paths);
        let mut second = loaded(&paths);

        first.trails.upsert(&order_key(1), "ORDER(1)", None).unwrap();
        first.save_all().unwrap();

        // Stale handle: its save drops the first handle's trail
        second.trails.upsert(&order_key(2), "ORDER(2)", None).unwrap();
        second.save_all().unwrap();
        assert_eq!(loaded(&paths).trails.count().unwrap(), 1);

        // Reloading before writing keeps what is on disk
        first.save_all().unwrap();
        second.load_all().unwrap();
        second.trails.upsert(&order_key(2), "ORDER(2)", None).unwrap();
        second.save_all().unwrap();
        assert_eq!(loaded(&paths).trails.count().unwrap(), 2);
    }
}
