//! Trail repository for JSON storage
//!
//! Manages trail rows and their groups in trails.json. Both unique keys
//! (`TrailKey` for trails, `(trail, name)` for groups) are indexed under the
//! same lock as the rows, so get-or-create never produces a second row for
//! a key.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use tracing::info;

use crate::error::AuditError;
use crate::models::{ActorRef, AuditGroup, AuditTrail, EntityKey, GroupId, TrailId, TrailKey};

use super::file_io::{read_json, write_json_atomic};

/// Serializable trail data structure
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
struct TrailData {
    trails: Vec<AuditTrail>,
    #[serde(default)]
    groups: Vec<AuditGroup>,
}

#[derive(Debug, Default)]
struct TrailIndex {
    trails: HashMap<TrailId, AuditTrail>,
    by_key: HashMap<TrailKey, TrailId>,
    groups: HashMap<GroupId, AuditGroup>,
    groups_by_name: HashMap<(TrailId, String), GroupId>,
}

impl TrailIndex {
    fn insert_trail(&mut self, trail: AuditTrail) {
        self.by_key.insert(trail.key(), trail.id);
        self.trails.insert(trail.id, trail);
    }

    fn insert_group(&mut self, group: AuditGroup) {
        self.groups_by_name
            .insert((group.trail_id, group.name.clone()), group.id);
        self.groups.insert(group.id, group);
    }
}

/// Repository for trail and group persistence
pub struct TrailRepository {
    path: PathBuf,
    data: RwLock<TrailIndex>,
}

impl TrailRepository {
    /// Create a new trail repository
    pub fn new(path: PathBuf) -> Self {
        Self {
            path,
            data: RwLock::new(TrailIndex::default()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, TrailIndex>, AuditError> {
        self.data
            .read()
            .map_err(|e| AuditError::Storage(format!("Failed to acquire read lock: {}", e)))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, TrailIndex>, AuditError> {
        self.data
            .write()
            .map_err(|e| AuditError::Storage(format!("Failed to acquire write lock: {}", e)))
    }

    /// Load trails from disk
    pub fn load(&self) -> Result<(), AuditError> {
        let file_data: TrailData = read_json(&self.path)?;
        let mut data = self.write()?;

        *data = TrailIndex::default();
        for trail in file_data.trails {
            data.insert_trail(trail);
        }
        for group in file_data.groups {
            data.insert_group(group);
        }

        Ok(())
    }

    /// Save trails to disk
    pub fn save(&self) -> Result<(), AuditError> {
        let data = self.read()?;

        let mut trails: Vec<_> = data.trails.values().cloned().collect();
        trails.sort_by(|a, b| {
            a.audit_date
                .cmp(&b.audit_date)
                .then_with(|| a.entity().cmp(&b.entity()))
                .then_with(|| a.action.cmp(&b.action))
                .then_with(|| a.visibility.cmp(&b.visibility))
        });

        let mut groups: Vec<_> = data.groups.values().cloned().collect();
        groups.sort_by(|a, b| {
            a.trail_id
                .as_uuid()
                .cmp(b.trail_id.as_uuid())
                .then_with(|| a.name.cmp(&b.name))
        });

        write_json_atomic(&self.path, &TrailData { trails, groups })
    }

    /// Get or create the trail for a key and refresh its header
    ///
    /// The display name is always replaced; the actor is only set when the
    /// trail does not have one yet.
    pub fn upsert(
        &self,
        key: &TrailKey,
        display_name: &str,
        actor: Option<&ActorRef>,
    ) -> Result<AuditTrail, AuditError> {
        let mut data = self.write()?;

        let existing = data.by_key.get(key).copied();
        let id = match existing {
            Some(id) => id,
            None => {
                let trail = AuditTrail::new(key);
                let id = trail.id;
                info!(
                    "Opened {} {} trail for {} on {}",
                    key.visibility, key.action, key.entity, key.audit_date
                );
                data.insert_trail(trail);
                id
            }
        };

        let trail = data
            .trails
            .get_mut(&id)
            .ok_or_else(|| AuditError::Storage(format!("Trail index out of sync for {}", id)))?;
        trail.touch(display_name, actor);
        Ok(trail.clone())
    }

    /// Get or create the named group under a trail
    pub fn get_or_create_group(
        &self,
        trail_id: TrailId,
        name: &str,
    ) -> Result<AuditGroup, AuditError> {
        let mut data = self.write()?;

        if !data.trails.contains_key(&trail_id) {
            return Err(AuditError::trail_not_found(trail_id.to_string()));
        }

        if let Some(group) = data
            .groups_by_name
            .get(&(trail_id, name.to_string()))
            .and_then(|id| data.groups.get(id))
        {
            return Ok(group.clone());
        }

        let group = AuditGroup::new(trail_id, name);
        data.insert_group(group.clone());
        Ok(group)
    }

    /// Get a trail by ID
    pub fn get(&self, id: TrailId) -> Result<Option<AuditTrail>, AuditError> {
        Ok(self.read()?.trails.get(&id).cloned())
    }

    /// Get a trail by its unique key
    pub fn get_by_key(&self, key: &TrailKey) -> Result<Option<AuditTrail>, AuditError> {
        let data = self.read()?;
        Ok(data.by_key.get(key).and_then(|id| data.trails.get(id)).cloned())
    }

    /// Find a trail by full ID or its short display form (`trl-xxxxxxxx`)
    pub fn find(&self, identifier: &str) -> Result<Option<AuditTrail>, AuditError> {
        if let Ok(id) = identifier.parse::<TrailId>() {
            return self.get(id);
        }

        let data = self.read()?;
        let mut matches = data
            .trails
            .values()
            .filter(|trail| trail.id.to_string() == identifier);

        match (matches.next(), matches.next()) {
            (Some(trail), None) => Ok(Some(trail.clone())),
            (None, _) => Ok(None),
            (Some(_), Some(_)) => Err(AuditError::Validation(format!(
                "Trail identifier '{}' is ambiguous",
                identifier
            ))),
        }
    }

    /// All trails of an entity, newest day first
    pub fn get_for_entity(&self, entity: &EntityKey) -> Result<Vec<AuditTrail>, AuditError> {
        let data = self.read()?;

        let mut trails: Vec<_> = data
            .trails
            .values()
            .filter(|trail| trail.entity_type == entity.entity_type && trail.entity_id == entity.entity_id)
            .cloned()
            .collect();

        trails.sort_by(|a, b| {
            b.audit_date
                .cmp(&a.audit_date)
                .then_with(|| a.action.cmp(&b.action))
                .then_with(|| a.visibility.cmp(&b.visibility))
        });
        Ok(trails)
    }

    /// All trails, oldest day first
    pub fn get_all(&self) -> Result<Vec<AuditTrail>, AuditError> {
        let data = self.read()?;

        let mut trails: Vec<_> = data.trails.values().cloned().collect();
        trails.sort_by(|a, b| {
            a.audit_date
                .cmp(&b.audit_date)
                .then_with(|| a.entity().cmp(&b.entity()))
                .then_with(|| a.action.cmp(&b.action))
                .then_with(|| a.visibility.cmp(&b.visibility))
        });
        Ok(trails)
    }

    /// Groups under a trail, by name
    pub fn get_groups(&self, trail_id: TrailId) -> Result<Vec<AuditGroup>, AuditError> {
        let data = self.read()?;

        let mut groups: Vec<_> = data
            .groups
            .values()
            .filter(|group| group.trail_id == trail_id)
            .cloned()
            .collect();
        groups.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(groups)
    }

    /// Count trails
    pub fn count(&self) -> Result<usize, AuditError> {
        Ok(self.read()?.trails.len())
    }

    /// Count groups
    pub fn group_count(&self) -> Result<usize, AuditError> {
        Ok(self.read()?.groups.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Actor, AuditAction, Visibility};
    use chrono::NaiveDate;
    use tempfile::TempDir;

    fn create_test_repo() -> (TempDir, TrailRepository) {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("trails.json");
        let repo = TrailRepository::new(path);
        (temp_dir, repo)
    }

    fn key(visibility: Visibility, action: AuditAction, day: u32) -> TrailKey {
        TrailKey::new(
            visibility,
            EntityKey::new("Order", 42),
            action,
            NaiveDate::from_ymd_opt(2026, 10, day).unwrap(),
        )
    }

    #[test]
    fn test_empty_load() {
        let (_temp_dir, repo) = create_test_repo();
        repo.load().unwrap();
        assert_eq!(repo.count().unwrap(), 0);
    }

    #[test]
    fn test_upsert_is_get_or_create() {
        let (_temp_dir, repo) = create_test_repo();
        let k = key(Visibility::Admin, AuditAction::Modified, 19);

        let first = repo.upsert(&k, "ORDER(42)", None).unwrap();
        let second = repo.upsert(&k, "Order #42", None).unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(second.display_name, "Order #42");
        assert_eq!(repo.count().unwrap(), 1);
    }

    #[test]
    fn test_upsert_distinct_keys() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(&key(Visibility::Admin, AuditAction::Modified, 19), "x", None)
            .unwrap();
        repo.upsert(&key(Visibility::Public, AuditAction::Modified, 19), "x", None)
            .unwrap();
        repo.upsert(&key(Visibility::Admin, AuditAction::Created, 19), "x", None)
            .unwrap();
        repo.upsert(&key(Visibility::Admin, AuditAction::Modified, 20), "x", None)
            .unwrap();
        assert_eq!(repo.count().unwrap(), 4);
    }

    #[test]
    fn test_upsert_keeps_first_actor() {
        let (_temp_dir, repo) = create_test_repo();
        let k = key(Visibility::Admin, AuditAction::Modified, 19);
        let u1 = Actor::new("u1").reference();
        let u2 = Actor::new("u2").reference();

        repo.upsert(&k, "x", Some(&u1)).unwrap();
        let trail = repo.upsert(&k, "x", Some(&u2)).unwrap();
        assert_eq!(trail.modified_by, Some(u1));
    }

    #[test]
    fn test_group_get_or_create() {
        let (_temp_dir, repo) = create_test_repo();
        let trail = repo
            .upsert(&key(Visibility::Admin, AuditAction::Modified, 19), "x", None)
            .unwrap();

        let g1 = repo.get_or_create_group(trail.id, "workflow").unwrap();
        let g2 = repo.get_or_create_group(trail.id, "workflow").unwrap();
        repo.get_or_create_group(trail.id, "billing").unwrap();

        assert_eq!(g1.id, g2.id);
        assert_eq!(repo.group_count().unwrap(), 2);
        let names: Vec<_> = repo
            .get_groups(trail.id)
            .unwrap()
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["billing", "workflow"]);
    }

    #[test]
    fn test_group_requires_trail() {
        let (_temp_dir, repo) = create_test_repo();
        let err = repo.get_or_create_group(TrailId::new(), "workflow").unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_for_entity_newest_first() {
        let (_temp_dir, repo) = create_test_repo();
        repo.upsert(&key(Visibility::Admin, AuditAction::Modified, 18), "x", None)
            .unwrap();
        repo.upsert(&key(Visibility::Admin, AuditAction::Modified, 20), "x", None)
            .unwrap();

        let other = TrailKey::new(
            Visibility::Admin,
            EntityKey::new("Order", 43),
            AuditAction::Modified,
            NaiveDate::from_ymd_opt(2026, 10, 19).unwrap(),
        );
        repo.upsert(&other, "y", None).unwrap();

        let trails = repo.get_for_entity(&EntityKey::new("Order", 42)).unwrap();
        assert_eq!(trails.len(), 2);
        assert!(trails[0].audit_date > trails[1].audit_date);
    }

    #[test]
    fn test_find_by_short_id() {
        let (_temp_dir, repo) = create_test_repo();
        let trail = repo
            .upsert(&key(Visibility::Admin, AuditAction::Modified, 19), "x", None)
            .unwrap();

        let by_full = repo.find(&trail.id.as_uuid().to_string()).unwrap().unwrap();
        let by_short = repo.find(&trail.id.to_string()).unwrap().unwrap();
        assert_eq!(by_full.id, trail.id);
        assert_eq!(by_short.id, trail.id);
        assert!(repo.find("trl-00000000").unwrap().is_none());
    }

    #[test]
    fn test_save_and_reload_keeps_indexes() {
        let (temp_dir, repo) = create_test_repo();
        let k = key(Visibility::Admin, AuditAction::Modified, 19);
        let trail = repo.upsert(&k, "ORDER(42)", None).unwrap();
        let group = repo.get_or_create_group(trail.id, "workflow").unwrap();
        repo.save().unwrap();

        let repo2 = TrailRepository::new(temp_dir.path().join("trails.json"));
        repo2.load().unwrap();

        // Same key and group resolve to the stored rows
        assert_eq!(repo2.upsert(&k, "ORDER(42)", None).unwrap().id, trail.id);
        assert_eq!(
            repo2.get_or_create_group(trail.id, "workflow").unwrap().id,
            group.id
        );
        assert_eq!(repo2.count().unwrap(), 1);
    }
}
