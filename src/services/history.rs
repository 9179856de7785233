//! History service
//!
//! Read-side queries over recorded trails.

use serde::Serialize;

use crate::error::{AuditError, AuditResult};
use crate::models::{
    AuditFieldEntry, AuditGroup, AuditMultiFieldEntry, AuditTrail, EntityKey, Visibility,
};
use crate::storage::{Storage, TrailStore};

/// A trail with everything recorded under it
#[derive(Debug, Clone, Serialize)]
pub struct TrailDetail {
    pub trail: AuditTrail,
    pub groups: Vec<AuditGroup>,
    pub fields: Vec<AuditFieldEntry>,
    pub multi_fields: Vec<AuditMultiFieldEntry>,
}

impl TrailDetail {
    pub fn entry_count(&self) -> usize {
        self.fields.len() + self.multi_fields.len()
    }
}

/// Service for browsing audit history
pub struct HistoryService<'a> {
    storage: &'a Storage,
}

impl<'a> HistoryService<'a> {
    pub fn new(storage: &'a Storage) -> Self {
        Self { storage }
    }

    /// Most recent trails of an entity, newest audit day first
    ///
    /// `visibility` restricts the result to one view; `None` returns both.
    pub fn audit_for(
        &self,
        entity: &EntityKey,
        visibility: Option<Visibility>,
        limit: usize,
    ) -> AuditResult<Vec<AuditTrail>> {
        let trails = self
            .storage
            .trails_for(entity)?
            .into_iter()
            .filter(|trail| visibility.map_or(true, |v| trail.visibility == v))
            .take(limit)
            .collect();
        Ok(trails)
    }

    /// Load a trail by full id or short display form
    pub fn trail_detail(&self, identifier: &str) -> AuditResult<TrailDetail> {
        let trail = self
            .storage
            .trails
            .find(identifier)?
            .ok_or_else(|| AuditError::trail_not_found(identifier))?;

        self.detail(trail)
    }

    /// Details of every trail, oldest audit day first
    pub fn all_details(&self) -> AuditResult<Vec<TrailDetail>> {
        self.storage
            .all_trails()?
            .into_iter()
            .map(|trail| self.detail(trail))
            .collect()
    }

    fn detail(&self, trail: AuditTrail) -> AuditResult<TrailDetail> {
        Ok(TrailDetail {
            groups: self.storage.groups_for(trail.id)?,
            fields: self.storage.field_entries_for(trail.id)?,
            multi_fields: self.storage.multi_field_entries_for(trail.id)?,
            trail,
        })
    }
}
