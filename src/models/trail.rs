//! Audit trail records
//!
//! Defines the rows written by the recorder: trails (one per
//! visibility/entity/action/day), the groups under them, and the scalar and
//! multi-valued field entries.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::actor::ActorRef;
use super::entity::{EntityKey, EntityType};
use super::field::FormattedValue;
use super::ids::{FieldEntryId, GroupId, MultiFieldEntryId, TrailId};

/// Which audit view a trail belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Internal view; records every audited field
    Admin,
    /// Exposed to the entity's own viewers; records public fields only
    Public,
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Visibility::Admin => write!(f, "Admin"),
            Visibility::Public => write!(f, "Public"),
        }
    }
}

/// The lifecycle action a trail records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditAction {
    Modified,
    Created,
    Deleted,
}

impl fmt::Display for AuditAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AuditAction::Modified => write!(f, "Modified"),
            AuditAction::Created => write!(f, "Created"),
            AuditAction::Deleted => write!(f, "Deleted"),
        }
    }
}

/// Direction of a manually recorded relation change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpecialAction {
    Added,
    Removed,
}

/// Unique key of a trail row
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TrailKey {
    pub visibility: Visibility,
    pub entity: EntityKey,
    pub action: AuditAction,
    pub audit_date: NaiveDate,
}

impl TrailKey {
    pub fn new(
        visibility: Visibility,
        entity: EntityKey,
        action: AuditAction,
        audit_date: NaiveDate,
    ) -> Self {
        Self {
            visibility,
            entity,
            action,
            audit_date,
        }
    }
}

/// One trail row: all changes of one action/visibility for an entity on one day
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditTrail {
    pub id: TrailId,
    pub visibility: Visibility,
    pub entity_type: EntityType,
    pub entity_id: u64,
    pub action: AuditAction,
    pub audit_date: NaiveDate,

    /// Display name of the entity when the trail was last touched
    #[serde(default)]
    pub display_name: String,

    /// Actor credited with opening the trail; never overwritten once set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ActorRef>,
}

impl AuditTrail {
    /// Create a trail row for a key
    pub fn new(key: &TrailKey) -> Self {
        Self {
            id: TrailId::new(),
            visibility: key.visibility,
            entity_type: key.entity.entity_type.clone(),
            entity_id: key.entity.entity_id,
            action: key.action,
            audit_date: key.audit_date,
            display_name: String::new(),
            modified_by: None,
        }
    }

    /// The unique key this row occupies
    pub fn key(&self) -> TrailKey {
        TrailKey {
            visibility: self.visibility,
            entity: self.entity(),
            action: self.action,
            audit_date: self.audit_date,
        }
    }

    pub fn entity(&self) -> EntityKey {
        EntityKey::new(self.entity_type.clone(), self.entity_id)
    }

    /// Refresh the header: the name always, the actor only if unset
    pub fn touch(&mut self, display_name: &str, actor: Option<&ActorRef>) {
        self.display_name = display_name.to_string();
        if self.modified_by.is_none() {
            self.modified_by = actor.cloned();
        }
    }
}

/// A named group of fields recorded under a trail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditGroup {
    pub id: GroupId,
    pub trail_id: TrailId,
    pub name: String,
}

impl AuditGroup {
    pub fn new(trail_id: TrailId, name: impl Into<String>) -> Self {
        Self {
            id: GroupId::new(),
            trail_id,
            name: name.into(),
        }
    }
}

/// One scalar field change recorded under a trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFieldEntry {
    pub id: FieldEntryId,
    pub trail_id: TrailId,
    pub field_name: String,
    pub old_value: FormattedValue,
    pub new_value: FormattedValue,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ActorRef>,
}

impl AuditFieldEntry {
    pub fn new(
        trail_id: TrailId,
        field_name: impl Into<String>,
        old_value: FormattedValue,
        new_value: FormattedValue,
        modified_by: Option<ActorRef>,
    ) -> Self {
        Self {
            id: FieldEntryId::new(),
            trail_id,
            field_name: field_name.into(),
            old_value,
            new_value,
            recorded_at: Utc::now(),
            modified_by,
        }
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}

/// One batch of relation additions/removals recorded under a trail
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditMultiFieldEntry {
    pub id: MultiFieldEntryId,
    pub trail_id: TrailId,
    pub field_name: String,
    pub added: String,
    pub removed: String,
    pub recorded_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified_by: Option<ActorRef>,
}

impl AuditMultiFieldEntry {
    pub fn new(
        trail_id: TrailId,
        field_name: impl Into<String>,
        added: impl Into<String>,
        removed: impl Into<String>,
        modified_by: Option<ActorRef>,
    ) -> Self {
        Self {
            id: MultiFieldEntryId::new(),
            trail_id,
            field_name: field_name.into(),
            added: added.into(),
            removed: removed.into(),
            recorded_at: Utc::now(),
            modified_by,
        }
    }

    pub fn with_recorded_at(mut self, recorded_at: DateTime<Utc>) -> Self {
        self.recorded_at = recorded_at;
        self
    }
}
