//! Core data models for audit-trail
//!
//! This module contains the data structures of the audit domain: actors,
//! entity keys, field declarations, and the trail rows written on every
//! lifecycle event.

pub mod actor;
pub mod entity;
pub mod field;
pub mod ids;
pub mod trail;

pub use actor::{Actor, ActorRef, ActorValidationError};
pub use entity::{EntityKey, EntityType};
pub use field::{default_format, FieldKind, FieldSpec, FormattedValue, Formatter};
pub use ids::{ActorId, FieldEntryId, GroupId, MultiFieldEntryId, TrailId};
pub use trail::{
    AuditAction, AuditFieldEntry, AuditGroup, AuditMultiFieldEntry, AuditTrail, SpecialAction,
    TrailKey, Visibility,
};
