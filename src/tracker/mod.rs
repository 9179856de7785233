//! Change tracking for audited entities
//!
//! # Architecture
//!
//! - `AuditSchema`: the field specs declared once per entity type, plus the
//!   `EntityRegistry` mapping type tags to schemas.
//! - `ChangeTracker`: per-instance dirty maps for scalar and multi-valued
//!   fields, the acting user, and the post-create suppression flag.
//! - `AuditedRecord`: an entity's values next to its tracker; the explicit
//!   setter is the only way attributes change.
//!
//! # Example
//!
//! ```rust,ignore
//! use audit_trail::models::FieldKind;
//! use audit_trail::tracker::{AuditSchema, AuditedRecord, EntityRegistry};
//!
//! let mut schema = AuditSchema::new("Order");
//! schema.register_field("status", "workflow", FieldKind::Scalar, true)?;
//! let schema = registry.register(schema)?;
//!
//! let mut order = AuditedRecord::existing(schema, 42, values);
//! order.assign_actor(&actor)?;
//! order.set("status", "shipped");
//! ```

mod changes;
mod record;
mod schema;

pub use changes::{ChangeTracker, DirtyChanges, MultiChange, ScalarChange};
pub use record::{AuditedRecord, DisplayName, Values};
pub use schema::{AuditSchema, EntityRegistry};
