//! Audited record wrapper
//!
//! `AuditedRecord` holds an entity's attribute values next to its change
//! tracker. All mutation goes through the explicit setter so every
//! assignment to a registered field is observed.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use super::changes::ChangeTracker;
use super::schema::AuditSchema;
use crate::error::AuditResult;
use crate::models::{Actor, ActorRef, EntityKey, EntityType};

/// Attribute values of a record, by field name
pub type Values = BTreeMap<String, Value>;

/// How a record names itself on its trails
#[derive(Clone)]
pub enum DisplayName {
    /// A fixed name
    Static(String),
    /// Computed from the record's values when a trail is written
    Deferred(Arc<dyn Fn(&Values) -> String + Send + Sync>),
}

impl DisplayName {
    fn resolve(&self, values: &Values) -> String {
        match self {
            DisplayName::Static(name) => name.clone(),
            DisplayName::Deferred(compute) => compute(values),
        }
    }
}

impl fmt::Debug for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DisplayName::Static(name) => f.debug_tuple("Static").field(name).finish(),
            DisplayName::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

/// An entity instance under audit
#[derive(Debug, Clone)]
pub struct AuditedRecord {
    id: Option<u64>,
    values: Values,
    display_name: Option<DisplayName>,
    tracker: ChangeTracker,
}

static NULL: Value = Value::Null;

impl AuditedRecord {
    /// A record that has not been persisted yet
    pub fn new(schema: Arc<AuditSchema>) -> Self {
        Self {
            id: None,
            values: Values::new(),
            display_name: None,
            tracker: ChangeTracker::new(schema),
        }
    }

    /// A record loaded from the application's store
    pub fn existing(schema: Arc<AuditSchema>, id: u64, values: Values) -> Self {
        Self {
            id: Some(id),
            values,
            display_name: None,
            tracker: ChangeTracker::new(schema),
        }
    }

    pub fn with_display_name(mut self, display_name: DisplayName) -> Self {
        self.display_name = Some(display_name);
        self
    }

    pub fn set_display_name(&mut self, display_name: Option<DisplayName>) {
        self.display_name = display_name;
    }

    pub fn entity_type(&self) -> &EntityType {
        self.tracker.schema().entity_type()
    }

    pub fn schema(&self) -> &Arc<AuditSchema> {
        self.tracker.schema()
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    /// Give the record its identity once the application stored it
    pub fn assign_id(&mut self, id: u64) {
        self.id = Some(id);
    }

    /// `(type, id)` key, once the record has an identity
    pub fn key(&self) -> Option<EntityKey> {
        self.id
            .map(|id| EntityKey::new(self.entity_type().clone(), id))
    }

    pub fn get(&self, name: &str) -> &Value {
        self.values.get(name).unwrap_or(&NULL)
    }

    pub fn values(&self) -> &Values {
        &self.values
    }

    /// Assign an attribute, recording the change when the record exists
    pub fn set(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        if self.id.is_some() {
            let current = self.values.get(name).unwrap_or(&NULL);
            self.tracker.on_attribute_set(name, current, &value);
        }
        self.values.insert(name.to_string(), value);
    }

    /// Attach the actor credited with the next recorded changes
    pub fn assign_actor(&mut self, actor: &Actor) -> AuditResult<()> {
        self.tracker.assign_actor(actor)
    }

    pub fn modified_by(&self) -> Option<&ActorRef> {
        self.tracker.modified_by()
    }

    pub fn tracker(&self) -> &ChangeTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut ChangeTracker {
        &mut self.tracker
    }

    /// Name used on trail rows
    ///
    /// The declared display name when it is present and non-empty, otherwise
    /// `TYPE(id)`.
    pub fn display_name(&self) -> String {
        let declared = self
            .display_name
            .as_ref()
            .map(|name| name.resolve(&self.values))
            .filter(|name| !name.trim().is_empty());

        match declared {
            Some(name) => name,
            None => format!(
                "{}({})",
                self.entity_type().upper(),
                self.id.map(|id| id.to_string()).unwrap_or_default()
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;
    use serde_json::json;

    fn schema() -> Arc<AuditSchema> {
        let mut schema = AuditSchema::new("Order");
        schema
            .register_field("status", "workflow", FieldKind::Scalar, true)
            .unwrap();
        Arc::new(schema)
    }

    fn values(status: &str) -> Values {
        let mut values = Values::new();
        values.insert("status".into(), json!(status));
        values
    }

    #[test]
    fn test_new_record_not_tracked() {
        let mut record = AuditedRecord::new(schema());
        record.set("status", "pending");
        assert_eq!(record.get("status"), &json!("pending"));
        assert!(!record.tracker().is_dirty());
    }

    #[test]
    fn test_existing_record_tracked() {
        let mut record = AuditedRecord::existing(schema(), 42, values("pending"));
        record.set("status", "shipped");

        let change = record.tracker().pending_scalar("status").unwrap();
        assert_eq!(change.old.as_deref(), Some("pending"));
        assert_eq!(change.new.as_deref(), Some("shipped"));
    }

    #[test]
    fn test_assign_id_starts_tracking() {
        let mut record = AuditedRecord::new(schema());
        record.set("status", "pending");
        record.assign_id(7);
        record.set("status", "paid");
        assert!(record.tracker().is_dirty());
        assert_eq!(record.key().unwrap().to_string(), "Order#7");
    }

    #[test]
    fn test_missing_value_reads_as_null() {
        let record = AuditedRecord::new(schema());
        assert!(record.get("status").is_null());
    }

    #[test]
    fn test_default_display_name() {
        let record = AuditedRecord::existing(schema(), 42, Values::new());
        assert_eq!(record.display_name(), "ORDER(42)");
    }

    #[test]
    fn test_static_display_name() {
        let record = AuditedRecord::existing(schema(), 42, Values::new())
            .with_display_name(DisplayName::Static("Order #42".into()));
        assert_eq!(record.display_name(), "Order #42");
    }

    #[test]
    fn test_empty_display_name_falls_back() {
        let record = AuditedRecord::existing(schema(), 42, Values::new())
            .with_display_name(DisplayName::Static("  ".into()));
        assert_eq!(record.display_name(), "ORDER(42)");
    }

    #[test]
    fn test_deferred_display_name_sees_current_values() {
        let mut record = AuditedRecord::existing(schema(), 42, values("pending"))
            .with_display_name(DisplayName::Deferred(Arc::new(|values: &Values| {
                format!("Order ({})", values["status"].as_str().unwrap_or("?"))
            })));

        record.set("status", "shipped");
        assert_eq!(record.display_name(), "Order (shipped)");
    }
}
