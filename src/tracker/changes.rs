//! Per-instance dirty-field bookkeeping
//!
//! A `ChangeTracker` lives with one audited entity instance. Between two
//! lifecycle events it accumulates the scalar fields whose formatted value
//! changed and the relation values added to or removed from multi-valued
//! fields. The trail recorder drains it exactly once per event.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::schema::AuditSchema;
use crate::error::{AuditError, AuditResult};
use crate::models::{Actor, ActorRef, FormattedValue};

/// Pending change of a scalar field: window baseline and newest value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScalarChange {
    pub old: FormattedValue,
    pub new: FormattedValue,
}

/// Pending additions and removals of a multi-valued field, in arrival order
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultiChange {
    pub added: Vec<String>,
    pub removed: Vec<String>,
}

impl MultiChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }

    /// Join both lists for storage
    pub fn joined(&self, delimiter: &str) -> (String, String) {
        (self.added.join(delimiter), self.removed.join(delimiter))
    }
}

/// Everything a tracker accumulated during one lifecycle window
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DirtyChanges {
    pub scalars: BTreeMap<String, ScalarChange>,
    pub multis: BTreeMap<String, MultiChange>,
}

impl DirtyChanges {
    pub fn is_empty(&self) -> bool {
        self.scalars.is_empty() && self.multis.is_empty()
    }
}

/// Dirty-field tracker attached to one entity instance
#[derive(Debug, Clone)]
pub struct ChangeTracker {
    schema: Arc<AuditSchema>,
    dirty_scalars: BTreeMap<String, ScalarChange>,
    dirty_multis: BTreeMap<String, MultiChange>,
    modified_by: Option<ActorRef>,
    suppress_next: bool,
}

impl ChangeTracker {
    /// Create an empty tracker for an instance of the schema's entity type
    pub fn new(schema: Arc<AuditSchema>) -> Self {
        Self {
            schema,
            dirty_scalars: BTreeMap::new(),
            dirty_multis: BTreeMap::new(),
            modified_by: None,
            suppress_next: false,
        }
    }

    pub fn schema(&self) -> &Arc<AuditSchema> {
        &self.schema
    }

    /// Observe an assignment to `name`
    ///
    /// Only registered scalar fields are tracked, and only when the formatted
    /// values differ. Returns whether the dirty map changed.
    pub fn on_attribute_set(&mut self, name: &str, current: &Value, new: &Value) -> bool {
        let Some(spec) = self.schema.field(name).filter(|spec| spec.kind.is_scalar()) else {
            return false;
        };

        let formatted_current = spec.format(current);
        let formatted_new = spec.format(new);
        if formatted_current == formatted_new {
            return false;
        }

        match self.dirty_scalars.entry(name.to_string()) {
            Entry::Occupied(mut pending) => {
                if pending.get().old == formatted_new {
                    // Back to the baseline: nothing left to record
                    pending.remove();
                } else {
                    pending.get_mut().new = formatted_new;
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(ScalarChange {
                    old: formatted_current,
                    new: formatted_new,
                });
            }
        }

        debug!(
            "{}: field '{}' marked dirty",
            self.schema.entity_type(),
            name
        );
        true
    }

    /// Observe values being linked through a multi-valued field
    pub fn on_relation_added(&mut self, field: &str, values: &[Value]) -> bool {
        self.on_relation_changed(field, values, true)
    }

    /// Observe values being unlinked from a multi-valued field
    pub fn on_relation_removed(&mut self, field: &str, values: &[Value]) -> bool {
        self.on_relation_changed(field, values, false)
    }

    fn on_relation_changed(&mut self, field: &str, values: &[Value], added: bool) -> bool {
        let Some(spec) = self.schema.field(field).filter(|spec| spec.kind.is_multi()) else {
            return false;
        };

        let formatted: Vec<String> = values
            .iter()
            .map(|value| spec.format(value).unwrap_or_default())
            .collect();

        let pending = self.dirty_multis.entry(field.to_string()).or_default();
        if added {
            pending.added.extend(formatted);
        } else {
            pending.removed.extend(formatted);
        }

        debug!(
            "{}: relation '{}' {} {} value(s)",
            self.schema.entity_type(),
            field,
            if added { "gained" } else { "lost" },
            values.len()
        );
        true
    }

    /// Drain both dirty maps
    pub fn consume_and_clear(&mut self) -> DirtyChanges {
        DirtyChanges {
            scalars: std::mem::take(&mut self.dirty_scalars),
            multis: std::mem::take(&mut self.dirty_multis),
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty_scalars.is_empty() || !self.dirty_multis.is_empty()
    }

    pub fn pending_scalar(&self, field: &str) -> Option<&ScalarChange> {
        self.dirty_scalars.get(field)
    }

    pub fn pending_multi(&self, field: &str) -> Option<&MultiChange> {
        self.dirty_multis.get(field)
    }

    /// Attach the actor credited with the next recorded changes
    pub fn assign_actor(&mut self, actor: &Actor) -> AuditResult<()> {
        actor
            .validate()
            .map_err(|e| AuditError::InvalidActor(e.to_string()))?;
        self.modified_by = Some(actor.reference());
        Ok(())
    }

    pub fn modified_by(&self) -> Option<&ActorRef> {
        self.modified_by.as_ref()
    }

    /// Swallow the next save event (the post-create write-back)
    pub fn suppress_next_capture(&mut self) {
        self.suppress_next = true;
    }

    pub fn is_suppressed(&self) -> bool {
        self.suppress_next
    }

    /// Read and clear the suppression flag
    pub fn take_suppression(&mut self) -> bool {
        std::mem::replace(&mut self.suppress_next, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::FieldKind;
    use serde_json::json;

    fn tracker() -> ChangeTracker {
        let mut schema = AuditSchema::new("Order");
        schema
            .register_field("status", "workflow", FieldKind::Scalar, true)
            .unwrap();
        schema
            .register_field("quantity", "workflow", FieldKind::Scalar, false)
            .unwrap();
        schema
            .register_field("tags", "labels", FieldKind::Multi, false)
            .unwrap();
        schema
            .register_field("links", "labels", FieldKind::Special, false)
            .unwrap();
        ChangeTracker::new(Arc::new(schema))
    }

    #[test]
    fn test_scalar_change_recorded() {
        let mut tracker = tracker();
        assert!(tracker.on_attribute_set("status", &json!("pending"), &json!("shipped")));

        let change = tracker.pending_scalar("status").unwrap();
        assert_eq!(change.old.as_deref(), Some("pending"));
        assert_eq!(change.new.as_deref(), Some("shipped"));
    }

    #[test]
    fn test_unregistered_field_ignored() {
        let mut tracker = tracker();
        assert!(!tracker.on_attribute_set("color", &json!("red"), &json!("blue")));
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_equal_formatted_values_ignored() {
        let mut tracker = tracker();
        assert!(!tracker.on_attribute_set("status", &json!("open"), &json!("open")));
        // Raw values differ, display text does not
        assert!(!tracker.on_attribute_set("quantity", &json!(5), &json!("5")));
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_multiple_sets_keep_baseline_and_last_value() {
        let mut tracker = tracker();
        tracker.on_attribute_set("quantity", &json!(1), &json!(2));
        tracker.on_attribute_set("quantity", &json!(2), &json!(3));
        tracker.on_attribute_set("quantity", &json!(3), &json!(4));

        let changes = tracker.consume_and_clear();
        assert_eq!(changes.scalars.len(), 1);
        let change = &changes.scalars["quantity"];
        assert_eq!(change.old.as_deref(), Some("1"));
        assert_eq!(change.new.as_deref(), Some("4"));
    }

    #[test]
    fn test_return_to_baseline_clears_entry() {
        let mut tracker = tracker();
        tracker.on_attribute_set("status", &json!("pending"), &json!("shipped"));
        tracker.on_attribute_set("status", &json!("shipped"), &json!("pending"));
        assert!(tracker.pending_scalar("status").is_none());
    }

    #[test]
    fn test_null_formats_as_empty() {
        let mut tracker = tracker();
        tracker.on_attribute_set("status", &json!(null), &json!("new"));
        let change = tracker.pending_scalar("status").unwrap();
        assert_eq!(change.old, None);
    }

    #[test]
    fn test_relation_changes_accumulate_in_order() {
        let mut tracker = tracker();
        assert!(tracker.on_relation_added("tags", &[json!("red"), json!("blue")]));
        assert!(tracker.on_relation_added("tags", &[json!(3)]));
        assert!(tracker.on_relation_removed("tags", &[json!("green")]));

        let pending = tracker.pending_multi("tags").unwrap();
        assert_eq!(pending.added, vec!["red", "blue", "3"]);
        assert_eq!(pending.removed, vec!["green"]);
        assert_eq!(
            pending.joined(", "),
            ("red, blue, 3".to_string(), "green".to_string())
        );
    }

    #[test]
    fn test_relation_on_non_multi_field_ignored() {
        let mut tracker = tracker();
        assert!(!tracker.on_relation_added("status", &[json!(1)]));
        assert!(!tracker.on_relation_added("links", &[json!(1)]));
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn test_consume_and_clear_empties_maps() {
        let mut tracker = tracker();
        tracker.on_attribute_set("status", &json!("a"), &json!("b"));
        tracker.on_relation_added("tags", &[json!("x")]);

        let first = tracker.consume_and_clear();
        assert!(!first.is_empty());
        assert!(!tracker.is_dirty());
        assert!(tracker.consume_and_clear().is_empty());
    }

    #[test]
    fn test_assign_actor() {
        let mut tracker = tracker();
        let actor = Actor::new("u1");
        tracker.assign_actor(&actor).unwrap();
        assert_eq!(tracker.modified_by().unwrap().username, "u1");
    }

    #[test]
    fn test_assign_invalid_actor() {
        let mut tracker = tracker();
        let err = tracker.assign_actor(&Actor::new("")).unwrap_err();
        assert!(err.is_invalid_actor());
        assert!(tracker.modified_by().is_none());
    }

    #[test]
    fn test_suppression_flag() {
        let mut tracker = tracker();
        assert!(!tracker.take_suppression());
        tracker.suppress_next_capture();
        assert!(tracker.is_suppressed());
        assert!(tracker.take_suppression());
        assert!(!tracker.is_suppressed());
    }
}
