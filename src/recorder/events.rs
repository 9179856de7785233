//! Lifecycle event dispatch
//!
//! Maps host lifecycle notifications (save, delete, relation change) onto the
//! change tracker and the trail recorder.

use serde_json::Value;
use tracing::{debug, warn};

use super::trail::{RecordedTrails, TrailRecorder};
use crate::error::AuditResult;
use crate::models::AuditAction;
use crate::storage::TrailStore;
use crate::tracker::AuditedRecord;

/// What happened to a relation field
#[derive(Debug, Clone, PartialEq)]
pub enum RelationChange {
    Added(Vec<Value>),
    Removed(Vec<Value>),
    /// Clearing a relation is not recorded on its own
    Cleared,
}

/// Lifecycle notification for one audited instance
#[derive(Debug, Clone, PartialEq)]
pub enum LifecycleEvent {
    Saved { created: bool },
    Deleted,
    RelationChanged { field: String, change: RelationChange },
}

impl LifecycleEvent {
    pub fn saved(created: bool) -> Self {
        Self::Saved { created }
    }

    pub fn relation(field: impl Into<String>, change: RelationChange) -> Self {
        Self::RelationChanged {
            field: field.into(),
            change,
        }
    }
}

/// Routes lifecycle events to the recorder
pub struct EventDispatcher<'a, S: TrailStore + ?Sized> {
    recorder: TrailRecorder<'a, S>,
}

impl<'a, S: TrailStore + ?Sized> EventDispatcher<'a, S> {
    pub fn new(recorder: TrailRecorder<'a, S>) -> Self {
        Self { recorder }
    }

    pub fn recorder(&self) -> &TrailRecorder<'a, S> {
        &self.recorder
    }

    /// Handle one event
    ///
    /// Returns the touched trails, or `None` when the event recorded nothing:
    /// the entity type audits no fields, the save was the suppressed
    /// write-back after a create, or the event only fed the tracker.
    pub fn dispatch(
        &self,
        entity: &mut AuditedRecord,
        event: LifecycleEvent,
    ) -> AuditResult<Option<RecordedTrails>> {
        if entity.schema().is_empty() {
            debug!("{} audits no fields; ignoring event", entity.entity_type());
            return Ok(None);
        }

        match event {
            LifecycleEvent::Saved { created } => {
                if entity.tracker_mut().take_suppression() {
                    debug!("Suppressed post-create save on {}", entity.entity_type());
                    return Ok(None);
                }
                let action = if created {
                    AuditAction::Created
                } else {
                    AuditAction::Modified
                };
                self.recorder.record_lifecycle_event(entity, action)
            }
            LifecycleEvent::Deleted => self
                .recorder
                .record_lifecycle_event(entity, AuditAction::Deleted),
            LifecycleEvent::RelationChanged { field, change } => {
                let tracker = entity.tracker_mut();
                let tracked = match &change {
                    RelationChange::Added(values) => tracker.on_relation_added(&field, values),
                    RelationChange::Removed(values) => tracker.on_relation_removed(&field, values),
                    RelationChange::Cleared => {
                        debug!("Ignoring clear on {}", field);
                        true
                    }
                };
                if !tracked {
                    warn!(
                        "'{}' is not a multi-valued audited field of {}",
                        field,
                        entity.entity_type()
                    );
                }
                Ok(None)
            }
        }
    }
}
