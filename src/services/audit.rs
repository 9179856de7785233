//! Audit service
//!
//! Binds storage, the entity registry and settings, records events through
//! the trail recorder and flushes the store after every recorded event.

use serde_json::Value;

use crate::config::Settings;
use crate::error::AuditResult;
use crate::models::{Actor, AuditAction, EntityType, SpecialAction};
use crate::recorder::{EventDispatcher, LifecycleEvent, RecordedTrails, TrailRecorder};
use crate::storage::Storage;
use crate::tracker::{AuditedRecord, EntityRegistry, Values};

/// Service for recording audit trails
pub struct AuditService<'a> {
    storage: &'a Storage,
    registry: &'a EntityRegistry,
    settings: &'a Settings,
}

impl<'a> AuditService<'a> {
    pub fn new(storage: &'a Storage, registry: &'a EntityRegistry, settings: &'a Settings) -> Self {
        Self {
            storage,
            registry,
            settings,
        }
    }

    /// A new, not yet saved instance of a registered entity type
    pub fn track_new(&self, entity_type: &str) -> AuditResult<AuditedRecord> {
        let schema = self.registry.require(&EntityType::new(entity_type))?;
        Ok(AuditedRecord::new(schema))
    }

    /// An already persisted instance with its current values
    pub fn track_existing(
        &self,
        entity_type: &str,
        id: u64,
        values: Values,
    ) -> AuditResult<AuditedRecord> {
        let schema = self.registry.require(&EntityType::new(entity_type))?;
        Ok(AuditedRecord::existing(schema, id, values))
    }

    fn recorder(&self) -> TrailRecorder<'a, Storage> {
        TrailRecorder::new(self.storage).with_delimiter(self.settings.multi_value_delimiter.as_str())
    }

    /// Route a lifecycle event and persist whatever it recorded
    pub fn dispatch(
        &self,
        entity: &mut AuditedRecord,
        event: LifecycleEvent,
    ) -> AuditResult<Option<RecordedTrails>> {
        let recorded = EventDispatcher::new(self.recorder()).dispatch(entity, event)?;
        if recorded.is_some() {
            self.storage.save_all()?;
        }
        Ok(recorded)
    }

    /// Record an event directly, bypassing suppression
    pub fn record_lifecycle_event(
        &self,
        entity: &mut AuditedRecord,
        action: AuditAction,
    ) -> AuditResult<Option<RecordedTrails>> {
        let recorded = self.recorder().record_lifecycle_event(entity, action)?;
        if recorded.is_some() {
            self.storage.save_all()?;
        }
        Ok(recorded)
    }

    pub fn record_special_change(
        &self,
        entity: &AuditedRecord,
        field: &str,
        action: SpecialAction,
        value: &Value,
        actor: &Actor,
    ) -> AuditResult<RecordedTrails> {
        let recorded = self
            .recorder()
            .record_special_change(entity, field, action, value, actor)?;
        self.storage.save_all()?;
        Ok(recorded)
    }
}
