//! Trail recorder
//!
//! Turns one lifecycle event on an audited record into trail rows and field
//! entries. The admin trail receives every change; the public trail exists
//! only for entity types with at least one public field and receives only
//! the public fields.

use chrono::{Local, NaiveDate, Utc};
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{AuditError, AuditResult};
use crate::models::{
    Actor, ActorRef, AuditAction, AuditFieldEntry, AuditMultiFieldEntry, AuditTrail, EntityKey,
    FieldSpec, SpecialAction, TrailKey, Visibility,
};
use crate::storage::TrailStore;
use crate::tracker::{AuditedRecord, DirtyChanges};

/// Default delimiter for joined relation values
pub const DEFAULT_DELIMITER: &str = ", ";

/// Trails touched by one recorded event
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedTrails {
    pub admin: AuditTrail,
    pub public: Option<AuditTrail>,
    /// Entries written across both trails
    pub entries_written: usize,
}

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Writes trails and entries through a `TrailStore`
pub struct TrailRecorder<'a, S: TrailStore + ?Sized> {
    store: &'a S,
    delimiter: String,
    today: fn() -> NaiveDate,
}

impl<'a, S: TrailStore + ?Sized> TrailRecorder<'a, S> {
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            delimiter: DEFAULT_DELIMITER.to_string(),
            today: local_today,
        }
    }

    /// Join relation values with `delimiter` instead of `", "`
    pub fn with_delimiter(mut self, delimiter: impl Into<String>) -> Self {
        self.delimiter = delimiter.into();
        self
    }

    /// Use another source for the audit date
    pub fn with_date_source(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Record a created/modified/deleted event for `entity`
    ///
    /// `Created` arms the record's suppression flag and writes no entries;
    /// `Modified` drains the dirty maps into entries; `Deleted` writes trail
    /// rows only. Types with no registered fields are not audited and yield
    /// `None`.
    pub fn record_lifecycle_event(
        &self,
        entity: &mut AuditedRecord,
        action: AuditAction,
    ) -> AuditResult<Option<RecordedTrails>> {
        if entity.schema().is_empty() {
            debug!(
                "{} has no audited fields, skipping {}",
                entity.entity_type(),
                action
            );
            return Ok(None);
        }

        let key = require_key(entity)?;
        let actor = entity.modified_by().cloned();
        let mut recorded = self.open_trails(entity, &key, action, actor.as_ref())?;

        match action {
            AuditAction::Created => entity.tracker_mut().suppress_next_capture(),
            AuditAction::Modified => {
                let changes = entity.tracker_mut().consume_and_clear();
                recorded.entries_written =
                    self.write_changes(entity, &recorded, changes, actor.as_ref())?;
            }
            AuditAction::Deleted => {}
        }

        info!(
            "Recorded {} on {} ({} entries)",
            action, key, recorded.entries_written
        );
        Ok(Some(recorded))
    }

    /// Record one addition or removal on a relation the caller tracks by hand
    ///
    /// Bypasses the dirty maps: exactly one multi-field entry is written per
    /// trail, with only the side matching `action` populated.
    pub fn record_special_change(
        &self,
        entity: &AuditedRecord,
        field: &str,
        action: SpecialAction,
        value: &Value,
        actor: &Actor,
    ) -> AuditResult<RecordedTrails> {
        actor
            .validate()
            .map_err(|e| AuditError::InvalidActor(e.to_string()))?;

        let key = require_key(entity)?;
        let spec = entity.schema().field(field).cloned().ok_or_else(|| {
            AuditError::Configuration(format!(
                "Field '{}' is not registered on {}",
                field,
                entity.entity_type()
            ))
        })?;

        let actor = actor.reference();
        let mut recorded = self.open_trails(entity, &key, AuditAction::Modified, Some(&actor))?;

        let formatted = spec.format(value).unwrap_or_default();
        let (added, removed) = match action {
            SpecialAction::Added => (formatted, String::new()),
            SpecialAction::Removed => (String::new(), formatted),
        };

        recorded.entries_written =
            self.write_multi_entry(&recorded, &spec, &added, &removed, Some(&actor))?;

        info!(
            "Recorded special {:?} on {}.{}",
            action, key, field
        );
        Ok(recorded)
    }

    fn open_trails(
        &self,
        entity: &AuditedRecord,
        key: &EntityKey,
        action: AuditAction,
        actor: Option<&ActorRef>,
    ) -> AuditResult<RecordedTrails> {
        let display_name = entity.display_name();
        let today = (self.today)();

        let admin = self.store.upsert_trail(
            &TrailKey::new(Visibility::Admin, key.clone(), action, today),
            &display_name,
            actor,
        )?;

        let public = if entity.schema().has_public_fields() {
            Some(self.store.upsert_trail(
                &TrailKey::new(Visibility::Public, key.clone(), action, today),
                &display_name,
                actor,
            )?)
        } else {
            None
        };

        Ok(RecordedTrails {
            admin,
            public,
            entries_written: 0,
        })
    }

    fn write_changes(
        &self,
        entity: &AuditedRecord,
        recorded: &RecordedTrails,
        changes: DirtyChanges,
        actor: Option<&ActorRef>,
    ) -> AuditResult<usize> {
        let schema = entity.schema();
        let mut written = 0;

        for (name, change) in changes.scalars {
            let Some(spec) = schema.field(&name) else {
                debug!("Skipping unregistered field '{}'", name);
                continue;
            };

            // Admin and public copies of one change share a timestamp
            let recorded_at = Utc::now();
            for trail in self.targets(recorded, spec) {
                self.store.get_or_create_group(trail.id, &spec.group)?;
                self.store.insert_field_entry(
                    AuditFieldEntry::new(
                        trail.id,
                        name.as_str(),
                        change.old.clone(),
                        change.new.clone(),
                        actor.cloned(),
                    )
                    .with_recorded_at(recorded_at),
                )?;
                written += 1;
            }
        }

        for (name, change) in changes.multis {
            let Some(spec) = schema.field(&name) else {
                debug!("Skipping unregistered relation '{}'", name);
                continue;
            };
            if change.is_empty() {
                continue;
            }

            let (added, removed) = change.joined(&self.delimiter);
            written += self.write_multi_entry(recorded, spec, &added, &removed, actor)?;
        }

        Ok(written)
    }

    fn write_multi_entry(
        &self,
        recorded: &RecordedTrails,
        spec: &FieldSpec,
        added: &str,
        removed: &str,
        actor: Option<&ActorRef>,
    ) -> AuditResult<usize> {
        let mut written = 0;
        let recorded_at = Utc::now();
        for trail in self.targets(recorded, spec) {
            self.store.get_or_create_group(trail.id, &spec.group)?;
            self.store.insert_multi_field_entry(
                AuditMultiFieldEntry::new(
                    trail.id,
                    spec.name.as_str(),
                    added,
                    removed,
                    actor.cloned(),
                )
                .with_recorded_at(recorded_at),
            )?;
            written += 1;
        }
        Ok(written)
    }

    /// The admin trail, plus the public one when the field is public
    fn targets<'r>(&self, recorded: &'r RecordedTrails, spec: &FieldSpec) -> Vec<&'r AuditTrail> {
        let mut targets = vec![&recorded.admin];
        if spec.is_public {
            targets.extend(recorded.public.as_ref());
        }
        targets
    }
}

fn require_key(entity: &AuditedRecord) -> AuditResult<EntityKey> {
    entity.key().ok_or_else(|| {
        AuditError::Validation(format!(
            "Cannot audit {} without an id",
            entity.entity_type()
        ))
    })
}
