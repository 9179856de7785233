//! Replay runner
//!
//! Applies a script's steps to in-memory audited records, routing every
//! lifecycle event through the `AuditService`.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;

use tracing::{debug, info};

use super::script::{RelateOp, ReplayScript, Step};
use crate::error::{AuditError, AuditResult};
use crate::models::{default_format, Actor, EntityKey, TrailId};
use crate::recorder::{LifecycleEvent, RecordedTrails, RelationChange};
use crate::services::AuditService;
use crate::tracker::{AuditedRecord, DisplayName, Values};

/// Outcome of a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaySummary {
    pub steps: usize,
    /// Events that produced trail rows
    pub events_recorded: usize,
    /// Events swallowed or fed only to a tracker
    pub events_skipped: usize,
    /// Distinct trails touched
    pub trails_touched: usize,
    pub entries_written: usize,
}

/// Drives a script through an `AuditService`
pub struct ReplayRunner<'s, 'a> {
    service: &'s AuditService<'a>,
    actors: HashMap<String, Actor>,
    records: BTreeMap<EntityKey, AuditedRecord>,
    touched: BTreeSet<String>,
    summary: ReplaySummary,
}

impl<'s, 'a> ReplayRunner<'s, 'a> {
    pub fn new(service: &'s AuditService<'a>) -> Self {
        Self {
            service,
            actors: HashMap::new(),
            records: BTreeMap::new(),
            touched: BTreeSet::new(),
            summary: ReplaySummary::default(),
        }
    }

    /// Run every step in order, stopping at the first failure
    pub fn run(mut self, script: &ReplayScript) -> AuditResult<ReplaySummary> {
        for def in &script.actors {
            self.actors.insert(def.username.clone(), def.to_actor());
        }

        for (index, step) in script.steps.iter().enumerate() {
            debug!("Step {}: {}", index + 1, step.name());
            self.apply(step)?;
            self.summary.steps += 1;
        }

        self.summary.trails_touched = self.touched.len();
        info!(
            "Replayed {} steps, {} events recorded",
            self.summary.steps, self.summary.events_recorded
        );
        Ok(self.summary)
    }

    fn apply(&mut self, step: &Step) -> AuditResult<()> {
        match step {
            Step::Load {
                entity,
                id,
                values,
                display_name,
            } => {
                let key = EntityKey::new(entity.as_str(), *id);
                self.ensure_absent(&key)?;
                let mut record = self.service.track_existing(entity, *id, values.clone())?;
                record.set_display_name(display_name.as_deref().map(template_name));
                self.records.insert(key, record);
            }
            Step::Create {
                entity,
                id,
                values,
                display_name,
                actor,
            } => {
                let key = EntityKey::new(entity.as_str(), *id);
                self.ensure_absent(&key)?;
                let mut record = self.service.track_new(entity)?;
                for (field, value) in values {
                    record.set(field, value.clone());
                }
                record.set_display_name(display_name.as_deref().map(template_name));
                record.assign_id(*id);
                if let Some(username) = actor {
                    record.assign_actor(self.actor(username)?)?;
                }

                let recorded = self
                    .service
                    .dispatch(&mut record, LifecycleEvent::saved(true))?;
                self.tally(recorded);
                self.records.insert(key, record);
            }
            Step::Set {
                entity,
                id,
                field,
                value,
            } => {
                self.record(entity, *id)?.set(field, value.clone());
            }
            Step::Save { entity, id, actor } => {
                self.fire(entity, *id, actor.as_deref(), LifecycleEvent::saved(false))?;
            }
            Step::Relate {
                entity,
                id,
                field,
                op,
                values,
            } => {
                let change = match op {
                    RelateOp::Add => RelationChange::Added(values.clone()),
                    RelateOp::Remove => RelationChange::Removed(values.clone()),
                    RelateOp::Clear => RelationChange::Cleared,
                };
                self.fire(entity, *id, None, LifecycleEvent::relation(field.as_str(), change))?;
            }
            Step::Special {
                entity,
                id,
                field,
                action,
                value,
                actor,
            } => {
                let actor = self.actor(actor)?.clone();
                let service = self.service;
                let record = self.record(entity, *id)?;
                let recorded = service.record_special_change(record, field, *action, value, &actor)?;
                self.tally(Some(recorded));
            }
            Step::Delete { entity, id, actor } => {
                self.fire(entity, *id, actor.as_deref(), LifecycleEvent::Deleted)?;
                self.records.remove(&EntityKey::new(entity.as_str(), *id));
            }
        }
        Ok(())
    }

    fn fire(
        &mut self,
        entity: &str,
        id: u64,
        actor: Option<&str>,
        event: LifecycleEvent,
    ) -> AuditResult<()> {
        let actor = actor.map(|username| self.actor(username).cloned()).transpose()?;
        let service = self.service;
        let record = self.record(entity, id)?;
        if let Some(actor) = &actor {
            record.assign_actor(actor)?;
        }

        let recorded = service.dispatch(record, event)?;
        self.tally(recorded);
        Ok(())
    }

    fn tally(&mut self, recorded: Option<RecordedTrails>) {
        match recorded {
            Some(recorded) => {
                self.summary.events_recorded += 1;
                self.summary.entries_written += recorded.entries_written;
                self.mark(recorded.admin.id);
                if let Some(public) = recorded.public {
                    self.mark(public.id);
                }
            }
            None => self.summary.events_skipped += 1,
        }
    }

    fn mark(&mut self, id: TrailId) {
        self.touched.insert(id.as_uuid().to_string());
    }

    fn actor(&self, username: &str) -> AuditResult<&Actor> {
        self.actors
            .get(username)
            .ok_or_else(|| AuditError::actor_not_found(username))
    }

    fn record(&mut self, entity: &str, id: u64) -> AuditResult<&mut AuditedRecord> {
        let key = EntityKey::new(entity, id);
        self.records
            .get_mut(&key)
            .ok_or_else(|| AuditError::entity_not_found(key.to_string()))
    }

    fn ensure_absent(&self, key: &EntityKey) -> AuditResult<()> {
        if self.records.contains_key(key) {
            return Err(AuditError::Validation(format!(
                "{} is already loaded",
                key
            )));
        }
        Ok(())
    }
}

/// A display name where `{field}` is replaced by the field's current value
fn template_name(template: &str) -> DisplayName {
    if !template.contains('{') {
        return DisplayName::Static(template.to_string());
    }

    let template = template.to_string();
    DisplayName::Deferred(Arc::new(move |values: &Values| {
        values.iter().fold(template.clone(), |name, (field, value)| {
            name.replace(
                &format!("{{{}}}", field),
                &default_format(value).unwrap_or_default(),
            )
        })
    }))
}
