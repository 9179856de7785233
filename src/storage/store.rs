use crate::error::AuditResult;
use crate::models::{
    ActorRef, AuditFieldEntry, AuditGroup, AuditMultiFieldEntry, AuditTrail, EntityKey, TrailId,
    TrailKey,
};

/// Port the trail recorder writes through.
///
/// Implementations must give get-or-create semantics on both unique keys:
/// at most one trail per `TrailKey`, at most one group per `(trail, name)`,
/// even when several callers race on the same key.
pub trait TrailStore {
    /// Get or create the trail for `key`, replace its display name, and set
    /// its actor if it has none.
    fn upsert_trail(
        &self,
        key: &TrailKey,
        display_name: &str,
        actor: Option<&ActorRef>,
    ) -> AuditResult<AuditTrail>;

    /// Get or create the named group under a trail.
    fn get_or_create_group(&self, trail_id: TrailId, name: &str) -> AuditResult<AuditGroup>;

    /// Append a scalar field entry.
    fn insert_field_entry(&self, entry: AuditFieldEntry) -> AuditResult<()>;

    /// Append a multi-valued field entry.
    fn insert_multi_field_entry(&self, entry: AuditMultiFieldEntry) -> AuditResult<()>;

    /// Look up one trail.
    fn trail(&self, id: TrailId) -> AuditResult<Option<AuditTrail>>;

    /// Every trail of one entity, newest audit day first.
    fn trails_for(&self, entity: &EntityKey) -> AuditResult<Vec<AuditTrail>>;

    /// Every trail, oldest audit day first.
    fn all_trails(&self) -> AuditResult<Vec<AuditTrail>>;

    fn groups_for(&self, trail_id: TrailId) -> AuditResult<Vec<AuditGroup>>;

    fn field_entries_for(&self, trail_id: TrailId) -> AuditResult<Vec<AuditFieldEntry>>;

    fn multi_field_entries_for(&self, trail_id: TrailId) -> AuditResult<Vec<AuditMultiFieldEntry>>;
}
