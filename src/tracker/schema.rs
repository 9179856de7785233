//! Field-spec sets and the entity type registry
//!
//! Each audited entity type declares its fields once, at setup time. The
//! resulting `AuditSchema` is shared (behind an `Arc`) by every instance of
//! that type and never changes afterwards.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use serde_json::Value;

use crate::error::{AuditError, AuditResult};
use crate::models::{default_format, EntityType, FieldKind, FieldSpec, FormattedValue, Formatter};

/// The audited fields of one entity type
#[derive(Debug, Clone)]
pub struct AuditSchema {
    entity_type: EntityType,
    fields: BTreeMap<String, FieldSpec>,
    /// Declaration order, for display
    order: Vec<String>,
    has_public_fields: bool,
}

impl AuditSchema {
    /// Create an empty schema for an entity type
    pub fn new(entity_type: impl Into<EntityType>) -> Self {
        Self {
            entity_type: entity_type.into(),
            fields: BTreeMap::new(),
            order: Vec::new(),
            has_public_fields: false,
        }
    }

    pub fn entity_type(&self) -> &EntityType {
        &self.entity_type
    }

    /// Register a field using the default formatter
    pub fn register_field(
        &mut self,
        name: &str,
        group: &str,
        kind: FieldKind,
        is_public: bool,
    ) -> AuditResult<()> {
        self.register(FieldSpec::new(name, group, kind, is_public))
    }

    /// Register a field with an explicit formatter
    pub fn register_field_with_formatter(
        &mut self,
        name: &str,
        group: &str,
        kind: FieldKind,
        is_public: bool,
        formatter: Formatter,
    ) -> AuditResult<()> {
        self.register(FieldSpec::new(name, group, kind, is_public).with_formatter(formatter))
    }

    /// Register a prepared field spec
    pub fn register(&mut self, mut spec: FieldSpec) -> AuditResult<()> {
        spec.name = spec.name.trim().to_string();
        let name = spec.name.clone();
        if name.is_empty() {
            return Err(AuditError::Configuration(format!(
                "Field name cannot be empty on {}",
                self.entity_type
            )));
        }

        if spec.group.trim().is_empty() {
            return Err(AuditError::Configuration(format!(
                "Field '{}' on {} needs a group",
                name, self.entity_type
            )));
        }

        if self.fields.contains_key(&name) {
            return Err(AuditError::Configuration(format!(
                "Field '{}' is already registered on {}",
                name, self.entity_type
            )));
        }

        if spec.is_public {
            self.has_public_fields = true;
        }

        self.order.push(name.clone());
        self.fields.insert(name, spec);
        Ok(())
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    /// Fields in declaration order
    pub fn fields(&self) -> impl Iterator<Item = &FieldSpec> {
        self.order.iter().filter_map(|name| self.fields.get(name))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn has_public_fields(&self) -> bool {
        self.has_public_fields
    }

    /// Format a value with the field's formatter, or the default one
    pub fn format_value(&self, field: &str, value: &Value) -> FormattedValue {
        match self.fields.get(field) {
            Some(spec) => spec.format(value),
            None => default_format(value),
        }
    }
}

/// Registry of the known entity type tags and their schemas
#[derive(Debug, Clone, Default)]
pub struct EntityRegistry {
    schemas: HashMap<EntityType, Arc<AuditSchema>>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a schema under its entity type tag
    pub fn register(&mut self, schema: AuditSchema) -> AuditResult<Arc<AuditSchema>> {
        let entity_type = schema.entity_type().clone();

        if !entity_type.is_valid() {
            return Err(AuditError::Configuration(format!(
                "Invalid entity type tag '{}'",
                entity_type
            )));
        }

        if self.schemas.contains_key(&entity_type) {
            return Err(AuditError::Configuration(format!(
                "Entity type '{}' is already registered",
                entity_type
            )));
        }

        let schema = Arc::new(schema);
        self.schemas.insert(entity_type, Arc::clone(&schema));
        Ok(schema)
    }

    pub fn get(&self, entity_type: &EntityType) -> Option<Arc<AuditSchema>> {
        self.schemas.get(entity_type).cloned()
    }

    /// Look up a schema, failing for unknown tags
    pub fn require(&self, entity_type: &EntityType) -> AuditResult<Arc<AuditSchema>> {
        self.get(entity_type)
            .ok_or_else(|| AuditError::entity_not_found(entity_type.to_string()))
    }

    pub fn contains(&self, entity_type: &EntityType) -> bool {
        self.schemas.contains_key(entity_type)
    }

    /// Registered tags, sorted
    pub fn entity_types(&self) -> Vec<EntityType> {
        let mut types: Vec<_> = self.schemas.keys().cloned().collect();
        types.sort();
        types
    }
}
