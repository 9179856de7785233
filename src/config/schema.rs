//! Declarative field specs
//!
//! Entity schemas can be declared in YAML (or JSON) instead of code:
//!
//! ```yaml
//! entities:
//!   Order:
//!     - name: status
//!       group: workflow
//!       kind: scalar
//!       public: true
//!     - name: tags
//!       group: labels
//!       kind: multi
//! ```
//!
//! Kinds are validated while building the registry, so an unknown kind is a
//! configuration error at setup time.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AuditError, AuditResult};
use crate::models::FieldKind;
use crate::tracker::{AuditSchema, EntityRegistry};

/// One field declaration as written in a schema file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDef {
    pub name: String,
    pub group: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default)]
    pub public: bool,
}

fn default_kind() -> String {
    FieldKind::Scalar.to_string()
}

/// Field declarations for every audited entity type
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaFile {
    #[serde(default)]
    pub entities: BTreeMap<String, Vec<FieldDef>>,
}

impl SchemaFile {
    /// Parse a schema document
    pub fn parse(source: &str) -> AuditResult<Self> {
        serde_yaml::from_str(source)
            .map_err(|e| AuditError::Configuration(format!("Invalid schema file: {}", e)))
    }

    /// Load a schema file, or an empty schema when the file is missing
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> AuditResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }

        let source = std::fs::read_to_string(path).map_err(|e| {
            AuditError::Io(format!("Failed to read schema file {}: {}", path.display(), e))
        })?;
        Self::parse(&source)
    }

    /// Build one `AuditSchema` per declared entity type
    pub fn build_schemas(&self) -> AuditResult<Vec<AuditSchema>> {
        let mut schemas = Vec::with_capacity(self.entities.len());

        for (entity_type, fields) in &self.entities {
            let mut schema = AuditSchema::new(entity_type.as_str());
            for field in fields {
                let kind: FieldKind = field.kind.parse().map_err(|_| {
                    AuditError::Configuration(format!(
                        "Unknown field kind '{}' for {}.{}",
                        field.kind, entity_type, field.name
                    ))
                })?;
                schema.register_field(&field.name, &field.group, kind, field.public)?;
            }
            schemas.push(schema);
        }

        Ok(schemas)
    }

    /// Register every declared schema into a registry
    pub fn register_into(&self, registry: &mut EntityRegistry) -> AuditResult<()> {
        for schema in self.build_schemas()? {
            registry.register(schema)?;
        }
        Ok(())
    }
}
