//! Replay script format
//!
//! A script declares extra entity schemas, the actors taking part, and an
//! ordered list of steps applied to audited records:
//!
//! ```yaml
//! schema:
//!   entities:
//!     Order:
//!       - {name: status, group: workflow, public: true}
//! actors:
//!   - username: U1
//! steps:
//!   - {step: load, entity: Order, id: 42, values: {status: pending}}
//!   - {step: set, entity: Order, id: 42, field: status, value: shipped}
//!   - {step: save, entity: Order, id: 42, actor: U1}
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::config::SchemaFile;
use crate::error::{AuditError, AuditResult};
use crate::models::{Actor, SpecialAction};
use crate::tracker::{EntityRegistry, Values};

/// An actor declared by a script
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorDef {
    pub username: String,
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl ActorDef {
    pub fn to_actor(&self) -> Actor {
        let mut actor = Actor::new(self.username.as_str());
        actor.active = self.active;
        actor
    }
}

/// Relation operation of a `relate` step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelateOp {
    Add,
    Remove,
    Clear,
}

/// One scripted action
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "lowercase")]
pub enum Step {
    /// Bring an already persisted record under audit; records nothing
    Load {
        entity: String,
        id: u64,
        #[serde(default)]
        values: Values,
        #[serde(default)]
        display_name: Option<String>,
    },
    /// Insert a new record and fire its `created` save
    Create {
        entity: String,
        id: u64,
        #[serde(default)]
        values: Values,
        #[serde(default)]
        display_name: Option<String>,
        #[serde(default)]
        actor: Option<String>,
    },
    Set {
        entity: String,
        id: u64,
        field: String,
        value: Value,
    },
    Save {
        entity: String,
        id: u64,
        #[serde(default)]
        actor: Option<String>,
    },
    Relate {
        entity: String,
        id: u64,
        field: String,
        op: RelateOp,
        #[serde(default)]
        values: Vec<Value>,
    },
    Special {
        entity: String,
        id: u64,
        field: String,
        action: SpecialAction,
        value: Value,
        actor: String,
    },
    Delete {
        entity: String,
        id: u64,
        #[serde(default)]
        actor: Option<String>,
    },
}

impl Step {
    /// Lowercase step name, as written in scripts
    pub fn name(&self) -> &'static str {
        match self {
            Step::Load { .. } => "load",
            Step::Create { .. } => "create",
            Step::Set { .. } => "set",
            Step::Save { .. } => "save",
            Step::Relate { .. } => "relate",
            Step::Special { .. } => "special",
            Step::Delete { .. } => "delete",
        }
    }
}

/// A complete replay script
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayScript {
    #[serde(default)]
    pub schema: SchemaFile,
    #[serde(default)]
    pub actors: Vec<ActorDef>,
    #[serde(default)]
    pub steps: Vec<Step>,
}

impl ReplayScript {
    /// Load a script, choosing JSON or YAML by file extension
    pub fn load<P: AsRef<Path>>(path: P) -> AuditResult<Self> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            AuditError::Io(format!("Failed to read script {}: {}", path.display(), e))
        })?;

        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase());

        match extension.as_deref() {
            Some("json") => Self::from_json(&source),
            Some("yaml") | Some("yml") => Self::from_yaml(&source),
            _ => Err(AuditError::Validation(format!(
                "Unsupported script format: {} (expected .json, .yaml or .yml)",
                path.display()
            ))),
        }
    }

    pub fn from_json(source: &str) -> AuditResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    pub fn from_yaml(source: &str) -> AuditResult<Self> {
        Ok(serde_yaml::from_str(source)?)
    }

    /// Registry holding `base` plus the script's own schema
    pub fn registry(&self, base: &SchemaFile) -> AuditResult<EntityRegistry> {
        let mut registry = EntityRegistry::new();
        base.register_into(&mut registry)?;
        self.schema.register_into(&mut registry)?;
        Ok(registry)
    }
}
