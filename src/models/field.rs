//! Audited field declarations
//!
//! A `FieldSpec` is the static, per-entity-type description of one audited
//! field: which group it is displayed under, how its changes are detected,
//! and whether the public trail mirrors it.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::error::AuditError;

/// Formatted value of a field; `None` is the "empty" representation
pub type FormattedValue = Option<String>;

/// Explicit per-field formatter, supplied at registration time
pub type Formatter = Arc<dyn Fn(&Value) -> FormattedValue + Send + Sync>;

/// How changes to a field are detected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    /// Plain attribute, tracked through the explicit setter
    #[default]
    Scalar,
    /// Relation set, tracked through relation add/remove events
    Multi,
    /// Relation the caller records by hand (one-directional links)
    Special,
}

impl FieldKind {
    pub fn is_scalar(self) -> bool {
        self == Self::Scalar
    }

    pub fn is_multi(self) -> bool {
        self == Self::Multi
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldKind::Scalar => write!(f, "scalar"),
            FieldKind::Multi => write!(f, "multi"),
            FieldKind::Special => write!(f, "special"),
        }
    }
}

impl FromStr for FieldKind {
    type Err = AuditError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "scalar" | "normal" | "0" => Ok(Self::Scalar),
            "multi" | "multi-valued" | "multi_valued" | "m2m" | "1" => Ok(Self::Multi),
            "special" | "2" => Ok(Self::Special),
            other => Err(AuditError::Configuration(format!(
                "Unknown field kind '{}'",
                other
            ))),
        }
    }
}

/// Static declaration of one audited field
#[derive(Clone)]
pub struct FieldSpec {
    pub name: String,
    pub group: String,
    pub kind: FieldKind,
    pub is_public: bool,
    formatter: Option<Formatter>,
}

impl FieldSpec {
    pub fn new(
        name: impl Into<String>,
        group: impl Into<String>,
        kind: FieldKind,
        is_public: bool,
    ) -> Self {
        Self {
            name: name.into(),
            group: group.into(),
            kind,
            is_public,
            formatter: None,
        }
    }

    /// Attach a formatter used instead of the default display formatting
    pub fn with_formatter(mut self, formatter: Formatter) -> Self {
        self.formatter = Some(formatter);
        self
    }

    pub fn formatter(&self) -> Option<&Formatter> {
        self.formatter.as_ref()
    }

    /// Format a value of this field
    pub fn format(&self, value: &Value) -> FormattedValue {
        match &self.formatter {
            Some(formatter) => formatter(value),
            None => default_format(value),
        }
    }
}

impl fmt::Debug for FieldSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldSpec")
            .field("name", &self.name)
            .field("group", &self.group)
            .field("kind", &self.kind)
            .field("is_public", &self.is_public)
            .field("custom_formatter", &self.formatter.is_some())
            .finish()
    }
}

/// Default formatter: the value's display text, `None` when absent
pub fn default_format(value: &Value) -> FormattedValue {
    match value {
        Value::Null => None,
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Array(items) => Some(
            items
                .iter()
                .filter_map(default_format)
                .collect::<Vec<_>>()
                .join(", "),
        ),
        Value::Object(_) => Some(value.to_string()),
    }
}
