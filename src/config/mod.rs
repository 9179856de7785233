//! Configuration module for audit-trail
//!
//! This module provides configuration management including:
//! - XDG-compliant path resolution
//! - Settings persistence
//! - Declarative entity schemas

pub mod paths;
pub mod schema;
pub mod settings;

pub use paths::AuditPaths;
pub use schema::{FieldDef, SchemaFile};
pub use settings::Settings;
