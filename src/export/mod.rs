//! Export module for audit-trail
//!
//! Provides export of the audit store in multiple formats:
//! - CSV: one row per field entry (spreadsheet-compatible)
//! - JSON: machine-readable full store export
//! - YAML: human-readable full store export

pub mod csv;
pub mod json;
pub mod yaml;

pub use self::csv::export_entries_csv;
pub use json::{export_full_json, AuditExport, ExportMetadata, EXPORT_SCHEMA_VERSION};
pub use yaml::export_full_yaml;
