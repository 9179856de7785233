//! audit-trail - field-level audit trails for application entities
//!
//! This library tracks field changes on audited entity instances and records
//! them as trails: one per visibility (admin or public), entity, action and
//! calendar day, each holding grouped scalar and multi-valued field entries.
//!
//! # Architecture
//!
//! The crate is organized into the following modules:
//!
//! - `config`: Path resolution, settings and declarative entity schemas
//! - `error`: Custom error types
//! - `models`: Trail, group, entry, actor and field-spec types
//! - `tracker`: Per-instance dirty-field tracking
//! - `recorder`: Trail recording and lifecycle event dispatch
//! - `storage`: JSON file storage layer
//! - `services`: Recording and history queries
//! - `replay`: Scripted audit sessions
//! - `display`, `export`, `cli`: Terminal output, exports and commands
//!
//! # Example
//!
//! ```rust,ignore
//! use audit_trail::models::{Actor, FieldKind};
//! use audit_trail::recorder::{EventDispatcher, LifecycleEvent, TrailRecorder};
//! use audit_trail::tracker::{AuditSchema, AuditedRecord, Values};
//!
//! let mut schema = AuditSchema::new("Order");
//! schema.register_field("status", "workflow", FieldKind::Scalar, true)?;
//!
//! let mut order = AuditedRecord::existing(Arc::new(schema), 42, values);
//! order.assign_actor(&Actor::new("U1"))?;
//! order.set("status", "shipped");
//!
//! let dispatcher = EventDispatcher::new(TrailRecorder::new(&storage));
//! dispatcher.dispatch(&mut order, LifecycleEvent::saved(false))?;
//! ```

pub mod cli;
pub mod config;
pub mod display;
pub mod error;
pub mod export;
pub mod models;
pub mod recorder;
pub mod replay;
pub mod services;
pub mod storage;
pub mod tracker;

pub use error::{AuditError, AuditResult};
