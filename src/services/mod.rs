//! Service layer for audit-trail
//!
//! The service layer sits on top of storage: `AuditService` records events
//! and persists them, `HistoryService` answers history queries.

pub mod audit;
pub mod history;

pub use audit::AuditService;
pub use history::{HistoryService, TrailDetail};
