//! Scripted audit sessions
//!
//! Replays a declared sequence of record mutations and lifecycle events
//! against the audit store, the way a host application would drive it.

mod runner;
mod script;

pub use runner::{ReplayRunner, ReplaySummary};
pub use script::{ActorDef, RelateOp, ReplayScript, Step};
