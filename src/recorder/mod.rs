//! Trail recording
//!
//! `TrailRecorder` writes trails and entries for one event; `EventDispatcher`
//! decides which events reach it.

mod events;
mod trail;

pub use events::{EventDispatcher, LifecycleEvent, RelationChange};
pub use trail::{RecordedTrails, TrailRecorder, DEFAULT_DELIMITER};
