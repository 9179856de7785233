//! Display formatting for terminal output
//!
//! Provides table and detail views of audit trails.

pub mod trail;

pub use trail::{format_trail_details, format_trail_list};
