//! Actor model
//!
//! The identity credited with a change. Actors are attached to an audited
//! entity before its lifecycle event fires and copied into every trail row
//! and field entry written for that event.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::ids::ActorId;

/// A user (or system account) that can be credited with changes
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    /// Unique identifier
    pub id: ActorId,

    /// Login or display handle
    pub username: String,

    /// Deactivated accounts can no longer be credited with changes
    #[serde(default = "default_active")]
    pub active: bool,
}

fn default_active() -> bool {
    true
}

impl Actor {
    /// Create a new active actor
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            id: ActorId::new(),
            username: username.into(),
            active: true,
        }
    }

    /// Check that this actor is a valid identity
    pub fn validate(&self) -> Result<(), ActorValidationError> {
        if self.id.as_uuid().is_nil() {
            return Err(ActorValidationError::NilId);
        }

        if self.username.trim().is_empty() {
            return Err(ActorValidationError::EmptyUsername);
        }

        if !self.active {
            return Err(ActorValidationError::Inactive(self.username.clone()));
        }

        Ok(())
    }

    /// The lightweight reference stored on audit rows
    pub fn reference(&self) -> ActorRef {
        ActorRef {
            id: self.id,
            username: self.username.clone(),
        }
    }
}

/// Reference to an actor as stored on trails and entries
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActorRef {
    pub id: ActorId,
    pub username: String,
}

impl fmt::Display for ActorRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.username)
    }
}

/// Reasons an actor is not a valid identity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActorValidationError {
    NilId,
    EmptyUsername,
    Inactive(String),
}

impl fmt::Display for ActorValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NilId => write!(f, "Actor id cannot be nil"),
            Self::EmptyUsername => write!(f, "Actor username cannot be empty"),
            Self::Inactive(name) => write!(f, "Actor '{}' is deactivated", name),
        }
    }
}

impl std::error::Error for ActorValidationError {}
