//! Binding-layer error kinds shared across modules.
//!
//! # Invariants
//! - `InvalidAttachedObjectError` and `GreedyFollowerError` are distinct types
//!   so callers can handle stale handles and navigation failures separately.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Diagnostic text carried by every `InvalidAttachedObjectError`.
pub const INVALID_ATTACHED_OBJECT_MESSAGE: &str =
    "Attached Object is invalid. Attach to a valid scene graph before use.";

/// An attached object's scene-graph node is missing, destroyed or detached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InvalidAttachedObjectError;

impl InvalidAttachedObjectError {
    pub fn message(&self) -> &'static str {
        INVALID_ATTACHED_OBJECT_MESSAGE
    }
}

impl Display for InvalidAttachedObjectError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(INVALID_ATTACHED_OBJECT_MESSAGE)
    }
}

impl Error for InvalidAttachedObjectError {}

/// Failures of the greedy geodesic follower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GreedyFollowerError {
    /// Backend found no action that makes progress toward the goal.
    NoProgress,
    /// Backend returned an empty action path.
    NoPath,
    /// Agent action space has no unique action for the named control.
    MissingAction(String),
    /// Agent body failed the liveness check.
    InvalidAgent(InvalidAttachedObjectError),
}

impl Display for GreedyFollowerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NoProgress => write!(f, "greedy follower could not make progress toward goal"),
            Self::NoPath => write!(f, "greedy follower found no path to goal"),
            Self::MissingAction(name) => write!(
                f,
                "greedy follower requires exactly one action with control `{name}`"
            ),
            Self::InvalidAgent(err) => write!(f, "greedy follower agent invalid: {err}"),
        }
    }
}

impl Error for GreedyFollowerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAgent(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidAttachedObjectError> for GreedyFollowerError {
    fn from(value: InvalidAttachedObjectError) -> Self {
        Self::InvalidAgent(value)
    }
}
