//! Scene-node controls used to implement agent actions.
//!
//! # Responsibility
//! - Define the control contract and its actuation parameters.
//! - Keep a name-indexed registry of controls.
//! - Apply a control to an attached feature's node behind the liveness guard.
//!
//! # Invariants
//! - No control touches a node before `assert_valid` passes.
//! - The mutation itself re-checks reachability under the write lock.
//! - Control names are non-blank and unique within one registry.

pub mod default_controls;

use crate::errors::InvalidAttachedObjectError;
use crate::guard::assert_valid;
use crate::model::transform::Transform;
use crate::scene::feature::AttachedFeature;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};

/// Parameters for one control invocation.
///
/// Built-in controls use a single `amount`: scene units for moves, degrees
/// for rotations.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActuationSpec {
    pub amount: f32,
}

/// One action applied to a scene node's local transform.
pub trait SceneNodeControl: Send + Sync {
    /// Mutates `transform` according to `spec`.
    fn apply(&self, transform: &mut Transform, spec: &ActuationSpec);

    /// Whether the control moves the agent body rather than only its sensors.
    fn body_action(&self) -> bool {
        false
    }
}

/// Errors from control registration and application.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControlError {
    /// Target feature failed the liveness check.
    InvalidAttachedObject(InvalidAttachedObjectError),
    /// No control is registered under this name.
    UnknownControl(String),
    /// A control is already registered under this name.
    DuplicateControl(String),
    /// Control name is blank after trim.
    InvalidControlName,
}

impl Display for ControlError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAttachedObject(err) => write!(f, "{err}"),
            Self::UnknownControl(name) => write!(f, "control is not registered: {name}"),
            Self::DuplicateControl(name) => write!(f, "control already registered: {name}"),
            Self::InvalidControlName => write!(f, "control name must not be blank"),
        }
    }
}

impl Error for ControlError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAttachedObject(err) => Some(err),
            _ => None,
        }
    }
}

impl From<InvalidAttachedObjectError> for ControlError {
    fn from(value: InvalidAttachedObjectError) -> Self {
        Self::InvalidAttachedObject(value)
    }
}

/// Name-indexed control table.
#[derive(Default)]
pub struct ControlRegistry {
    controls: BTreeMap<String, Box<dyn SceneNodeControl>>,
}

impl Debug for ControlRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ControlRegistry")
            .field("names", &self.names())
            .finish()
    }
}

impl ControlRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with every built-in move/look control.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        for (name, control) in default_controls::default_controls() {
            registry.controls.insert(name.to_string(), control);
        }
        registry
    }

    /// Registers `control` under `name`.
    pub fn register(
        &mut self,
        name: &str,
        control: impl SceneNodeControl + 'static,
    ) -> Result<(), ControlError> {
        let normalized = name.trim();
        if normalized.is_empty() {
            return Err(ControlError::InvalidControlName);
        }
        if self.controls.contains_key(normalized) {
            return Err(ControlError::DuplicateControl(normalized.to_string()));
        }
        self.controls
            .insert(normalized.to_string(), Box::new(control));
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&dyn SceneNodeControl> {
        self.controls.get(name).map(|control| control.as_ref())
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.controls.keys().map(String::as_str).collect()
    }

    pub fn len(&self) -> usize {
        self.controls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.controls.is_empty()
    }
}

/// Applies the control `name` to `feature`'s node.
///
/// Returns the control's `body_action` flag on success.
///
/// # Errors
/// - `InvalidAttachedObject` when the feature's node is gone or detached,
///   either before lookup or by the time the write lock is taken.
/// - `UnknownControl` when `name` is not registered.
pub fn apply_control(
    feature: &AttachedFeature,
    registry: &ControlRegistry,
    name: &str,
    spec: &ActuationSpec,
) -> Result<bool, ControlError> {
    assert_valid(feature)?;
    let control = registry
        .get(name)
        .ok_or_else(|| ControlError::UnknownControl(name.to_string()))?;

    feature.with_node_mut(|graph, node| {
        graph
            .transform_mut(node)
            .map(|transform| control.apply(transform, spec))
            .map_err(|_| InvalidAttachedObjectError)
    })??;

    Ok(control.body_action())
}
