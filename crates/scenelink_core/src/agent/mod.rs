//! Agents driven through named actions on an attached body.
//!
//! # Responsibility
//! - Map action keys to control names and actuation parameters.
//! - Read and write the body's pose through the liveness guard.
//! - Route body actions to the body and sensor actions to mounted sensors.
//!
//! # Invariants
//! - Every operation checks the body feature before dereferencing its node.
//! - The agent never owns its body node; destroying the node invalidates the
//!   agent without destroying the `Agent` value.

use crate::controls::default_controls::{MOVE_FORWARD, TURN_LEFT, TURN_RIGHT};
use crate::controls::{apply_control, ActuationSpec, ControlError, ControlRegistry};
use crate::errors::InvalidAttachedObjectError;
use crate::guard::assert_valid;
use crate::model::transform::{Quaternion, Transform, Vector3};
use crate::scene::feature::AttachedFeature;
use crate::scene::graph::SceneGraphResult;
use log::debug;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default forward step in scene units.
pub const DEFAULT_FORWARD_AMOUNT: f32 = 0.25;
/// Default turn step in degrees.
pub const DEFAULT_TURN_AMOUNT: f32 = 10.0;

/// Named control plus its parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionSpec {
    /// Control registry name, e.g. `move_forward`.
    pub name: String,
    pub actuation: ActuationSpec,
}

impl ActionSpec {
    pub fn new(name: impl Into<String>, amount: f32) -> Self {
        Self {
            name: name.into(),
            actuation: ActuationSpec { amount },
        }
    }
}

/// Agent configuration: action key -> action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentConfig {
    pub action_space: BTreeMap<String, ActionSpec>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        let action_space = [
            (MOVE_FORWARD, DEFAULT_FORWARD_AMOUNT),
            (TURN_LEFT, DEFAULT_TURN_AMOUNT),
            (TURN_RIGHT, DEFAULT_TURN_AMOUNT),
        ]
        .into_iter()
        .map(|(name, amount)| (name.to_string(), ActionSpec::new(name, amount)))
        .collect();
        Self { action_space }
    }
}

/// World-frame pose of the agent body.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AgentState {
    pub position: Vector3,
    pub rotation: Quaternion,
}

/// Errors from agent operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AgentError {
    /// Body feature failed the liveness check.
    InvalidAttachedObject(InvalidAttachedObjectError),
    /// Action key is not in the action space.
    UnknownAction(String),
    /// Control lookup or application failed.
    Control(ControlError),
}

impl Display for AgentError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidAttachedObject(err) => write!(f, "{err}"),
            Self::UnknownAction(key) => write!(f, "action is not in action space: {key}"),
            Self::Control(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AgentError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidAttachedObject(err) => Some(err),
            Self::UnknownAction(_) => None,
            Self::Control(err) => Some(err),
        }
    }
}

impl From<InvalidAttachedObjectError> for AgentError {
    fn from(value: InvalidAttachedObjectError) -> Self {
        Self::InvalidAttachedObject(value)
    }
}

impl From<ControlError> for AgentError {
    fn from(value: ControlError) -> Self {
        match value {
            ControlError::InvalidAttachedObject(err) => Self::InvalidAttachedObject(err),
            other => Self::Control(other),
        }
    }
}

/// Agent bound to a body feature, with optional sensors.
#[derive(Debug)]
pub struct Agent {
    body: AttachedFeature,
    sensors: Vec<AttachedFeature>,
    config: AgentConfig,
    controls: ControlRegistry,
}

impl Agent {
    /// Creates an agent with the built-in control registry.
    pub fn new(body: AttachedFeature, config: AgentConfig) -> Self {
        Self::with_controls(body, config, ControlRegistry::with_defaults())
    }

    pub fn with_controls(
        body: AttachedFeature,
        config: AgentConfig,
        controls: ControlRegistry,
    ) -> Self {
        Self {
            body,
            sensors: Vec::new(),
            config,
            controls,
        }
    }

    pub fn body(&self) -> &AttachedFeature {
        &self.body
    }

    /// Mounts a sensor; non-body actions move every mounted sensor.
    ///
    /// Sensors are usually attached to children of the body node so body
    /// actions carry them along.
    pub fn attach_sensor(&mut self, sensor: AttachedFeature) {
        self.sensors.push(sensor);
    }

    pub fn sensors(&self) -> &[AttachedFeature] {
        &self.sensors
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Returns the body's world-frame pose.
    pub fn state(&self) -> Result<AgentState, AgentError> {
        assert_valid(&self.body)?;
        let absolute = self
            .body
            .with_node(|graph, node| graph.absolute_transform(node))?
            .map_err(|_| InvalidAttachedObjectError)?;
        Ok(AgentState {
            position: absolute.translation,
            rotation: absolute.rotation,
        })
    }

    /// Moves the body to the world-frame pose `state`.
    ///
    /// The pose is converted into the parent's frame, so
    /// `set_state(state()?)` leaves the body where it is.
    pub fn set_state(&self, state: AgentState) -> Result<(), AgentError> {
        assert_valid(&self.body)?;
        let world = Transform::new(state.position, state.rotation.normalized());
        self.body
            .with_node_mut(|graph, node| -> SceneGraphResult<()> {
                let parent = match graph.node(node)?.parent {
                    Some(parent) => graph.absolute_transform(parent)?,
                    None => Transform::IDENTITY,
                };
                graph.set_transform(node, Transform::compose(&parent.inverse(), &world))
            })?
            .map_err(|_| InvalidAttachedObjectError)?;
        Ok(())
    }

    /// Performs the action registered under `action_key`.
    ///
    /// Body actions move the body node. Other actions move each mounted
    /// sensor and leave the body pose unchanged.
    ///
    /// Returns whether the action moved the body (`body_action`).
    pub fn act(&self, action_key: &str) -> Result<bool, AgentError> {
        assert_valid(&self.body)?;
        let action = self
            .config
            .action_space
            .get(action_key)
            .ok_or_else(|| AgentError::UnknownAction(action_key.to_string()))?;
        let name = action.name.as_str();
        let control = self
            .controls
            .get(name)
            .ok_or_else(|| ControlError::UnknownControl(name.to_string()))?;

        let body_action = control.body_action();
        if body_action {
            apply_control(&self.body, &self.controls, name, &action.actuation)?;
        } else {
            for sensor in &self.sensors {
                apply_control(sensor, &self.controls, name, &action.actuation)?;
            }
        }
        debug!(
            "event=agent_act module=agent status=ok action={} body_action={}",
            action_key, body_action
        );
        Ok(body_action)
    }
}
