//! Greedy geodesic follower facade.
//!
//! # Responsibility
//! - Bind an external pathfinding backend to an agent's action space.
//! - Translate backend step codes into the agent's action keys.
//!
//! # Invariants
//! - `FollowerCode::Stop` maps to `None` (goal reached); every other
//!   non-error code maps to exactly one action key.
//! - Backend error codes and empty paths surface as `GreedyFollowerError`.

use crate::agent::{Agent, AgentConfig, AgentError};
use crate::controls::default_controls::{MOVE_FORWARD, TURN_LEFT, TURN_RIGHT};
use crate::errors::{GreedyFollowerError, InvalidAttachedObjectError};
use crate::model::transform::{Quaternion, Vector3};
use log::warn;
use std::collections::BTreeMap;

/// Goal radius as a fraction of the forward step when none is given.
pub const DEFAULT_GOAL_RADIUS_FACTOR: f32 = 0.75;

/// One step suggested by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FollowerCode {
    Stop,
    Forward,
    Left,
    Right,
    Error,
}

/// Step parameters resolved from the agent's action space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowerSteps {
    /// Distance at which the goal counts as reached.
    pub goal_radius: f32,
    pub forward_amount: f32,
    /// Turn step in degrees.
    pub turn_amount: f32,
}

/// External pathfinder that plans greedy steps along the geodesic path.
///
/// `steps` carries the goal radius and the agent's step sizes; the backend
/// must plan with them.
pub trait GeodesicFollowerBackend {
    /// Next step from the given pose toward `goal`.
    fn next_code(
        &mut self,
        position: Vector3,
        rotation: Quaternion,
        goal: Vector3,
        steps: &FollowerSteps,
    ) -> FollowerCode;

    /// Full step sequence from the given pose toward `goal`, ending with
    /// `Stop`; empty when no path exists.
    fn find_path(
        &mut self,
        position: Vector3,
        rotation: Quaternion,
        goal: Vector3,
        steps: &FollowerSteps,
    ) -> Vec<FollowerCode>;
}

/// Greedy follower for one agent configuration.
#[derive(Debug)]
pub struct GreedyFollower<B: GeodesicFollowerBackend> {
    backend: B,
    action_mapping: BTreeMap<FollowerCode, Option<String>>,
    steps: FollowerSteps,
}

impl<B: GeodesicFollowerBackend> GreedyFollower<B> {
    /// Resolves forward/turn actions from `config` and builds the code mapping.
    ///
    /// # Errors
    /// - `MissingAction` unless exactly one action uses each of
    ///   `move_forward`, `turn_left` and `turn_right`.
    pub fn new(
        backend: B,
        config: &AgentConfig,
        goal_radius: Option<f32>,
    ) -> Result<Self, GreedyFollowerError> {
        let (forward_key, forward_amount) = find_action(config, MOVE_FORWARD)?;
        let (left_key, turn_amount) = find_action(config, TURN_LEFT)?;
        let (right_key, _) = find_action(config, TURN_RIGHT)?;

        let mut action_mapping = BTreeMap::new();
        action_mapping.insert(FollowerCode::Stop, None);
        action_mapping.insert(FollowerCode::Forward, Some(forward_key));
        action_mapping.insert(FollowerCode::Left, Some(left_key));
        action_mapping.insert(FollowerCode::Right, Some(right_key));

        let goal_radius = goal_radius.unwrap_or(DEFAULT_GOAL_RADIUS_FACTOR * forward_amount);

        Ok(Self {
            backend,
            action_mapping,
            steps: FollowerSteps {
                goal_radius,
                forward_amount,
                turn_amount,
            },
        })
    }

    pub fn steps(&self) -> FollowerSteps {
        self.steps
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Next action key toward `goal`; `None` means the goal is reached.
    pub fn next_action_along(
        &mut self,
        agent: &Agent,
        goal: Vector3,
    ) -> Result<Option<String>, GreedyFollowerError> {
        let state = agent.state().map_err(agent_error)?;
        let code = self
            .backend
            .next_code(state.position, state.rotation, goal, &self.steps);
        if code == FollowerCode::Error {
            warn!("event=follower_step module=nav status=error reason=no_progress");
            return Err(GreedyFollowerError::NoProgress);
        }
        self.map_code(code)
    }

    /// Full action sequence toward `goal`, ending with `None`.
    pub fn find_path(
        &mut self,
        agent: &Agent,
        goal: Vector3,
    ) -> Result<Vec<Option<String>>, GreedyFollowerError> {
        let state = agent.state().map_err(agent_error)?;
        let path = self
            .backend
            .find_path(state.position, state.rotation, goal, &self.steps);
        if path.is_empty() {
            warn!("event=follower_path module=nav status=error reason=no_path");
            return Err(GreedyFollowerError::NoPath);
        }
        path.into_iter().map(|code| self.map_code(code)).collect()
    }

    fn map_code(&self, code: FollowerCode) -> Result<Option<String>, GreedyFollowerError> {
        self.action_mapping
            .get(&code)
            .cloned()
            .ok_or(GreedyFollowerError::NoProgress)
    }
}

fn find_action(config: &AgentConfig, name: &str) -> Result<(String, f32), GreedyFollowerError> {
    let mut candidates = config
        .action_space
        .iter()
        .filter(|(_, action)| action.name == name);

    match (candidates.next(), candidates.next()) {
        (Some((key, action)), None) => Ok((key.clone(), action.actuation.amount)),
        _ => Err(GreedyFollowerError::MissingAction(name.to_string())),
    }
}

fn agent_error(err: AgentError) -> GreedyFollowerError {
    match err {
        AgentError::InvalidAttachedObject(err) => GreedyFollowerError::InvalidAgent(err),
        // `Agent::state` only fails on the liveness check.
        _ => GreedyFollowerError::InvalidAgent(InvalidAttachedObjectError),
    }
}

#[cfg(test)]
mod tests {
    use super::{FollowerCode, FollowerSteps, GeodesicFollowerBackend, GreedyFollower};
    use crate::agent::{ActionSpec, Agent, AgentConfig};
    use crate::errors::GreedyFollowerError;
    use crate::model::transform::{Quaternion, Vector3};
    use crate::scene::feature::FeatureKind;
    use crate::scene::shared::SharedSceneGraph;

    #[derive(Default, Debug)]
    struct ScriptedBackend {
        steps: Vec<FollowerCode>,
        path: Vec<FollowerCode>,
        seen_positions: Vec<Vector3>,
    }

    impl GeodesicFollowerBackend for ScriptedBackend {
        fn next_code(
            &mut self,
            position: Vector3,
            _rotation: Quaternion,
            _goal: Vector3,
            _steps: &FollowerSteps,
        ) -> FollowerCode {
            self.seen_positions.push(position);
            if self.steps.is_empty() {
                FollowerCode::Stop
            } else {
                self.steps.remove(0)
            }
        }

        fn find_path(
            &mut self,
            _position: Vector3,
            _rotation: Quaternion,
            _goal: Vector3,
            _steps: &FollowerSteps,
        ) -> Vec<FollowerCode> {
            self.path.clone()
        }
    }

    /// Walks straight at the goal and stops inside the goal radius.
    #[derive(Default, Debug)]
    struct StraightLineBackend {
        seen_steps: Vec<FollowerSteps>,
    }

    impl GeodesicFollowerBackend for StraightLineBackend {
        fn next_code(
            &mut self,
            position: Vector3,
            _rotation: Quaternion,
            goal: Vector3,
            steps: &FollowerSteps,
        ) -> FollowerCode {
            self.seen_steps.push(*steps);
            if (goal - position).length() <= steps.goal_radius {
                FollowerCode::Stop
            } else {
                FollowerCode::Forward
            }
        }

        fn find_path(
            &mut self,
            position: Vector3,
            _rotation: Quaternion,
            goal: Vector3,
            steps: &FollowerSteps,
        ) -> Vec<FollowerCode> {
            self.seen_steps.push(*steps);
            let remaining = ((goal - position).length() - steps.goal_radius).max(0.0);
            let forward_steps = (remaining / steps.forward_amount).ceil() as usize;
            let mut path = vec![FollowerCode::Forward; forward_steps];
            path.push(FollowerCode::Stop);
            path
        }
    }

    fn spawn_agent(scene: &SharedSceneGraph) -> Agent {
        let node = scene.write(|graph| graph.add_child(graph.root(), "agent").expect("add agent"));
        let body = scene
            .attach_feature(node, FeatureKind::AgentBody)
            .expect("attach body");
        Agent::new(body, AgentConfig::default())
    }

    #[test]
    fn default_goal_radius_scales_forward_step() {
        let follower = GreedyFollower::new(ScriptedBackend::default(), &AgentConfig::default(), None)
            .expect("follower");
        let steps = follower.steps();
        assert!((steps.goal_radius - 0.1875).abs() < 1e-6);
        assert_eq!(steps.turn_amount, 10.0);
    }

    #[test]
    fn goal_radius_reaches_backend() {
        let scene = SharedSceneGraph::new();
        let agent = spawn_agent(&scene);
        let goal = Vector3::new(0.0, 0.0, -1.0);

        let mut wide =
            GreedyFollower::new(StraightLineBackend::default(), agent.config(), Some(5.0))
                .expect("wide follower");
        let mut tight =
            GreedyFollower::new(StraightLineBackend::default(), agent.config(), Some(0.01))
                .expect("tight follower");

        assert_eq!(wide.next_action_along(&agent, goal).expect("wide step"), None);
        assert_eq!(
            tight
                .next_action_along(&agent, goal)
                .expect("tight step")
                .as_deref(),
            Some("move_forward")
        );
        assert_eq!(wide.backend().seen_steps, vec![wide.steps()]);
        assert_eq!(tight.backend().seen_steps[0].goal_radius, 0.01);
    }

    #[test]
    fn find_path_plans_with_forward_step_and_radius() {
        let scene = SharedSceneGraph::new();
        let agent = spawn_agent(&scene);
        let mut follower =
            GreedyFollower::new(StraightLineBackend::default(), agent.config(), Some(0.5))
                .expect("follower");

        let path = follower
            .find_path(&agent, Vector3::new(0.0, 0.0, -1.0))
            .expect("path");
        assert_eq!(
            path,
            vec![
                Some("move_forward".to_string()),
                Some("move_forward".to_string()),
                None
            ]
        );
    }

    #[test]
    fn new_requires_each_control_once() {
        let mut config = AgentConfig::default();
        config.action_space.remove("turn_right");
        let err = GreedyFollower::new(ScriptedBackend::default(), &config, Some(0.5))
            .expect_err("missing turn_right must fail");
        assert_eq!(err, GreedyFollowerError::MissingAction("turn_right".to_string()));

        let mut config = AgentConfig::default();
        config
            .action_space
            .insert("dash".to_string(), ActionSpec::new("move_forward", 1.0));
        let err = GreedyFollower::new(ScriptedBackend::default(), &config, None)
            .expect_err("duplicate move_forward must fail");
        assert_eq!(err, GreedyFollowerError::MissingAction("move_forward".to_string()));
    }

    #[test]
    fn next_action_along_maps_codes_and_drives_agent() {
        let scene = SharedSceneGraph::new();
        let agent = spawn_agent(&scene);
        let backend = ScriptedBackend {
            steps: vec![FollowerCode::Forward, FollowerCode::Left],
            ..ScriptedBackend::default()
        };
        let mut follower = GreedyFollower::new(backend, agent.config(), None).expect("follower");
        let goal = Vector3::new(0.0, 0.0, -5.0);

        let first = follower.next_action_along(&agent, goal).expect("first step");
        assert_eq!(first.as_deref(), Some("move_forward"));
        agent.act("move_forward").expect("act forward");

        let second = follower.next_action_along(&agent, goal).expect("second step");
        assert_eq!(second.as_deref(), Some("turn_left"));

        let done = follower.next_action_along(&agent, goal).expect("stop step");
        assert_eq!(done, None);

        let seen = &follower.backend().seen_positions;
        assert_eq!(seen.len(), 3);
        assert!((seen[1] - Vector3::new(0.0, 0.0, -0.25)).length() < 1e-6);
    }

    #[test]
    fn error_code_becomes_no_progress() {
        let scene = SharedSceneGraph::new();
        let agent = spawn_agent(&scene);
        let backend = ScriptedBackend {
            steps: vec![FollowerCode::Error],
            ..ScriptedBackend::default()
        };
        let mut follower = GreedyFollower::new(backend, agent.config(), None).expect("follower");
        assert_eq!(
            follower.next_action_along(&agent, Vector3::ZERO),
            Err(GreedyFollowerError::NoProgress)
        );
    }

    #[test]
    fn find_path_maps_codes_and_rejects_empty_path() {
        let scene = SharedSceneGraph::new();
        let agent = spawn_agent(&scene);
        let backend = ScriptedBackend {
            path: vec![
                FollowerCode::Right,
                FollowerCode::Forward,
                FollowerCode::Stop,
            ],
            ..ScriptedBackend::default()
        };
        let mut follower = GreedyFollower::new(backend, agent.config(), None).expect("follower");
        let path = follower
            .find_path(&agent, Vector3::ZERO)
            .expect("path should map");
        assert_eq!(
            path,
            vec![
                Some("turn_right".to_string()),
                Some("move_forward".to_string()),
                None
            ]
        );

        let mut empty =
            GreedyFollower::new(ScriptedBackend::default(), agent.config(), None).expect("follower");
        assert_eq!(
            empty.find_path(&agent, Vector3::ZERO),
            Err(GreedyFollowerError::NoPath)
        );
    }

    #[test]
    fn destroyed_agent_surfaces_invalid_agent() {
        let scene = SharedSceneGraph::new();
        let agent = spawn_agent(&scene);
        let node = agent.body().node().expect("body node");
        scene.write(|graph| graph.destroy(node).expect("destroy body"));

        let mut follower = GreedyFollower::new(ScriptedBackend::default(), agent.config(), None)
            .expect("follower");
        assert!(matches!(
            follower.next_action_along(&agent, Vector3::ZERO),
            Err(GreedyFollowerError::InvalidAgent(_))
        ));
    }
}
