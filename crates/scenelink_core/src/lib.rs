//! Core of the scenelink binding layer.
//! Handles to an engine-owned scene graph, the liveness guard that checks
//! them, and the agent/navigation helpers built on top.

pub mod agent;
pub mod controls;
pub mod errors;
pub mod guard;
pub mod logging;
pub mod model;
pub mod nav;
pub mod scene;

pub use agent::{ActionSpec, Agent, AgentConfig, AgentError, AgentState};
pub use controls::{
    apply_control, ActuationSpec, ControlError, ControlRegistry, SceneNodeControl,
};
pub use errors::{
    GreedyFollowerError, InvalidAttachedObjectError, INVALID_ATTACHED_OBJECT_MESSAGE,
};
pub use guard::{assert_valid, AttachedObject};
pub use logging::{default_log_level, init_logging, logging_status, LogLevel, LoggingError};
pub use model::handle::{NodeHandle, NodeHandleParseError, SceneGraphId};
pub use model::transform::{Quaternion, Transform, Vector3};
pub use nav::greedy_follower::{
    FollowerCode, FollowerSteps, GeodesicFollowerBackend, GreedyFollower,
};
pub use scene::feature::{AttachedFeature, FeatureId, FeatureKind};
pub use scene::graph::{SceneGraph, SceneGraphError, SceneGraphResult, SceneNode};
pub use scene::shared::SharedSceneGraph;

/// Minimal health-check API for binding smoke tests.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::{core_version, ping};

    #[test]
    fn ping_returns_pong() {
        assert_eq!(ping(), "pong");
    }

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
