//! Features bound to scene-graph nodes.
//!
//! # Responsibility
//! - Represent behavior attached to a node without owning that node.
//! - Implement the liveness query consumed by `assert_valid`.
//!
//! # Invariants
//! - A feature holds only a `Weak` graph reference plus a `NodeHandle`.
//! - A feature stays a plain value after its node dies; it just reports invalid.

use crate::errors::InvalidAttachedObjectError;
use crate::guard::AttachedObject;
use crate::model::handle::NodeHandle;
use crate::scene::graph::SceneGraph;
use crate::scene::shared::{read_lock, write_lock};
use serde::{Deserialize, Serialize};
use std::sync::{RwLock, Weak};
use uuid::Uuid;

/// Stable identifier of one attached feature.
pub type FeatureId = Uuid;

/// What a feature does for its node.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureKind {
    /// Body of an agent driven by controls.
    AgentBody,
    /// Sensor mounted on a node.
    Sensor,
    /// Caller-defined feature type.
    Custom(String),
}

impl FeatureKind {
    /// Parses a binding-layer label; unknown labels become `Custom`.
    pub fn from_label(label: &str) -> Self {
        match label.trim() {
            "agent_body" => Self::AgentBody,
            "sensor" => Self::Sensor,
            other => Self::Custom(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::AgentBody => "agent_body",
            Self::Sensor => "sensor",
            Self::Custom(value) => value.as_str(),
        }
    }
}

/// Feature value referencing a node of an externally-owned scene graph.
#[derive(Debug, Clone)]
pub struct AttachedFeature {
    id: FeatureId,
    kind: FeatureKind,
    graph: Weak<RwLock<SceneGraph>>,
    node: Option<NodeHandle>,
}

impl AttachedFeature {
    /// Creates a feature that was never attached to any node.
    pub fn detached(kind: FeatureKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            graph: Weak::new(),
            node: None,
        }
    }

    pub(crate) fn attached(
        kind: FeatureKind,
        graph: Weak<RwLock<SceneGraph>>,
        node: NodeHandle,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            graph,
            node: Some(node),
        }
    }

    pub fn id(&self) -> FeatureId {
        self.id
    }

    pub fn kind(&self) -> &FeatureKind {
        &self.kind
    }

    /// Referenced node handle, if the feature was ever attached.
    pub fn node(&self) -> Option<NodeHandle> {
        self.node
    }

    /// Runs `f` under the graph read lock after re-checking reachability.
    ///
    /// `f` must not lock the same graph again.
    pub fn with_node<R>(
        &self,
        f: impl FnOnce(&SceneGraph, NodeHandle) -> R,
    ) -> Result<R, InvalidAttachedObjectError> {
        let node = self.node.ok_or(InvalidAttachedObjectError)?;
        let graph = self.graph.upgrade().ok_or(InvalidAttachedObjectError)?;
        let guard = read_lock(&graph);
        if !guard.is_reachable(node) {
            return Err(InvalidAttachedObjectError);
        }
        Ok(f(&guard, node))
    }

    /// Runs `f` under the graph write lock after re-checking reachability.
    ///
    /// Use this when the check and the mutation must observe the same graph
    /// state; `assert_valid` alone is only a point-in-time answer.
    pub fn with_node_mut<R>(
        &self,
        f: impl FnOnce(&mut SceneGraph, NodeHandle) -> R,
    ) -> Result<R, InvalidAttachedObjectError> {
        let node = self.node.ok_or(InvalidAttachedObjectError)?;
        let graph = self.graph.upgrade().ok_or(InvalidAttachedObjectError)?;
        let mut guard = write_lock(&graph);
        if !guard.is_reachable(node) {
            return Err(InvalidAttachedObjectError);
        }
        Ok(f(&mut guard, node))
    }
}

impl AttachedObject for AttachedFeature {
    /// Takes the graph read lock.
    ///
    /// Do not call this (or `assert_valid` on a feature) from inside a
    /// `SharedSceneGraph::write` or `with_node_mut` closure on the same graph:
    /// `std::sync::RwLock` is not re-entrant and the call deadlocks. Inside
    /// the closure use `SceneGraph::is_reachable` on the node handle instead.
    fn has_valid_node(&self) -> bool {
        self.with_node(|_, _| ()).is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::{AttachedFeature, FeatureKind};
    use crate::guard::AttachedObject;
    use crate::scene::shared::SharedSceneGraph;

    #[test]
    fn feature_kind_labels_round_trip_known_values() {
        assert_eq!(FeatureKind::from_label("agent_body"), FeatureKind::AgentBody);
        assert_eq!(FeatureKind::from_label(" sensor "), FeatureKind::Sensor);
        assert_eq!(FeatureKind::from_label("lidar").label(), "lidar");
    }

    #[test]
    fn never_attached_feature_has_no_node() {
        let feature = AttachedFeature::detached(FeatureKind::Sensor);
        assert!(feature.node().is_none());
        assert!(!feature.has_valid_node());
    }

    #[test]
    fn feature_does_not_keep_graph_alive() {
        let scene = SharedSceneGraph::new();
        let node = scene.write(|graph| graph.add_child(graph.root(), "body").expect("add body"));
        let feature = scene
            .attach_feature(node, FeatureKind::AgentBody)
            .expect("attach feature");
        assert!(feature.has_valid_node());

        drop(scene);
        assert!(!feature.has_valid_node());
        assert_eq!(feature.node(), Some(node));
    }

    #[test]
    fn with_node_mut_rejects_stale_node_under_lock() {
        let scene = SharedSceneGraph::new();
        let node = scene.write(|graph| graph.add_child(graph.root(), "body").expect("add body"));
        let feature = scene
            .attach_feature(node, FeatureKind::AgentBody)
            .expect("attach feature");

        let removed = feature
            .with_node_mut(|graph, handle| graph.destroy(handle))
            .expect("feature valid before destroy")
            .expect("destroy under lock");
        assert_eq!(removed, 1);
        assert!(feature.with_node_mut(|_, _| ()).is_err());
    }

    #[test]
    fn lock_free_reachability_matches_guard_inside_write() {
        let scene = SharedSceneGraph::new();
        let node = scene.write(|graph| graph.add_child(graph.root(), "body").expect("add body"));
        let feature = scene
            .attach_feature(node, FeatureKind::AgentBody)
            .expect("attach feature");

        let handle = feature.node().expect("attached");
        let reachable = scene.write(|graph| {
            graph.detach(handle).expect("detach");
            graph.is_reachable(handle)
        });
        assert!(!reachable);
        assert_eq!(feature.has_valid_node(), reachable);
    }
}
