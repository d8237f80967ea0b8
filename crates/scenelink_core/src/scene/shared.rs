//! Shared ownership wrapper for the engine-side scene graph.
//!
//! # Invariants
//! - Only the engine side holds strong references; features hold `Weak`.
//! - A poisoned lock is recovered by taking the inner guard.

use crate::model::handle::NodeHandle;
use crate::scene::feature::{AttachedFeature, FeatureKind};
use crate::scene::graph::{SceneGraph, SceneGraphResult};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

/// Thread-safe handle to one scene graph.
#[derive(Debug, Clone, Default)]
pub struct SharedSceneGraph {
    inner: Arc<RwLock<SceneGraph>>,
}

impl SharedSceneGraph {
    pub fn new() -> Self {
        Self::from_graph(SceneGraph::new())
    }

    pub fn from_graph(graph: SceneGraph) -> Self {
        Self {
            inner: Arc::new(RwLock::new(graph)),
        }
    }

    /// Runs `f` under the read lock.
    pub fn read<R>(&self, f: impl FnOnce(&SceneGraph) -> R) -> R {
        let guard = read_lock(&self.inner);
        f(&guard)
    }

    /// Runs `f` under the write lock.
    ///
    /// `f` must not call `assert_valid`, `has_valid_node` or
    /// `AttachedFeature::with_node*` for a feature of this graph: the lock is
    /// not re-entrant and those calls deadlock. Query the `SceneGraph`
    /// passed to `f` directly.
    pub fn write<R>(&self, f: impl FnOnce(&mut SceneGraph) -> R) -> R {
        let mut guard = write_lock(&self.inner);
        f(&mut guard)
    }

    /// Non-owning reference for features.
    pub fn downgrade(&self) -> Weak<RwLock<SceneGraph>> {
        Arc::downgrade(&self.inner)
    }

    /// Binds a new feature to `node`; the node must exist.
    pub fn attach_feature(
        &self,
        node: NodeHandle,
        kind: FeatureKind,
    ) -> SceneGraphResult<AttachedFeature> {
        self.read(|graph| graph.node(node).map(|_| ()))?;
        Ok(AttachedFeature::attached(kind, self.downgrade(), node))
    }
}

pub(crate) fn read_lock(lock: &RwLock<SceneGraph>) -> RwLockReadGuard<'_, SceneGraph> {
    lock.read().unwrap_or_else(PoisonError::into_inner)
}

pub(crate) fn write_lock(lock: &RwLock<SceneGraph>) -> RwLockWriteGuard<'_, SceneGraph> {
    lock.write().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::SharedSceneGraph;
    use crate::scene::feature::FeatureKind;
    use crate::scene::graph::SceneGraphError;

    #[test]
    fn attach_feature_requires_existing_node() {
        let scene = SharedSceneGraph::new();
        let node = scene.write(|graph| graph.add_child(graph.root(), "body").expect("add body"));
        scene.write(|graph| graph.destroy(node).expect("destroy body"));

        let err = scene
            .attach_feature(node, FeatureKind::Sensor)
            .expect_err("stale node must be rejected");
        assert_eq!(err, SceneGraphError::StaleHandle(node));
    }

    #[test]
    fn read_recovers_from_poisoned_lock() {
        let scene = SharedSceneGraph::new();
        let poisoned = scene.clone();
        let result = std::thread::spawn(move || {
            poisoned.write(|_| panic!("writer panics while holding the lock"));
        })
        .join();
        assert!(result.is_err());

        assert_eq!(scene.read(|graph| graph.len()), 1);
    }
}
