//! Generational scene-graph node table.
//!
//! # Responsibility
//! - Own every scene node and its parent/child links.
//! - Answer existence and reachability queries for non-owning handles.
//!
//! # Invariants
//! - Exactly one root node exists; it cannot be destroyed or detached.
//! - Destroying a node removes its whole subtree and bumps each slot
//!   generation, so previously minted handles stay stale forever.
//! - Child order is insertion order.
//! - Re-parenting never creates a cycle.

use crate::model::handle::{NodeHandle, SceneGraphId};
use crate::model::transform::Transform;
use log::debug;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Result type used by scene-graph operations.
pub type SceneGraphResult<T> = Result<T, SceneGraphError>;

/// Errors from scene-graph operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SceneGraphError {
    /// Handle's slot was destroyed or never existed.
    StaleHandle(NodeHandle),
    /// Handle was minted by another scene graph.
    ForeignHandle(NodeHandle),
    /// Root node cannot be destroyed or detached.
    RootImmutable,
    /// Re-parenting would place a node under itself.
    CycleDetected {
        node: NodeHandle,
        parent: NodeHandle,
    },
}

impl Display for SceneGraphError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::StaleHandle(handle) => write!(f, "scene node handle is stale: {handle}"),
            Self::ForeignHandle(handle) => {
                write!(f, "scene node handle belongs to another scene graph: {handle}")
            }
            Self::RootImmutable => write!(f, "scene root cannot be destroyed or detached"),
            Self::CycleDetected { node, parent } => write!(
                f,
                "reattach would create cycle: node {node} under parent {parent}"
            ),
        }
    }
}

impl Error for SceneGraphError {}

/// One node owned by the scene graph.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    /// Debug label; not required to be unique.
    pub name: String,
    /// `None` for the root and for detached subtree tops.
    pub parent: Option<NodeHandle>,
    pub children: Vec<NodeHandle>,
    /// Transform relative to `parent`.
    pub transform: Transform,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<SceneNode>,
}

/// Node table with index/generation handles.
#[derive(Debug)]
pub struct SceneGraph {
    id: SceneGraphId,
    slots: Vec<Slot>,
    free: Vec<u32>,
    root: NodeHandle,
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneGraph {
    /// Creates a graph containing only the root node.
    pub fn new() -> Self {
        let id = Uuid::new_v4();
        let root = NodeHandle::new(id, 0, 0);
        Self {
            id,
            slots: vec![Slot {
                generation: 0,
                node: Some(SceneNode {
                    name: "root".to_string(),
                    parent: None,
                    children: Vec::new(),
                    transform: Transform::IDENTITY,
                }),
            }],
            free: Vec::new(),
            root,
        }
    }

    pub fn id(&self) -> SceneGraphId {
        self.id
    }

    pub fn root(&self) -> NodeHandle {
        self.root
    }

    /// Number of live nodes, root included; never zero.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|slot| slot.node.is_some()).count()
    }

    /// Returns whether `handle` refers to a live node of this graph.
    pub fn exists(&self, handle: NodeHandle) -> bool {
        self.node(handle).is_ok()
    }

    /// Returns whether `handle` is live and its parent chain ends at the root.
    pub fn is_reachable(&self, handle: NodeHandle) -> bool {
        let mut current = handle;
        // A live chain has at most one step per slot.
        for _ in 0..=self.slots.len() {
            if current == self.root {
                return true;
            }
            match self.node(current) {
                Ok(SceneNode {
                    parent: Some(parent),
                    ..
                }) => current = *parent,
                _ => return false,
            }
        }
        false
    }

    pub fn node(&self, handle: NodeHandle) -> SceneGraphResult<&SceneNode> {
        self.check_owner(handle)?;
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_ref())
            .ok_or(SceneGraphError::StaleHandle(handle))
    }

    fn node_mut(&mut self, handle: NodeHandle) -> SceneGraphResult<&mut SceneNode> {
        self.check_owner(handle)?;
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.node.as_mut())
            .ok_or(SceneGraphError::StaleHandle(handle))
    }

    pub fn children(&self, handle: NodeHandle) -> SceneGraphResult<&[NodeHandle]> {
        Ok(self.node(handle)?.children.as_slice())
    }

    pub fn transform(&self, handle: NodeHandle) -> SceneGraphResult<Transform> {
        Ok(self.node(handle)?.transform)
    }

    pub fn transform_mut(&mut self, handle: NodeHandle) -> SceneGraphResult<&mut Transform> {
        Ok(&mut self.node_mut(handle)?.transform)
    }

    pub fn set_transform(&mut self, handle: NodeHandle, transform: Transform) -> SceneGraphResult<()> {
        self.node_mut(handle)?.transform = transform;
        Ok(())
    }

    /// Composes transforms from the top of `handle`'s chain down to `handle`.
    pub fn absolute_transform(&self, handle: NodeHandle) -> SceneGraphResult<Transform> {
        let mut chain = Vec::new();
        let mut current = Some(handle);
        while let Some(node_handle) = current {
            let node = self.node(node_handle)?;
            chain.push(node.transform);
            current = node.parent;
        }

        Ok(chain
            .iter()
            .rev()
            .fold(Transform::IDENTITY, |acc, local| Transform::compose(&acc, local)))
    }

    /// Creates a child node under `parent`. The parent need not be reachable.
    pub fn add_child(
        &mut self,
        parent: NodeHandle,
        name: impl Into<String>,
    ) -> SceneGraphResult<NodeHandle> {
        self.node(parent)?;

        let node = SceneNode {
            name: name.into(),
            parent: Some(parent),
            children: Vec::new(),
            transform: Transform::IDENTITY,
        };

        let handle = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index as usize];
                slot.node = Some(node);
                NodeHandle::new(self.id, index, slot.generation)
            }
            None => {
                let index = self.slots.len() as u32;
                self.slots.push(Slot {
                    generation: 0,
                    node: Some(node),
                });
                NodeHandle::new(self.id, index, 0)
            }
        };

        self.node_mut(parent)?.children.push(handle);
        Ok(handle)
    }

    /// Destroys `handle` and its subtree; returns the number of removed nodes.
    pub fn destroy(&mut self, handle: NodeHandle) -> SceneGraphResult<usize> {
        if handle == self.root {
            return Err(SceneGraphError::RootImmutable);
        }
        self.unlink_from_parent(handle)?;

        let mut pending = vec![handle];
        let mut removed = 0usize;
        while let Some(current) = pending.pop() {
            let slot = &mut self.slots[current.index as usize];
            if let Some(node) = slot.node.take() {
                slot.generation = slot.generation.wrapping_add(1);
                self.free.push(current.index);
                pending.extend(node.children);
                removed += 1;
            }
        }

        debug!(
            "event=node_destroy module=scene status=ok node={} removed={}",
            handle, removed
        );
        Ok(removed)
    }

    /// Unlinks `handle` from its parent; the subtree stays alive but unreachable.
    pub fn detach(&mut self, handle: NodeHandle) -> SceneGraphResult<()> {
        if handle == self.root {
            return Err(SceneGraphError::RootImmutable);
        }
        self.unlink_from_parent(handle)?;
        debug!("event=node_detach module=scene status=ok node={}", handle);
        Ok(())
    }

    /// Moves `handle` under `parent`, detaching it from any current parent.
    pub fn reattach(&mut self, handle: NodeHandle, parent: NodeHandle) -> SceneGraphResult<()> {
        if handle == self.root {
            return Err(SceneGraphError::RootImmutable);
        }
        self.node(parent)?;
        if self.is_ancestor_or_self(handle, parent)? {
            return Err(SceneGraphError::CycleDetected {
                node: handle,
                parent,
            });
        }

        self.unlink_from_parent(handle)?;
        self.node_mut(handle)?.parent = Some(parent);
        self.node_mut(parent)?.children.push(handle);
        debug!(
            "event=node_reattach module=scene status=ok node={} parent={}",
            handle, parent
        );
        Ok(())
    }

    fn is_ancestor_or_self(
        &self,
        ancestor: NodeHandle,
        node: NodeHandle,
    ) -> SceneGraphResult<bool> {
        let mut current = Some(node);
        while let Some(handle) = current {
            if handle == ancestor {
                return Ok(true);
            }
            current = self.node(handle)?.parent;
        }
        Ok(false)
    }

    fn unlink_from_parent(&mut self, handle: NodeHandle) -> SceneGraphResult<()> {
        let parent = self.node_mut(handle)?.parent.take();
        if let Some(parent) = parent {
            if let Ok(parent_node) = self.node_mut(parent) {
                parent_node.children.retain(|child| *child != handle);
            }
        }
        Ok(())
    }

    fn check_owner(&self, handle: NodeHandle) -> SceneGraphResult<()> {
        if handle.graph != self.id {
            return Err(SceneGraphError::ForeignHandle(handle));
        }
        Ok(())
    }
}
