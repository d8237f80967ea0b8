//! Minimal engine-side scene graph and the features attached to it.
//!
//! # Responsibility
//! - Own node lifetimes (`SceneGraph`, `SharedSceneGraph`).
//! - Bind features to nodes without owning them (`AttachedFeature`).
//!
//! # Invariants
//! - Node lifetime is controlled only through `SceneGraph` operations.
//! - Features observe validity, they never extend it.

pub mod feature;
pub mod graph;
pub mod shared;
