//! Value types shared by the scene graph and its bindings.
//!
//! # Responsibility
//! - Define non-owning node handles.
//! - Define transform math used by node controls.
//!
//! # Invariants
//! - Nothing in this module owns or extends a node's lifetime.

pub mod handle;
pub mod transform;
