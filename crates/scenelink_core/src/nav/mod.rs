//! Navigation helpers layered over agents.
//!
//! # Responsibility
//! - Adapt external pathfinding backends to agent action keys.
//!
//! # See also
//! - `crate::errors::GreedyFollowerError`

pub mod greedy_follower;
