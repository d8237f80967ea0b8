//! Non-owning node handles.
//!
//! # Responsibility
//! - Identify one scene-graph node without holding its storage.
//! - Provide a stable string form for binding layers.
//!
//! # Invariants
//! - A handle is only honoured by the graph whose id it carries.
//! - `generation` must match the slot generation; destroyed slots bump it, so
//!   stale handles never alias a newer node in the same slot.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;
use uuid::Uuid;

/// Identity of one scene-graph instance.
pub type SceneGraphId = Uuid;

/// Index/generation pair pointing into a scene graph's node table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeHandle {
    /// Graph that minted this handle.
    pub graph: SceneGraphId,
    /// Slot index in the node table.
    pub index: u32,
    /// Slot generation at mint time.
    pub generation: u32,
}

impl NodeHandle {
    pub fn new(graph: SceneGraphId, index: u32, generation: u32) -> Self {
        Self {
            graph,
            index,
            generation,
        }
    }
}

impl Display for NodeHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}:{}", self.graph, self.index, self.generation)
    }
}

/// Errors from parsing the `graph:index:generation` string form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeHandleParseError {
    /// Input did not have exactly three `:`-separated parts.
    Malformed(String),
    /// Graph id part is not a UUID.
    InvalidGraphId(String),
    /// Index or generation part is not an unsigned integer.
    InvalidNumber(String),
}

impl Display for NodeHandleParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(value) => {
                write!(f, "node handle must be `graph:index:generation`, got `{value}`")
            }
            Self::InvalidGraphId(value) => write!(f, "invalid scene graph id: {value}"),
            Self::InvalidNumber(value) => write!(f, "invalid node handle number: {value}"),
        }
    }
}

impl Error for NodeHandleParseError {}

impl FromStr for NodeHandle {
    type Err = NodeHandleParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let parts = trimmed.split(':').collect::<Vec<_>>();
        let [graph, index, generation] = parts.as_slice() else {
            return Err(NodeHandleParseError::Malformed(trimmed.to_string()));
        };

        let graph = Uuid::parse_str(graph)
            .map_err(|_| NodeHandleParseError::InvalidGraphId((*graph).to_string()))?;
        let index = index
            .parse::<u32>()
            .map_err(|_| NodeHandleParseError::InvalidNumber((*index).to_string()))?;
        let generation = generation
            .parse::<u32>()
            .map_err(|_| NodeHandleParseError::InvalidNumber((*generation).to_string()))?;

        Ok(Self::new(graph, index, generation))
    }
}
