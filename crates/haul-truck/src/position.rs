use serde::{Deserialize, Serialize};

use haul_core::{EdgeId, NodeId};

/// Where a truck is.  Exactly one variant holds at any time.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Position {
    AtNode(NodeId),
    /// `progress_m` metres along `edge`, measured from its `from` node.
    OnEdge { edge: EdgeId, progress_m: f64 },
}

impl Position {
    pub fn node(&self) -> Option<NodeId> {
        match *self {
            Position::AtNode(n) => Some(n),
            Position::OnEdge { .. } => None,
        }
    }

    pub fn is_on_edge(&self) -> bool {
        matches!(self, Position::OnEdge { .. })
    }
}
