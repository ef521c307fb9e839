//! Shared error type.
//!
//! Sub-crates define their own enums and wrap `HaulError` with `#[from]`
//! where they surface core failures.

use thiserror::Error;

use crate::{AgentId, NodeId};

#[derive(Debug, Error)]
pub enum HaulError {
    #[error("agent {0} not found")]
    AgentNotFound(AgentId),

    #[error("node {0} not found")]
    NodeNotFound(NodeId),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type HaulResult<T> = Result<T, HaulError>;
