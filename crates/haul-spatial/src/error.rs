//! Spatial-subsystem error type.
//!
//! Only map construction can fail.  Searches report "no path" as an empty
//! [`Route`][crate::Route] or `None`, never as an error.

use thiserror::Error;

use haul_core::NodeId;

#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("node {0} not found in network")]
    NodeNotFound(NodeId),

    #[error("edge {from} -> {to} has invalid length {length_m} m")]
    InvalidLength { from: NodeId, to: NodeId, length_m: f64 },
}

pub type SpatialResult<T> = Result<T, SpatialError>;
