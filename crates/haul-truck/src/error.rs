use haul_core::NodeId;
use thiserror::Error;

/// Construction-time failures.  Nothing that happens inside
/// [`Truck::decide`][crate::Truck::decide] is an error.
#[derive(Debug, Error)]
pub enum TruckError {
    #[error("cannot spawn on {0}: node not in graph")]
    NodeNotFound(NodeId),

    #[error("invalid truck config: {0}")]
    Config(String),

    #[error("invalid cargo mass {0} t")]
    InvalidCargo(f64),
}

pub type TruckResult<T> = Result<T, TruckError>;
