use haul_core::HaulError;
use haul_truck::TruckError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error(transparent)]
    Core(#[from] HaulError),

    #[error("truck {index}: {source}")]
    Truck {
        index:  usize,
        #[source]
        source: TruckError,
    },

    #[error("fleet configuration error: {0}")]
    Config(String),
}

pub type SimResult<T> = Result<T, SimError>;
