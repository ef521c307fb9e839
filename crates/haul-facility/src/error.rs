use haul_core::BuildingId;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum FacilityError {
    #[error("facility {facility} is full (capacity {capacity})")]
    Full { facility: BuildingId, capacity: u32 },

    #[error("no facility registered for building {0}")]
    Unknown(BuildingId),
}

pub type FacilityResult<T> = Result<T, FacilityError>;
