//! `haul-facility` — capacity-limited roadside facilities.
//!
//! | Module       | Contents                                         |
//! |--------------|--------------------------------------------------|
//! | [`facility`] | `Facility` — occupancy set with a hard capacity  |
//! | [`registry`] | `FacilityRegistry`, `FacilityDefaults`           |
//! | [`error`]    | `FacilityError` (`Full`, `Unknown`)              |

pub mod error;
pub mod facility;
pub mod registry;


pub use error::{FacilityError, FacilityResult};
pub use facility::Facility;
pub use registry::{FacilityDefaults, FacilityRegistry};
