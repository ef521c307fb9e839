//! `haul-sim` — sequential fleet runner.
//!
//! | Module       | Contents                                   |
//! |--------------|--------------------------------------------|
//! | [`fleet`]    | `Fleet` — tick loop over all trucks        |
//! | [`builder`]  | `FleetBuilder`                             |
//! | [`observer`] | `FleetObserver`, `NoopObserver`            |
//! | [`error`]    | `SimError`, `SimResult<T>`                 |

pub mod builder;
pub mod error;
pub mod fleet;
pub mod observer;


pub use builder::FleetBuilder;
pub use error::{SimError, SimResult};
pub use fleet::Fleet;
pub use observer::{FleetObserver, NoopObserver};
