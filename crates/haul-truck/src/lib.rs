//! `haul-truck` — the truck decision engine.
//!
//! A [`Truck`] is advanced one tick at a time by [`Truck::decide`], which
//! borrows the world through a [`TickContext`]: the read-only graph, the
//! [`Navigator`][haul_spatial::Navigator] with its search cache, and the
//! facility registry.
//!
//! | Module         | Contents                                              |
//! |----------------|-------------------------------------------------------|
//! | [`truck`]      | `Truck` — spawn, `decide`, cargo, external commands   |
//! | [`position`]   | `Position` — `AtNode` or `OnEdge`                     |
//! | [`diversion`]  | `Diversion` — parking, rest, fuel, stranded states    |
//! | [`tachograph`] | `TachographState`, search ramp, rest length, penalty  |
//! | [`fuel`]       | `FuelState`, consumption, fuel search ramp            |
//! | [`event`]      | `TruckEvent`                                          |
//! | [`report`]     | `WatchState`, `TruckPayload`, diff reporting          |
//! | [`context`]    | `TickContext`                                         |
//! | [`config`]     | `TruckConfig`                                         |
//! | [`error`]      | `TruckError`, `TruckResult<T>`                        |

pub mod config;
pub mod context;
pub mod diversion;
pub mod error;
pub mod event;
pub mod fuel;
pub mod position;
pub mod report;
pub mod tachograph;
pub mod truck;


pub use config::TruckConfig;
pub use context::TickContext;
pub use diversion::Diversion;
pub use error::{TruckError, TruckResult};
pub use event::TruckEvent;
pub use fuel::FuelState;
pub use position::Position;
pub use report::{TruckPayload, WatchState};
pub use tachograph::{TachographState, MAX_DRIVING_S};
pub use truck::Truck;
