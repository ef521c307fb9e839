//! `haul-core` — foundational types shared by every `haul-*` crate.
//!
//! No `haul-*` dependencies; external ones are limited to `rand` and
//! `thiserror`, plus optional `serde`.
//!
//! | Module    | Contents                                            |
//! |-----------|-----------------------------------------------------|
//! | [`ids`]   | `AgentId`, `NodeId`, `EdgeId`, `BuildingId`         |
//! | [`geo`]   | `Point` (planar metres), Euclidean distance         |
//! | [`time`]  | `Tick`, `SimClock`, `SimConfig`                     |
//! | [`rng`]   | `AgentRng` (per-agent), `SimRng` (global)           |
//! | [`error`] | `HaulError`, `HaulResult`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types. |

pub mod error;
pub mod geo;
pub mod ids;
pub mod rng;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{HaulError, HaulResult};
pub use geo::Point;
pub use ids::{AgentId, BuildingId, EdgeId, NodeId};
pub use rng::{AgentRng, SimRng};
pub use time::{SimClock, SimConfig, Tick};
