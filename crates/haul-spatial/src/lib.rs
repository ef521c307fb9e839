//! `haul-spatial` — road graph, node criteria, and the search engine.
//!
//! # Crate layout
//!
//! | Module        | Contents                                                     |
//! |---------------|--------------------------------------------------------------|
//! | [`graph`]     | `GraphView` trait, `Edge`, `Building`, `BuildingKind`        |
//! | [`network`]   | `RoadNetwork` (CSR + R-tree), `RoadNetworkBuilder`           |
//! | [`route`]     | `Route` — node sequence consumed head-first                  |
//! | [`criteria`]  | `NodeCriteria` trait, building/edge-count/AND/OR criteria    |
//! | [`cache`]     | `SearchCache` — advisory memo of closest-match searches      |
//! | [`navigator`] | `Navigator` — A*, closest-match, waypoint-aware search       |
//! | [`error`]     | `SpatialError`, `SpatialResult<T>`                           |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                              |
//! |---------|-----------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on public types.  |

pub mod cache;
pub mod criteria;
pub mod error;
pub mod graph;
pub mod navigator;
pub mod network;
pub mod route;

mod search;

#[cfg(test)]
mod tests;

pub use cache::{CacheEntry, CachedSearch, SearchCache, SearchKey};
pub use criteria::{
    AndCriteria, BuildingTypeCriteria, CriteriaItem, EdgeCountCriteria, EdgeDirection,
    NodeCriteria, OrCriteria,
};
pub use error::{SpatialError, SpatialResult};
pub use graph::{Building, BuildingKind, Edge, GraphView};
pub use navigator::{Navigator, SearchHit};
pub use network::{RoadNetwork, RoadNetworkBuilder};
pub use route::Route;
