//! World state lent to a truck for one `decide` call.

use haul_facility::FacilityRegistry;
use haul_spatial::{GraphView, Navigator};

/// Everything outside the truck that `decide` reads or touches.
///
/// The graph is read-only.  The navigator (for its search cache) and the
/// facility registry are borrowed mutably, so trucks sharing them are
/// evaluated one after another.
pub struct TickContext<'a> {
    pub graph: &'a dyn GraphView,
    pub navigator: &'a mut Navigator,
    pub facilities: &'a mut FacilityRegistry,
    /// Base price; a station's `cost_factor` scales it.
    pub fuel_price_per_l: f64,
}

impl<'a> TickContext<'a> {
    #[inline]
    pub fn new(
        graph:            &'a dyn GraphView,
        navigator:        &'a mut Navigator,
        facilities:       &'a mut FacilityRegistry,
        fuel_price_per_l: f64,
    ) -> Self {
        Self { graph, navigator, facilities, fuel_price_per_l }
    }
}
