//! Regional road grid used by the convoy demo.
//!
//! A `SIDE × SIDE` lattice with 5 km spacing.  Rows alternate between
//! motorways (100 km/h) and country roads (70 km/h); columns are all country
//! roads.  Depots sit on the west edge, parkings on every third node, and gas
//! stations on a sparse diagonal.

use haul_core::{NodeId, Point};
use haul_spatial::{BuildingKind, RoadNetwork, RoadNetworkBuilder};

pub const SIDE: u32 = 8;

const SPACING_M:     f64 = 5_000.0;
const MOTORWAY_KPH:  f64 = 100.0;
const COUNTRY_KPH:   f64 = 70.0;

fn at(x: u32, y: u32) -> NodeId {
    NodeId(y * SIDE + x)
}

/// Build the grid.  Returns the network and its depot nodes.
pub fn build_network() -> anyhow::Result<(RoadNetwork, Vec<NodeId>)> {
    let mut b = RoadNetworkBuilder::with_capacity((SIDE * SIDE) as usize, (4 * SIDE * SIDE) as usize);

    for y in 0..SIDE {
        for x in 0..SIDE {
            b.add_node(Point::new(x as f64 * SPACING_M, y as f64 * SPACING_M));
        }
    }

    for y in 0..SIDE {
        let row_kph = if y % 2 == 0 { MOTORWAY_KPH } else { COUNTRY_KPH };
        for x in 0..SIDE {
            if x + 1 < SIDE {
                b.add_road(at(x, y), at(x + 1, y), SPACING_M, row_kph)?;
            }
            if y + 1 < SIDE {
                b.add_road(at(x, y), at(x, y + 1), SPACING_M, COUNTRY_KPH)?;
            }
        }
    }

    let mut depots = Vec::new();
    for y in (0..SIDE).step_by(2) {
        b.add_building(at(0, y), BuildingKind::Depot)?;
        depots.push(at(0, y));
    }
    for node in (0..SIDE * SIDE).filter(|n| n % 3 == 1).map(NodeId) {
        b.add_building(node, BuildingKind::Parking)?;
    }
    for i in (1..SIDE).step_by(3) {
        b.add_building(at(i, i), BuildingKind::GasStation)?;
        b.add_building(at(SIDE - 1 - i, i), BuildingKind::GasStation)?;
    }

    Ok((b.build(), depots))
}
