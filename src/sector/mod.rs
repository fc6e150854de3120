//! Coordinate → census-sector resolution against per-state shapefiles.

mod index;
mod polygons;
mod states;

pub use index::{SectorIndex, SectorProvider};
pub use polygons::SectorPolygonSet;
pub use states::{state_code_to_name, state_name_to_code};
