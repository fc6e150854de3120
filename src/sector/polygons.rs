use std::path::Path;

use anyhow::{bail, Context, Result};
use geo::{BoundingRect, Contains};
use rstar::{RTree, RTreeObject, AABB};
use shapefile::dbase::{FieldValue, Record};
use shapefile::{Polygon, PolygonRing, Shape};

use crate::error::SectorError;
use crate::types::{Coordinate, SectorId};

/// Attribute fields that may carry the sector code, by dataset vintage.
const SECTOR_CODE_FIELDS: &[&str] = &["CD_GEOCODI", "CD_SETOR", "CD_GEOCOD"];

/// One census sector: identifier plus boundary.
#[derive(Debug, Clone)]
struct SectorShape {
    id: SectorId,
    boundary: geo::MultiPolygon<f64>,
}

/// Bounding-box entry pointing back into the sector vector.
struct TreeEntry {
    bbox: AABB<[f64; 2]>,
    idx: usize,
}

impl RTreeObject for TreeEntry {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.bbox
    }
}

/// All census-sector boundaries for one state, read-only after load.
///
/// An R-tree over bounding boxes narrows each lookup to a handful of
/// candidates before the exact point-in-polygon test.
pub struct SectorPolygonSet {
    sectors: Vec<SectorShape>,
    tree: RTree<TreeEntry>,
}

impl SectorPolygonSet {
    /// Build from in-memory boundaries. Load order is preserved and acts
    /// as the tie-break order when polygons overlap.
    pub fn from_parts(parts: Vec<(SectorId, geo::MultiPolygon<f64>)>) -> Self {
        let sectors: Vec<SectorShape> = parts
            .into_iter()
            .map(|(id, boundary)| SectorShape { id, boundary })
            .collect();

        let entries = sectors
            .iter()
            .enumerate()
            .filter_map(|(idx, sector)| {
                let rect = sector.boundary.bounding_rect()?;
                Some(TreeEntry {
                    bbox: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                    idx,
                })
            })
            .collect();

        Self { sectors, tree: RTree::bulk_load(entries) }
    }

    /// Load every sector polygon and code from a `.shp` file.
    pub fn from_shapefile(path: &Path) -> Result<Self> {
        let mut reader = shapefile::Reader::from_path(path)
            .with_context(|| format!("Failed to open shapefile: {}", path.display()))?;

        let mut parts = Vec::new();
        for result in reader.iter_shapes_and_records() {
            let (shape, record) = result.context("Error reading shape+record")?;
            let id = sector_code(&record)
                .with_context(|| format!("Record without sector code in {}", path.display()))?;
            match shape {
                Shape::Polygon(polygon) => parts.push((id, rings_to_multipolygon(&polygon))),
                Shape::NullShape => continue,
                _ => bail!("Unexpected non-polygon shape for sector {}", id),
            }
        }

        tracing::debug!(path = %path.display(), sectors = parts.len(), "loaded sector polygons");
        Ok(Self::from_parts(parts))
    }

    /// Identifier of the sector containing `coordinate`.
    ///
    /// Exactly one match is expected from a non-overlapping tessellation;
    /// several matches are a data-integrity condition that is logged and
    /// resolved by taking the first in load order. Boundary-exact points
    /// follow the interior-only containment of the underlying predicate.
    pub fn resolve(&self, coordinate: Coordinate) -> Result<SectorId, SectorError> {
        let point = coordinate.to_point();
        let probe = AABB::from_point([point.x(), point.y()]);

        let mut hits: Vec<usize> = self
            .tree
            .locate_in_envelope_intersecting(&probe)
            .filter(|entry| self.sectors[entry.idx].boundary.contains(&point))
            .map(|entry| entry.idx)
            .collect();
        hits.sort_unstable(); // R-tree iteration order is arbitrary

        match hits.as_slice() {
            [] => Err(SectorError::SectorNotFound { coordinate }),
            [idx] => Ok(self.sectors[*idx].id.clone()),
            [first, ..] => {
                tracing::warn!(
                    matches = hits.len(),
                    sector = %self.sectors[*first].id,
                    %coordinate,
                    "overlapping sector polygons, using first in load order"
                );
                Ok(self.sectors[*first].id.clone())
            }
        }
    }

    pub fn len(&self) -> usize {
        self.sectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sectors.is_empty()
    }
}

/// Pull the sector code out of a dbase record, trying known field names.
fn sector_code(record: &Record) -> Result<SectorId> {
    for field in SECTOR_CODE_FIELDS {
        match record.get(field) {
            Some(FieldValue::Character(Some(s))) => return Ok(SectorId::new(s)),
            Some(FieldValue::Numeric(Some(n))) => return Ok(SectorId::new(&format!("{:.0}", n))),
            _ => continue,
        }
    }
    bail!("none of {:?} present", SECTOR_CODE_FIELDS)
}

/// Convert shapefile rings to a `geo::MultiPolygon`, grouping each outer
/// ring with the inner rings that follow it (shapefile ring order).
fn rings_to_multipolygon(polygon: &Polygon) -> geo::MultiPolygon<f64> {
    fn closed_line(points: &[shapefile::Point]) -> geo::LineString<f64> {
        let mut coords: Vec<geo::Coord<f64>> =
            points.iter().map(|p| geo::Coord { x: p.x, y: p.y }).collect();
        if let (Some(first), Some(last)) = (coords.first().copied(), coords.last()) {
            if first != *last {
                coords.push(first);
            }
        }
        geo::LineString(coords)
    }

    let mut polys: Vec<geo::Polygon<f64>> = Vec::new();
    let mut exterior: Option<geo::LineString<f64>> = None;
    let mut holes: Vec<geo::LineString<f64>> = Vec::new();

    for ring in polygon.rings() {
        match ring {
            PolygonRing::Outer(points) => {
                if let Some(ext) = exterior.take() {
                    polys.push(geo::Polygon::new(ext, std::mem::take(&mut holes)));
                }
                exterior = Some(closed_line(points));
            }
            PolygonRing::Inner(points) => {
                if exterior.is_some() {
                    holes.push(closed_line(points));
                } else {
                    // Hole before any outer ring: malformed, skip it.
                    tracing::debug!("dropping orphan inner ring");
                }
            }
        }
    }
    if let Some(ext) = exterior {
        polys.push(geo::Polygon::new(ext, holes));
    }

    geo::MultiPolygon(polys)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square(x0: f64, y0: f64, size: f64) -> geo::MultiPolygon<f64> {
        geo::MultiPolygon(vec![geo::Polygon::new(
            geo::LineString(vec![
                geo::Coord { x: x0, y: y0 },
                geo::Coord { x: x0 + size, y: y0 },
                geo::Coord { x: x0 + size, y: y0 + size },
                geo::Coord { x: x0, y: y0 + size },
                geo::Coord { x: x0, y: y0 },
            ]),
            vec![],
        )])
    }

    fn two_square_set() -> SectorPolygonSet {
        SectorPolygonSet::from_parts(vec![
            (SectorId::new("355030800000001"), square(-47.0, -24.0, 1.0)),
            (SectorId::new("355030800000002"), square(-46.0, -24.0, 1.0)),
        ])
    }

    #[test]
    fn point_inside_polygon_resolves_to_its_id() {
        let set = two_square_set();
        let id = set.resolve(Coordinate::new(-23.5, -46.5)).unwrap();
        assert_eq!(id.as_str(), "355030800000001");

        let id = set.resolve(Coordinate::new(-23.5, -45.5)).unwrap();
        assert_eq!(id.as_str(), "355030800000002");
    }

    #[test]
    fn point_outside_all_polygons_fails() {
        let set = two_square_set();
        let err = set.resolve(Coordinate::new(10.0, 10.0)).unwrap_err();
        assert!(matches!(err, SectorError::SectorNotFound { .. }));
    }

    #[test]
    fn overlapping_polygons_take_first_in_load_order() {
        let set = SectorPolygonSet::from_parts(vec![
            (SectorId::new("b-loaded-first"), square(0.0, 0.0, 2.0)),
            (SectorId::new("a-loaded-second"), square(0.0, 0.0, 2.0)),
        ]);
        let id = set.resolve(Coordinate::new(1.0, 1.0)).unwrap();
        assert_eq!(id.as_str(), "b-loaded-first");
    }

    #[test]
    fn holes_are_excluded_from_containment() {
        let outer = geo::LineString(vec![
            geo::Coord { x: 0.0, y: 0.0 },
            geo::Coord { x: 4.0, y: 0.0 },
            geo::Coord { x: 4.0, y: 4.0 },
            geo::Coord { x: 0.0, y: 4.0 },
            geo::Coord { x: 0.0, y: 0.0 },
        ]);
        let hole = geo::LineString(vec![
            geo::Coord { x: 1.0, y: 1.0 },
            geo::Coord { x: 3.0, y: 1.0 },
            geo::Coord { x: 3.0, y: 3.0 },
            geo::Coord { x: 1.0, y: 3.0 },
            geo::Coord { x: 1.0, y: 1.0 },
        ]);
        let donut = geo::MultiPolygon(vec![geo::Polygon::new(outer, vec![hole])]);
        let set = SectorPolygonSet::from_parts(vec![(SectorId::new("donut"), donut)]);

        assert!(set.resolve(Coordinate::new(0.5, 0.5)).is_ok());
        assert!(matches!(
            set.resolve(Coordinate::new(2.0, 2.0)),
            Err(SectorError::SectorNotFound { .. })
        ));
    }
}
