use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Geographic coordinate in WGS84 (degrees).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub lat: f64,
    pub lon: f64,
}

impl Coordinate {
    pub fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Round both components to `places` decimal places.
    pub fn rounded(self, places: i32) -> Self {
        let scale = 10f64.powi(places);
        Self {
            lat: (self.lat * scale).round() / scale,
            lon: (self.lon * scale).round() / scale,
        }
    }

    /// Point in (x=lon, y=lat) order for geometric predicates.
    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lon, self.lat)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.5}, {:.5})", self.lat, self.lon)
    }
}

/// Two-letter lowercase federative-unit code, e.g. "sp", "df".
/// Only constructed from the fixed table in `sector::states`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StateCode(pub(crate) &'static str);

impl StateCode {
    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

impl fmt::Display for StateCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// Stable key for a census sector within a state.
/// Keeps the original code text (with leading zeros) without repeated owned Strings.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectorId(Arc<str>);

impl SectorId {
    pub fn new(id: &str) -> Self {
        Self(Arc::from(id.trim()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A single flattened census value.
///
/// `Missing` stands in both for nulls and for ambiguous multi-valued cells,
/// which are dropped to missing rather than truncated to one element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Number(f64),
    Text(String),
    Missing,
}

impl CellValue {
    /// Numeric view of the cell: numbers as-is, numeric-looking text parsed,
    /// anything else `None`.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) => Some(*n),
            CellValue::Text(s) => s.trim().parse().ok(),
            CellValue::Missing => None,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, CellValue::Missing)
    }
}

/// One entry of the top-feature ranking.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub name: Arc<str>,
    pub importance: f64,
}

/// Final model output for one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decision {
    /// `probability > 0.5`, strictly: exactly 0.5 is rejected.
    pub accepted: bool,
    /// Acceptance probability in [0, 1].
    pub probability: f64,
    /// At most five features, by descending rounded importance.
    pub top_features: Vec<FeatureImportance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coordinate_rounds_to_five_places() {
        let c = Coordinate::new(-23.561684321, -46.655981789).rounded(5);
        assert_eq!(c.lat, -23.56168);
        assert_eq!(c.lon, -46.65598);
    }

    #[test]
    fn point_is_lon_lat_order() {
        let p = Coordinate::new(-23.5, -46.6).to_point();
        assert_eq!(p.x(), -46.6);
        assert_eq!(p.y(), -23.5);
    }

    #[test]
    fn cell_value_numeric_view() {
        assert_eq!(CellValue::Number(1.5).as_f64(), Some(1.5));
        assert_eq!(CellValue::Text(" 42 ".into()).as_f64(), Some(42.0));
        assert_eq!(CellValue::Text("urban".into()).as_f64(), None);
        assert_eq!(CellValue::Missing.as_f64(), None);
    }

    #[test]
    fn sector_id_trims_padding() {
        assert_eq!(SectorId::new(" 355030885000091 ").as_str(), "355030885000091");
    }
}
