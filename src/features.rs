use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::sync::Arc;

use ahash::AHashMap;
use anyhow::{Context, Result};

use crate::census::CensusRecord;
use crate::error::SchemaError;
use crate::types::{CellValue, Coordinate};

/// Ordered column contract the trained model expects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeatureSchema {
    names: Vec<Arc<str>>,
}

impl FeatureSchema {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self { names: names.into_iter().map(|s| Arc::from(s.as_ref())).collect() }
    }

    /// Load from a JSON array of column names.
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("Failed to open feature schema: {}", path.display()))?;
        let names: Vec<String> = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("Invalid feature schema: {}", path.display()))?;
        Ok(Self::new(names))
    }

    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.names.iter()
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Record projected into exact schema order, ready for inference.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    columns: Vec<(Arc<str>, CellValue)>,
}

impl FeatureVector {
    pub fn names(&self) -> impl Iterator<Item = &Arc<str>> {
        self.columns.iter().map(|(n, _)| n)
    }

    pub fn values(&self) -> impl Iterator<Item = &CellValue> {
        self.columns.iter().map(|(_, v)| v)
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Merge coordinate, loan size, and census fields, then project strictly
/// in schema order.
///
/// The coordinate is rounded to five decimal places before assembly, the
/// precision the rest of the system works at. The coordinate and loan
/// fields win over census fields of the same name. A schema name missing
/// from the merged record is an error, never a default.
pub fn assemble(
    coordinate: Coordinate,
    loan_size: f64,
    census: &CensusRecord,
    schema: &FeatureSchema,
) -> Result<FeatureVector, SchemaError> {
    let rounded = coordinate.rounded(5);
    let lat = CellValue::Number(rounded.lat);
    let long = CellValue::Number(rounded.lon);
    let loan = CellValue::Number(loan_size);

    let mut merged: AHashMap<&str, &CellValue> = AHashMap::with_capacity(census.len() + 3);
    for (name, value) in census.iter() {
        merged.insert(name, value);
    }
    merged.insert("lat", &lat);
    merged.insert("long", &long);
    merged.insert("loan_size", &loan);

    let mut columns = Vec::with_capacity(schema.len());
    for name in schema.names() {
        let value = merged
            .get(name.as_ref())
            .copied()
            .cloned()
            .ok_or_else(|| SchemaError::MissingColumn { name: name.to_string() })?;
        columns.push((Arc::clone(name), value));
    }

    Ok(FeatureVector { columns })
}
