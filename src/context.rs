use std::path::Path;

use anyhow::{Context, Result};

use crate::census::CensusSource;
use crate::features::FeatureSchema;
use crate::geocode::Geocoder;
use crate::model::AcceptanceModel;
use crate::pipeline::Pipeline;
use crate::sector::SectorIndex;

/// Everything loaded once at startup: model, schema, and the sector
/// polygon index. Immutable, `Send + Sync`, passed into every pipeline
/// run instead of living in globals.
pub struct AppContext {
    pub model: AcceptanceModel,
    pub schema: FeatureSchema,
    pub sectors: SectorIndex,
}

impl AppContext {
    /// Load artifacts and verify they agree before the first request.
    pub fn load(model_path: &Path, schema_path: &Path, polygon_root: &Path) -> Result<Self> {
        let model = AcceptanceModel::load(model_path)?;
        let schema = FeatureSchema::load(schema_path)?;
        model
            .check_schema(&schema)
            .context("Model and feature schema artifacts do not agree")?;

        tracing::info!(
            features = schema.len(),
            polygon_root = %polygon_root.display(),
            "application context loaded"
        );

        Ok(Self { model, schema, sectors: SectorIndex::new(polygon_root) })
    }

    /// Wire a pipeline over this context and the given remote adapters.
    pub fn pipeline<'a>(
        &'a self,
        geocoder: &'a dyn Geocoder,
        census: &'a dyn CensusSource,
    ) -> Pipeline<'a> {
        Pipeline::new(geocoder, &self.sectors, census, &self.model, &self.schema)
    }
}
