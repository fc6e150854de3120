use std::ops::RangeInclusive;

use crate::census::{flatten_record, CensusSource};
use crate::error::{PipelineError, SectorError};
use crate::features::{assemble, FeatureSchema};
use crate::geocode::Geocoder;
use crate::model::AcceptanceModel;
use crate::sector::{state_name_to_code, SectorProvider};
use crate::types::{Coordinate, Decision, SectorId};

/// Accepted loan sizes, matching the request form.
pub const LOAN_SIZE_RANGE: RangeInclusive<f64> = 5_000.0..=200_000.0;

/// One user-triggered evaluation request.
#[derive(Debug, Clone, PartialEq)]
pub struct EvaluationRequest {
    pub loan_size: f64,
    pub address: String,
    pub municipality: String,
    /// State / metropolitan region name; also selects the polygon set.
    pub region: String,
}

/// Everything the caller renders after a successful run.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub street_name: String,
    pub coordinate: Coordinate,
    pub sector: SectorId,
    pub decision: Decision,
}

/// The linear evaluation pipeline:
/// geocode → sector resolve → census fetch → assemble → predict.
///
/// Strictly synchronous, one request at a time; the only blocking points
/// are the two HTTP calls, each behind its adapter's timeout. Every stage
/// failure keeps its typed kind for logging while the boundary reports
/// one generic message to the user.
pub struct Pipeline<'a> {
    geocoder: &'a dyn Geocoder,
    sectors: &'a dyn SectorProvider,
    census: &'a dyn CensusSource,
    model: &'a AcceptanceModel,
    schema: &'a FeatureSchema,
}

impl<'a> Pipeline<'a> {
    pub fn new(
        geocoder: &'a dyn Geocoder,
        sectors: &'a dyn SectorProvider,
        census: &'a dyn CensusSource,
        model: &'a AcceptanceModel,
        schema: &'a FeatureSchema,
    ) -> Self {
        Self { geocoder, sectors, census, model, schema }
    }

    pub fn run(&self, request: &EvaluationRequest) -> Result<Evaluation, PipelineError> {
        if !LOAN_SIZE_RANGE.contains(&request.loan_size) {
            return Err(PipelineError::InvalidRequest(format!(
                "loan size {} outside {:?}",
                request.loan_size, LOAN_SIZE_RANGE
            )));
        }

        tracing::info!(address = %request.address, "geocoding address");
        let locality = format!("{}, {}", request.municipality, request.region);
        let located = self.geocoder.geocode(&request.address, &locality)?;
        tracing::info!(coordinate = %located.coordinate, street = %located.street_name, "geocoded");

        let state = state_name_to_code(&request.region).ok_or_else(|| {
            SectorError::UnknownState { name: request.region.clone() }
        })?;
        let polygons = self.sectors.sectors_for(state)?;
        let sector = polygons.resolve(located.coordinate)?;
        tracing::info!(%sector, %state, "resolved census sector");

        let payload = self.census.fetch(&sector)?;
        let record = flatten_record(&payload)?;
        tracing::info!(fields = record.len(), "fetched census statistics");

        let vector = assemble(located.coordinate, request.loan_size, &record, self.schema)?;
        let decision = self.model.predict(&vector)?;
        tracing::info!(
            accepted = decision.accepted,
            probability = decision.probability,
            "decision made"
        );

        Ok(Evaluation {
            street_name: located.street_name,
            coordinate: located.coordinate,
            sector,
            decision,
        })
    }
}
