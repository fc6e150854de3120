#![doc = "Aprova public API"]
pub mod census;
pub mod cli;
pub mod commands;
mod common;
mod context;
mod error;
mod features;
mod geocode;
mod model;
mod pipeline;
pub mod sector;
mod types;

#[doc(inline)]
pub use context::AppContext;

#[doc(inline)]
pub use pipeline::{Evaluation, EvaluationRequest, Pipeline, LOAN_SIZE_RANGE};

pub use census::{flat_cell, flatten_record, CensusRecord, CensusSource, WebhookCensusSource};
pub use error::{CensusError, GeocodeError, PipelineError, SchemaError, SectorError};
pub use features::{assemble, FeatureSchema, FeatureVector};
pub use geocode::{Geocoder, Located, NominatimGeocoder};
pub use model::AcceptanceModel;
pub use sector::{SectorIndex, SectorPolygonSet, SectorProvider};
pub use types::{CellValue, Coordinate, Decision, FeatureImportance, SectorId, StateCode};
