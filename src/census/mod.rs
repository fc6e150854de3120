mod flatten;
mod webhook;

pub use flatten::{flat_cell, flatten_record, CensusRecord};
pub use webhook::{WebhookCensusSource, DEFAULT_CENSUS_URL};

use crate::error::CensusError;
use crate::types::SectorId;

/// Source of aggregate census statistics for one sector.
///
/// A single synchronous request per evaluation; no retry, no backoff.
/// Kept as a trait so tests can substitute a fixed payload.
pub trait CensusSource: Send + Sync {
    fn fetch(&self, sector: &SectorId) -> Result<serde_json::Value, CensusError>;
}
