use std::error::Error as StdError;

use thiserror::Error;

use crate::types::Coordinate;

/// Boxed error detail for failures whose concrete source type we don't
/// want to expose (e.g. shapefile parsing under a sector load).
pub type BoxError = Box<dyn StdError + Send + Sync + 'static>;

/// Geocoding failures (§ pipeline stage 1).
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// No provider match, or a response we could not make sense of.
    /// The two collapse deliberately: the caller reacts the same way.
    #[error("address not found: {address}")]
    AddressNotFound { address: String },

    #[error("address must not be empty")]
    EmptyAddress,

    #[error("geocoding request failed")]
    Request(#[source] reqwest::Error),
}

/// Sector resolution failures (stage 2).
#[derive(Debug, Error)]
pub enum SectorError {
    #[error("unknown state: {name}")]
    UnknownState { name: String },

    #[error("no census sector contains {coordinate}")]
    SectorNotFound { coordinate: Coordinate },

    #[error("failed to load sector polygons for state {state}")]
    Load {
        state: String,
        #[source]
        source: BoxError,
    },
}

/// Census webhook failures (stage 3).
#[derive(Debug, Error)]
pub enum CensusError {
    #[error("census request failed")]
    Request(#[source] reqwest::Error),

    #[error("census service returned status {status}")]
    Status { status: reqwest::StatusCode },

    #[error("census payload is not valid JSON")]
    Decode(#[source] reqwest::Error),

    #[error("unexpected census payload shape: {0}")]
    UnexpectedShape(String),
}

/// Feature schema violations (stages 4 and 5).
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A column the model expects is absent from the merged record.
    /// Never defaulted: a silently filled column would corrupt inference.
    #[error("schema column {name:?} missing from assembled record")]
    MissingColumn { name: String },

    #[error("model and schema artifacts disagree: {0}")]
    ArtifactMismatch(String),
}

/// Union of every stage failure, combined only at the pipeline boundary.
///
/// Internally each variant keeps its cause for logs and tests; externally
/// every failure surfaces as the same generic message, since the UI does
/// not distinguish a bad address from a service outage.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error(transparent)]
    Geocode(#[from] GeocodeError),

    #[error(transparent)]
    Sector(#[from] SectorError),

    #[error(transparent)]
    Census(#[from] CensusError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}

impl PipelineError {
    pub const USER_MESSAGE: &'static str = "Address not found, please check.";

    /// The single generic end-user message, regardless of cause.
    pub fn user_message(&self) -> &'static str {
        Self::USER_MESSAGE
    }

    /// Short stage tag for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::InvalidRequest(_) => "request",
            PipelineError::Geocode(_) => "geocode",
            PipelineError::Sector(_) => "sector",
            PipelineError::Census(_) => "census",
            PipelineError::Schema(_) => "schema",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_kind_shares_the_generic_message() {
        let errors: Vec<PipelineError> = vec![
            GeocodeError::AddressNotFound { address: "nowhere".into() }.into(),
            SectorError::UnknownState { name: "Atlantis".into() }.into(),
            CensusError::UnexpectedShape("not an object".into()).into(),
            SchemaError::MissingColumn { name: "BASICO_V011".into() }.into(),
        ];
        for err in errors {
            assert_eq!(err.user_message(), "Address not found, please check.");
        }
    }

    #[test]
    fn kinds_stay_distinct_for_diagnostics() {
        let err: PipelineError =
            SectorError::SectorNotFound { coordinate: Coordinate::new(0.0, 0.0) }.into();
        assert_eq!(err.kind(), "sector");
        assert!(err.to_string().contains("no census sector"));
    }
}
