use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;

use crate::error::GeocodeError;
use crate::types::Coordinate;

/// Default search endpoint (Nominatim / OpenStreetMap).
pub const DEFAULT_GEOCODER_URL: &str = "https://nominatim.openstreetmap.org/search";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Geocoder output: coordinate plus the provider's normalized street name.
#[derive(Debug, Clone, PartialEq)]
pub struct Located {
    pub coordinate: Coordinate,
    pub street_name: String,
}

/// Free-text address to coordinate. The locality string disambiguates
/// among same-named streets across municipalities.
pub trait Geocoder: Send + Sync {
    fn geocode(&self, address: &str, locality: &str) -> Result<Located, GeocodeError>;
}

/// HTTP [`Geocoder`] against a Nominatim-style search endpoint.
pub struct NominatimGeocoder {
    client: Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct Place {
    lat: String,
    lon: String,
    display_name: String,
    #[serde(default)]
    address: Option<PlaceAddress>,
}

#[derive(Debug, Deserialize)]
struct PlaceAddress {
    #[serde(default)]
    road: Option<String>,
}

impl NominatimGeocoder {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_base_url(DEFAULT_GEOCODER_URL)
    }

    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("aprova/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url: base_url.to_string() })
    }

    fn not_found(address: &str, locality: &str) -> GeocodeError {
        GeocodeError::AddressNotFound { address: format!("{address}, {locality}") }
    }
}

impl Geocoder for NominatimGeocoder {
    fn geocode(&self, address: &str, locality: &str) -> Result<Located, GeocodeError> {
        if address.trim().is_empty() {
            return Err(GeocodeError::EmptyAddress);
        }

        let query = format!("{address}, {locality}");
        tracing::debug!(%query, "geocoding");

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("q", query.as_str()),
                ("format", "jsonv2"),
                ("limit", "1"),
                ("addressdetails", "1"),
            ])
            .send()
            .map_err(GeocodeError::Request)?
            .error_for_status()
            .map_err(GeocodeError::Request)?;

        // A malformed body counts as no match: either way the provider
        // gave us nothing usable for this address.
        let places: Vec<Place> = response
            .json()
            .map_err(|_| Self::not_found(address, locality))?;
        let place = places
            .into_iter()
            .next()
            .ok_or_else(|| Self::not_found(address, locality))?;

        let (lat, lon) = match (place.lat.parse::<f64>(), place.lon.parse::<f64>()) {
            (Ok(lat), Ok(lon)) => (lat, lon),
            _ => return Err(Self::not_found(address, locality)),
        };

        let street_name = place
            .address
            .and_then(|a| a.road)
            .unwrap_or_else(|| {
                place
                    .display_name
                    .split(',')
                    .next()
                    .unwrap_or(&place.display_name)
                    .to_string()
            });

        Ok(Located { coordinate: Coordinate::new(lat, lon), street_name })
    }
}
