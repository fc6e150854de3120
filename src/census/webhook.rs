use std::time::Duration;

use reqwest::blocking::Client;
use serde_json::Value;

use super::CensusSource;
use crate::error::CensusError;
use crate::types::SectorId;

/// Webhook serving aggregate IBGE census statistics per sector.
pub const DEFAULT_CENSUS_URL: &str = "https://webhooks.mongodb-stitch.com/api/client/v2.0/app/getinfocensus-fzwgb/service/getCensusInfo/incoming_webhook/webhook0?";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP implementation of [`CensusSource`] against the census webhook.
pub struct WebhookCensusSource {
    client: Client,
    base_url: String,
}

impl WebhookCensusSource {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_base_url(DEFAULT_CENSUS_URL)
    }

    /// Point at a different endpoint (tests, self-hosted mirrors).
    /// The sector parameter is appended to `base_url` as-is, so the URL
    /// should end in `?` or `&`.
    pub fn with_base_url(base_url: &str) -> anyhow::Result<Self> {
        let client = Client::builder()
            .user_agent(concat!("aprova/", env!("CARGO_PKG_VERSION")))
            .timeout(REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, base_url: base_url.to_string() })
    }
}

impl CensusSource for WebhookCensusSource {
    fn fetch(&self, sector: &SectorId) -> Result<Value, CensusError> {
        let url = format!("{}sector={}", self.base_url, sector);
        tracing::debug!(%url, "fetching census statistics");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(CensusError::Request)?;

        let status = response.status();
        if !status.is_success() {
            return Err(CensusError::Status { status });
        }

        response.json().map_err(CensusError::Decode)
    }
}
