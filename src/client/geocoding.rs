use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Deserializer};
use url::Url;

use super::ClientError;

pub const DEFAULT_NOMINATIM_URL: &str = "https://nominatim.openstreetmap.org/";
const SEARCH_LIMIT: u8 = 3;
// Nominatim rejects requests without an identifying User-Agent
const USER_AGENT: &str = concat!("orphanages/", env!("CARGO_PKG_VERSION"));

/// One candidate returned by a geocoding search.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AddressMatch {
    pub place_id: u64,
    #[serde(deserialize_with = "number_or_string")]
    pub lat: f64,
    #[serde(deserialize_with = "number_or_string")]
    pub lon: f64,
    pub display_name: String,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolves free text into candidate matches, best first.
    async fn search(&self, query: &str) -> Result<Vec<AddressMatch>, ClientError>;
}

/// Geocoder backed by an OpenStreetMap Nominatim instance.
#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    http: Client,
    base_url: Url,
}

impl NominatimGeocoder {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        let http = Client::builder().user_agent(USER_AGENT).build()?;
        Ok(Self {
            http,
            base_url: with_trailing_slash(base_url)?,
        })
    }

    /// The public OpenStreetMap instance.
    pub fn public() -> Result<Self, ClientError> {
        Self::new(DEFAULT_NOMINATIM_URL)
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn search(&self, query: &str) -> Result<Vec<AddressMatch>, ClientError> {
        let url = self.base_url.join("search")?;
        let limit = SEARCH_LIMIT.to_string();
        tracing::debug!(%url, query, "Geocoding address");

        let matches = self
            .http
            .get(url)
            .query(&[("format", "json"), ("limit", limit.as_str()), ("q", query)])
            .send()
            .await?
            .error_for_status()?
            .json::<Vec<AddressMatch>>()
            .await?;
        Ok(matches)
    }
}

pub(crate) fn with_trailing_slash(raw: &str) -> Result<Url, url::ParseError> {
    if raw.ends_with('/') {
        Url::parse(raw)
    } else {
        Url::parse(&format!("{}/", raw))
    }
}

// Nominatim sends coordinates as JSON strings
fn number_or_string<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(n),
        NumberOrString::Text(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
