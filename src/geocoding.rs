use std::collections::BTreeMap;

use async_trait::async_trait;
use reqwest::header::USER_AGENT;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::{GeocodeResult, ReverseGeocodeResult};

pub const SEARCH_LIMIT: usize = 5;

/// Upstream failures are reported generically; the service gives no reliable
/// detail to pass on.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GeocodeError {
    #[error("Failed to search location")]
    Search,
    #[error("Failed to reverse geocode")]
    ReverseGeocode,
}

#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn search_location(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError>;
    async fn reverse_geocode(&self, lat: f64, lon: f64)
        -> Result<ReverseGeocodeResult, GeocodeError>;
}

#[derive(Debug, Deserialize)]
struct PlaceDoc {
    display_name: String,
    lat: Value,
    lon: Value,
    #[serde(rename = "type")]
    place_type: Option<String>,
    #[serde(default)]
    address: Option<BTreeMap<String, Value>>,
}

#[derive(Debug, Deserialize)]
struct ReverseDoc {
    display_name: Option<String>,
    #[serde(default)]
    address: Option<BTreeMap<String, Value>>,
    error: Option<String>,
}

/// Nominatim-style place search. One query per request, no caching.
#[derive(Clone, Debug)]
pub struct GeocodingClient {
    base_url: String,
    user_agent: String,
    client: Client,
}

impl GeocodingClient {
    pub fn new(base_url: impl Into<String>, user_agent: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            user_agent: user_agent.into(),
            client: Client::new(),
        }
    }

    async fn fetch(&self, url: Url) -> Result<String, String> {
        let response = self
            .client
            .get(url)
            .header(USER_AGENT, &self.user_agent)
            .send()
            .await
            .map_err(|err| err.to_string())?;
        let status = response.status();
        let text = response.text().await.map_err(|err| err.to_string())?;
        if !status.is_success() {
            return Err(format!("status {}: {}", status, text));
        }
        Ok(text)
    }
}

#[async_trait]
impl Geocoder for GeocodingClient {
    async fn search_location(&self, query: &str) -> Result<Vec<GeocodeResult>, GeocodeError> {
        let mut url = Url::parse(&format!("{}/search", self.base_url))
            .map_err(|_| GeocodeError::Search)?;
        url.query_pairs_mut()
            .append_pair("q", query)
            .append_pair("format", "json")
            .append_pair("limit", &SEARCH_LIMIT.to_string())
            .append_pair("addressdetails", "1");

        debug!(query, "searching location");
        let text = self.fetch(url).await.map_err(|err| {
            warn!(query, "location search failed: {err}");
            GeocodeError::Search
        })?;
        let docs: Vec<PlaceDoc> = serde_json::from_str(&text).map_err(|err| {
            warn!(query, "location search parse failed: {err}");
            GeocodeError::Search
        })?;

        Ok(docs
            .into_iter()
            .filter_map(into_result)
            .take(SEARCH_LIMIT)
            .collect())
    }

    async fn reverse_geocode(
        &self,
        lat: f64,
        lon: f64,
    ) -> Result<ReverseGeocodeResult, GeocodeError> {
        let mut url = Url::parse(&format!("{}/reverse", self.base_url))
            .map_err(|_| GeocodeError::ReverseGeocode)?;
        url.query_pairs_mut()
            .append_pair("lat", &lat.to_string())
            .append_pair("lon", &lon.to_string())
            .append_pair("format", "json");

        debug!(lat, lon, "reverse geocoding");
        let text = self.fetch(url).await.map_err(|err| {
            warn!(lat, lon, "reverse geocode failed: {err}");
            GeocodeError::ReverseGeocode
        })?;
        let doc: ReverseDoc = serde_json::from_str(&text).map_err(|err| {
            warn!(lat, lon, "reverse geocode parse failed: {err}");
            GeocodeError::ReverseGeocode
        })?;

        if let Some(err) = doc.error {
            warn!(lat, lon, "reverse geocode rejected: {err}");
            return Err(GeocodeError::ReverseGeocode);
        }
        let name = doc.display_name.ok_or(GeocodeError::ReverseGeocode)?;
        Ok(ReverseGeocodeResult {
            name,
            address: flatten_address(doc.address),
        })
    }
}

fn into_result(doc: PlaceDoc) -> Option<GeocodeResult> {
    let lat = coordinate(&doc.lat);
    let lon = coordinate(&doc.lon);
    let (Some(lat), Some(lon)) = (lat, lon) else {
        warn!(name = %doc.display_name, "dropping place with unusable coordinates");
        return None;
    };
    Some(GeocodeResult {
        name: doc.display_name,
        lat,
        lon,
        place_type: doc.place_type,
        address: flatten_address(doc.address),
    })
}

fn coordinate(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::String(s) => s.trim().parse::<f64>().ok(),
        Value::Number(n) => n.as_f64(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn flatten_address(address: Option<BTreeMap<String, Value>>) -> BTreeMap<String, String> {
    address
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s)),
            Value::Number(n) => Some((key, n.to_string())),
            _ => None,
        })
        .collect()
}
