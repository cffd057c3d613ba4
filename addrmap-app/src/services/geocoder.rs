//! Address geocoding
//!
//! [`Geocoder`] turns a composed address line into zero or more coordinate
//! candidates. An empty answer is not an error here; the registration
//! workflow decides what "no match" means for the user.
//!
//! [`NominatimGeocoder`] talks to an OpenStreetMap Nominatim instance and
//! spaces its requests to respect the service's usage policy.

use addrmap_common::config::GeocoderConfig;
use addrmap_common::Coordinate;
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Geocoding errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GeocodeError {
    /// The address resolved to zero candidates
    #[error("Address not found: {0}")]
    NoMatch(String),

    /// Transport or backend failure
    #[error("Geocoding service failure: {0}")]
    ServiceFailure(String),
}

/// Address resolution service
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Resolve `address_line` to candidates, best match first
    async fn geocode(&self, address_line: &str) -> Result<Vec<Coordinate>, GeocodeError>;
}

/// One entry of a Nominatim `/search` response
///
/// Nominatim sends coordinates as decimal strings.
#[derive(Debug, Clone, Deserialize)]
pub struct NominatimPlace {
    pub lat: String,
    pub lon: String,
    #[serde(default)]
    pub display_name: Option<String>,
}

/// Unkeyed limiter shared by all calls on one geocoder
type DirectRateLimiter = governor::RateLimiter<
    governor::state::NotKeyed,
    governor::state::InMemoryState,
    governor::clock::DefaultClock,
>;

/// Limiter allowing one request per `min_interval_ms`; `None` when zero
fn request_limiter(min_interval_ms: u64) -> Option<DirectRateLimiter> {
    governor::Quota::with_period(Duration::from_millis(min_interval_ms))
        .map(governor::RateLimiter::direct)
}

/// Nominatim geocoding client
pub struct NominatimGeocoder {
    http_client: reqwest::Client,
    rate_limiter: Option<DirectRateLimiter>,
    base_url: String,
    max_candidates: u32,
}

impl NominatimGeocoder {
    pub fn new(config: &GeocoderConfig) -> Result<Self, GeocodeError> {
        let http_client = reqwest::Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeocodeError::ServiceFailure(e.to_string()))?;

        Ok(Self {
            http_client,
            rate_limiter: request_limiter(config.rate_limit_ms),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            max_candidates: config.max_candidates.max(1),
        })
    }
}

#[async_trait]
impl Geocoder for NominatimGeocoder {
    async fn geocode(&self, address_line: &str) -> Result<Vec<Coordinate>, GeocodeError> {
        if let Some(limiter) = &self.rate_limiter {
            limiter.until_ready().await;
        }

        let url = format!("{}/search", self.base_url);
        let limit = self.max_candidates.to_string();

        tracing::debug!(address = %address_line, url = %url, "Querying geocoder");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("q", address_line),
                ("format", "json"),
                ("limit", limit.as_str()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::ServiceFailure(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(GeocodeError::ServiceFailure(format!(
                "HTTP {}: {}",
                status.as_u16(),
                error_text
            )));
        }

        let places: Vec<NominatimPlace> = response
            .json()
            .await
            .map_err(|e| GeocodeError::ServiceFailure(format!("Invalid response: {}", e)))?;

        let candidates = parse_candidates(&places)?;

        tracing::info!(
            address = %address_line,
            candidates = candidates.len(),
            best = %places.first().and_then(|p| p.display_name.as_deref()).unwrap_or("-"),
            "Geocoded address"
        );

        Ok(candidates)
    }
}

/// Convert Nominatim places to validated coordinates, keeping order
pub fn parse_candidates(places: &[NominatimPlace]) -> Result<Vec<Coordinate>, GeocodeError> {
    places
        .iter()
        .map(|place| {
            let latitude: f64 = place.lat.trim().parse().map_err(|_| {
                GeocodeError::ServiceFailure(format!("Bad latitude {:?}", place.lat))
            })?;
            let longitude: f64 = place.lon.trim().parse().map_err(|_| {
                GeocodeError::ServiceFailure(format!("Bad longitude {:?}", place.lon))
            })?;
            Coordinate::new(latitude, longitude)
                .map_err(|e| GeocodeError::ServiceFailure(e.to_string()))
        })
        .collect()
}
