//! Location services for the "use my location" flow.
//!
//! A [`Geolocator`] answers exactly one position request per call: it either
//! yields coordinates or fails. There is no stream of updates.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::{fmt::Debug, time::Duration};

use crate::{
    config::{Config, DEFAULT_TIMEOUT_SECS},
    error::LocationError,
    model::Coordinates,
};

#[async_trait]
pub trait Geolocator: Send + Sync + Debug {
    async fn current_position(&self) -> Result<Coordinates, LocationError>;
}

/// Always reports the same position, e.g. one given on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedGeolocator {
    position: Coordinates,
}

impl FixedGeolocator {
    pub fn new(position: Coordinates) -> Self {
        Self { position }
    }
}

#[async_trait]
impl Geolocator for FixedGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        Ok(self.position)
    }
}

/// Approximate position from the public IP address (ip-api.com style JSON).
#[derive(Debug, Clone)]
pub struct IpGeolocator {
    http: Client,
    url: String,
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: String,
    #[serde(default)]
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

impl IpGeolocator {
    pub fn new(url: &str, timeout_secs: u64) -> Result<Self, LocationError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| LocationError::Other(format!("failed to build lookup client: {e}")))?;

        Ok(Self {
            http,
            url: url.to_string(),
        })
    }
}

#[async_trait]
impl Geolocator for IpGeolocator {
    async fn current_position(&self) -> Result<Coordinates, LocationError> {
        let res = self.http.get(&self.url).send().await.map_err(|e| {
            if e.is_timeout() {
                LocationError::Timeout
            } else {
                tracing::debug!("IP location request failed: {e}");
                LocationError::Unavailable
            }
        })?;

        if !res.status().is_success() {
            tracing::debug!("IP location lookup returned status {}", res.status());
            return Err(LocationError::Unavailable);
        }

        let body: IpLookupResponse = res
            .json()
            .await
            .map_err(|e| LocationError::Other(format!("unreadable lookup response: {e}")))?;

        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => Ok(Coordinates::new(lat, lon)),
            _ => Err(LocationError::Other(
                body.message.unwrap_or_else(|| format!("lookup status '{}'", body.status)),
            )),
        }
    }
}

/// Pick the location service for this run.
///
/// Explicit coordinates win over the config file; without either, an IP
/// lookup is used unless disabled. `None` means geolocation is unsupported.
pub fn geolocator_from_config(
    explicit: Option<Coordinates>,
    config: &Config,
) -> Result<Option<Box<dyn Geolocator>>, LocationError> {
    if let Some(position) = explicit.or(config.location) {
        let fixed: Box<dyn Geolocator> = Box::new(FixedGeolocator::new(position));
        return Ok(Some(fixed));
    }

    if !config.geolocation.ip_lookup {
        return Ok(None);
    }

    let timeout = config.provider.timeout_secs.clamp(1, DEFAULT_TIMEOUT_SECS);
    let ip: Box<dyn Geolocator> =
        Box::new(IpGeolocator::new(&config.geolocation.ip_lookup_url, timeout)?);
    Ok(Some(ip))
}
