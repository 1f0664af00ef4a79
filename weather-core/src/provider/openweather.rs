use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use crate::{
    config::ProviderSettings,
    error::FetchError,
    model::{LocationQuery, WeatherReading},
};

use super::WeatherProvider;

const CURRENT_WEATHER_PATH: &str = "data/2.5/weather";

/// Client for the OpenWeather "current weather" endpoint.
#[derive(Debug, Clone)]
pub struct OpenWeatherProvider {
    http: Client,
    endpoint: Url,
}

impl OpenWeatherProvider {
    pub fn new(settings: &ProviderSettings) -> Result<Self, FetchError> {
        Self::with_base_url(&settings.base_url, settings.timeout_secs)
    }

    /// Point the client at another host, e.g. a mock server in tests.
    pub fn with_base_url(base_url: &str, timeout_secs: u64) -> Result<Self, FetchError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(FetchError::Transport)?;

        let endpoint = format!("{}/{CURRENT_WEATHER_PATH}", base_url.trim_end_matches('/'));
        let endpoint = Url::parse(&endpoint)
            .map_err(|e| FetchError::InvalidEndpoint(format!("'{base_url}': {e}")))?;

        Ok(Self { http, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn fetch_current(
        &self,
        location_params: &[(&str, String)],
        api_key: &str,
    ) -> Result<WeatherReading, FetchError> {
        tracing::debug!(endpoint = %self.endpoint, ?location_params, "requesting current weather");

        let res = self
            .http
            .get(self.endpoint.clone())
            .query(location_params)
            .query(&[("appid", api_key), ("units", "metric")])
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        let status = res.status();
        let body = res
            .text()
            .await
            .map_err(|e| FetchError::Transport(e.without_url()))?;

        if !status.is_success() {
            return Err(FetchError::Status {
                status,
                body: truncate_body(&body),
            });
        }

        let parsed: OwCurrentResponse = serde_json::from_str(&body)?;
        Ok(parsed.into_reading())
    }
}

#[derive(Debug, Default, Deserialize)]
struct OwSys {
    #[serde(default)]
    country: String,
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
    humidity: u8,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
    icon: String,
}

#[derive(Debug, Deserialize)]
struct OwWind {
    speed: f64,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    #[serde(default)]
    name: String,
    #[serde(default)]
    dt: Option<i64>,
    // Readings over open sea come back with `"sys": {}` or no `sys` at all.
    #[serde(default)]
    sys: OwSys,
    main: OwMain,
    weather: Vec<OwWeather>,
    wind: OwWind,
}

impl OwCurrentResponse {
    fn into_reading(self) -> WeatherReading {
        let observed_at = self.dt.and_then(unix_to_utc).unwrap_or_else(Utc::now);

        let (condition, icon) = self
            .weather
            .into_iter()
            .next()
            .map(|w| (w.description, w.icon))
            .unwrap_or_else(|| ("Unknown".to_string(), String::new()));

        WeatherReading {
            location: self.name,
            country: self.sys.country,
            temperature_c: self.main.temp,
            condition,
            icon,
            humidity_pct: self.main.humidity,
            wind_speed_mps: self.wind.speed,
            observed_at,
        }
    }
}

#[async_trait]
impl WeatherProvider for OpenWeatherProvider {
    async fn current_weather(
        &self,
        query: &LocationQuery,
        api_key: &str,
    ) -> Result<WeatherReading, FetchError> {
        let params = match query {
            LocationQuery::City(city) => vec![("q", city.clone())],
            LocationQuery::Coordinates(c) => vec![
                ("lat", c.latitude.to_string()),
                ("lon", c.longitude.to_string()),
            ],
        };

        self.fetch_current(&params, api_key).await
    }
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::<Utc>::from_timestamp(ts, 0)
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
