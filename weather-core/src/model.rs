use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A point reported by the location service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// What a single request asks the provider for.
#[derive(Debug, Clone, PartialEq)]
pub enum LocationQuery {
    City(String),
    Coordinates(Coordinates),
}

impl std::fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LocationQuery::City(city) => write!(f, "city '{city}'"),
            LocationQuery::Coordinates(c) => write!(f, "({}, {})", c.latitude, c.longitude),
        }
    }
}

/// Current conditions returned by one successful provider query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    pub location: String,
    pub country: String,
    pub temperature_c: f64,
    pub condition: String,
    /// Provider icon code, e.g. `01d`.
    pub icon: String,
    pub humidity_pct: u8,
    pub wind_speed_mps: f64,
    pub observed_at: DateTime<Utc>,
}
