//! Core library for the weather widget.
//!
//! This crate defines:
//! - The OpenWeather client behind the [`WeatherProvider`] trait
//! - Location services for the "use my location" flow
//! - The presentation panel and the two fetch flows
//! - Read-only configuration loading
//!
//! It is used by `weather-widget`, but the flows only depend on the
//! [`ui::Notifier`] and [`ui::Modal`] traits, so other front ends can reuse it.

pub mod config;
pub mod error;
pub mod geolocation;
pub mod model;
pub mod panel;
pub mod provider;
pub mod ui;
pub mod widget;

pub use config::Config;
pub use error::{FetchError, LocationError, WidgetError};
pub use geolocation::Geolocator;
pub use model::{Coordinates, LocationQuery, WeatherReading};
pub use panel::WeatherPanel;
pub use provider::WeatherProvider;
pub use widget::{FlowState, WeatherWidget, WidgetInputs};
