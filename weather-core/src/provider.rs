use crate::{
    config::ProviderSettings,
    error::FetchError,
    model::{LocationQuery, WeatherReading},
    provider::openweather::OpenWeatherProvider,
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod openweather;

/// Source of current weather readings.
///
/// The API key is passed per call: it lives in the widget's form, not in the
/// client.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    async fn current_weather(
        &self,
        query: &LocationQuery,
        api_key: &str,
    ) -> Result<WeatherReading, FetchError>;
}

/// Construct the provider from settings.
pub fn provider_from_settings(
    settings: &ProviderSettings,
) -> Result<Box<dyn WeatherProvider>, FetchError> {
    let boxed: Box<dyn WeatherProvider> = Box::new(OpenWeatherProvider::new(settings)?);
    Ok(boxed)
}
