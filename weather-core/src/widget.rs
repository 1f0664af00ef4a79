//! The widget: form inputs, the two fetch flows and the rendered panel.
//!
//! Fetching and rendering are separate steps. [`WeatherWidget::lookup`]
//! returns a reading or a typed error and touches nothing; the flows
//! ([`WeatherWidget::fetch_weather`], [`WeatherWidget::fetch_weather_by_location`])
//! add the user-facing side: exactly one alert on failure, or a render plus
//! dismissing the info dialog on success.

use crate::{
    error::{FetchError, WidgetError},
    geolocation::Geolocator,
    model::{LocationQuery, WeatherReading},
    panel::WeatherPanel,
    provider::WeatherProvider,
    ui::{Modal, Notifier},
};

pub const MSG_MISSING_CITY_OR_KEY: &str = "Please enter both the city name and API key.";
pub const MSG_MISSING_KEY: &str = "Please enter an API key.";
pub const MSG_CITY_NOT_FOUND: &str = "City not found or invalid API key.";
pub const MSG_FETCH_FAILED: &str = "An error occurred while fetching the weather data.";
pub const MSG_GEOLOCATION_UNSUPPORTED: &str = "Geolocation is not supported on this device.";
pub const MSG_LOCATION_DENIED: &str =
    "Unable to retrieve your location. Please allow location access.";
pub const MSG_LOCATION_WEATHER_FAILED: &str = "Unable to retrieve weather data for your location.";

/// Text typed into the form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetInputs {
    pub api_key: String,
    pub city: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FlowState {
    #[default]
    Idle,
    AwaitingResponse,
    Done,
}

pub struct WeatherWidget<N, M> {
    provider: Box<dyn WeatherProvider>,
    geolocator: Option<Box<dyn Geolocator>>,
    inputs: WidgetInputs,
    panel: WeatherPanel,
    reading: Option<WeatherReading>,
    notifier: N,
    modal: M,
    state: FlowState,
}

impl<N: Notifier, M: Modal> WeatherWidget<N, M> {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        geolocator: Option<Box<dyn Geolocator>>,
        panel: WeatherPanel,
        notifier: N,
        modal: M,
    ) -> Self {
        Self {
            provider,
            geolocator,
            inputs: WidgetInputs::default(),
            panel,
            reading: None,
            notifier,
            modal,
            state: FlowState::Idle,
        }
    }

    /// Show the info dialog, as on page load.
    pub fn open(&mut self) {
        self.modal.show();
    }

    pub fn inputs(&self) -> &WidgetInputs {
        &self.inputs
    }

    pub fn inputs_mut(&mut self) -> &mut WidgetInputs {
        &mut self.inputs
    }

    pub fn panel(&self) -> &WeatherPanel {
        &self.panel
    }

    /// Reading currently on display, from the latest successful fetch.
    pub fn reading(&self) -> Option<&WeatherReading> {
        self.reading.as_ref()
    }

    pub fn state(&self) -> FlowState {
        self.state
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn modal(&self) -> &M {
        &self.modal
    }

    /// Fetch without any UI side effects.
    pub async fn lookup(&self, query: &LocationQuery) -> Result<WeatherReading, WidgetError> {
        let (query, api_key) = self.validate(query)?;
        Ok(self.provider.current_weather(&query, &api_key).await?)
    }

    /// "Get weather" button: fetch by the city typed into the form.
    pub async fn fetch_weather(&mut self) -> Result<(), WidgetError> {
        let requested = LocationQuery::City(self.inputs.city.clone());
        let (query, api_key) = match self.validate(&requested) {
            Ok(valid) => valid,
            Err(err) => {
                self.state = FlowState::Idle;
                self.notifier.alert(MSG_MISSING_CITY_OR_KEY);
                return Err(err);
            }
        };

        self.state = FlowState::AwaitingResponse;
        match self.provider.current_weather(&query, &api_key).await {
            Ok(reading) => {
                self.display(reading);
                Ok(())
            }
            Err(err) => {
                self.state = FlowState::Idle;
                tracing::error!("Error fetching weather data for {query}: {err}");
                let message = match err {
                    FetchError::Status { .. } => MSG_CITY_NOT_FOUND,
                    _ => MSG_FETCH_FAILED,
                };
                self.notifier.alert(message);
                Err(err.into())
            }
        }
    }

    /// "Use my location" button: one position fix, then fetch by coordinates.
    pub async fn fetch_weather_by_location(&mut self) -> Result<(), WidgetError> {
        let Some(geolocator) = self.geolocator.as_ref() else {
            self.state = FlowState::Idle;
            self.notifier.alert(MSG_GEOLOCATION_UNSUPPORTED);
            return Err(WidgetError::GeolocationUnsupported);
        };

        let fix = geolocator.current_position().await;
        let position = match fix {
            Ok(position) => position,
            Err(err) => {
                tracing::warn!("Unable to retrieve location: {err}");
                self.state = FlowState::Idle;
                self.notifier.alert(MSG_LOCATION_DENIED);
                return Err(err.into());
            }
        };

        let requested = LocationQuery::Coordinates(position);
        let (query, api_key) = match self.validate(&requested) {
            Ok(valid) => valid,
            Err(err) => {
                self.state = FlowState::Idle;
                self.notifier.alert(MSG_MISSING_KEY);
                return Err(err);
            }
        };

        self.state = FlowState::AwaitingResponse;
        match self.provider.current_weather(&query, &api_key).await {
            Ok(reading) => {
                self.display(reading);
                self.inputs.city.clear();
                Ok(())
            }
            Err(err) => {
                self.state = FlowState::Idle;
                tracing::error!("Error fetching weather data by coordinates {query}: {err}");
                self.notifier.alert(MSG_LOCATION_WEATHER_FAILED);
                Err(err.into())
            }
        }
    }

    /// Trim the form values and check that nothing required is blank.
    fn validate(&self, query: &LocationQuery) -> Result<(LocationQuery, String), WidgetError> {
        let api_key = self.inputs.api_key.trim();

        let query = match query {
            LocationQuery::City(city) => {
                let city = city.trim();
                if city.is_empty() {
                    return Err(WidgetError::MissingInput("city name"));
                }
                LocationQuery::City(city.to_string())
            }
            LocationQuery::Coordinates(c) => LocationQuery::Coordinates(*c),
        };

        if api_key.is_empty() {
            return Err(WidgetError::MissingInput("API key"));
        }

        Ok((query, api_key.to_string()))
    }

    fn display(&mut self, reading: WeatherReading) {
        self.panel.render(&reading);
        self.reading = Some(reading);
        self.modal.hide();
        self.state = FlowState::Done;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::DEFAULT_ICON_BASE_URL,
        error::LocationError,
        geolocation::FixedGeolocator,
        model::Coordinates,
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone)]
    enum Reply {
        Reading(WeatherReading),
        Status(u16),
        Garbage,
    }

    #[derive(Debug, Clone)]
    struct FakeProvider {
        reply: Reply,
        calls: Arc<Mutex<Vec<(LocationQuery, String)>>>,
    }

    impl FakeProvider {
        fn new(reply: Reply) -> Self {
            Self {
                reply,
                calls: Arc::default(),
            }
        }
    }

    #[async_trait]
    impl WeatherProvider for FakeProvider {
        async fn current_weather(
            &self,
            query: &LocationQuery,
            api_key: &str,
        ) -> Result<WeatherReading, FetchError> {
            self.calls
                .lock()
                .unwrap()
                .push((query.clone(), api_key.to_string()));

            match &self.reply {
                Reply::Reading(r) => Ok(r.clone()),
                Reply::Status(code) => Err(FetchError::Status {
                    status: reqwest::StatusCode::from_u16(*code).unwrap(),
                    body: "{\"cod\":\"404\",\"message\":\"city not found\"}".into(),
                }),
                Reply::Garbage => Err(serde_json::from_str::<u8>("nope").unwrap_err().into()),
            }
        }
    }

    #[derive(Debug)]
    struct DeniedGeolocator;

    #[async_trait]
    impl Geolocator for DeniedGeolocator {
        async fn current_position(&self) -> Result<Coordinates, LocationError> {
            Err(LocationError::PermissionDenied)
        }
    }

    #[derive(Debug, Default)]
    struct Alerts(Vec<String>);

    impl Notifier for Alerts {
        fn alert(&mut self, message: &str) {
            self.0.push(message.to_string());
        }
    }

    #[derive(Debug, Default)]
    struct Dialog {
        shown: usize,
        hidden: usize,
    }

    impl Modal for Dialog {
        fn show(&mut self) {
            self.shown += 1;
        }
        fn hide(&mut self) {
            self.hidden += 1;
        }
    }

    fn paris() -> WeatherReading {
        WeatherReading {
            location: "Paris".into(),
            country: "FR".into(),
            temperature_c: 18.5,
            condition: "clear sky".into(),
            icon: "01d".into(),
            humidity_pct: 60,
            wind_speed_mps: 3.1,
            observed_at: Utc::now(),
        }
    }

    fn widget(
        provider: &FakeProvider,
        geolocator: Option<Box<dyn Geolocator>>,
        api_key: &str,
        city: &str,
    ) -> WeatherWidget<Alerts, Dialog> {
        let mut w = WeatherWidget::new(
            Box::new(provider.clone()),
            geolocator,
            WeatherPanel::new(DEFAULT_ICON_BASE_URL),
            Alerts::default(),
            Dialog::default(),
        );
        w.open();
        w.inputs_mut().api_key = api_key.to_string();
        w.inputs_mut().city = city.to_string();
        w
    }

    fn here() -> Option<Box<dyn Geolocator>> {
        Some(Box::new(FixedGeolocator::new(Coordinates::new(48.8, 2.3))))
    }

    #[tokio::test]
    async fn empty_city_alerts_once_without_request() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, None, "KEY", "   ");

        let err = w.fetch_weather().await.unwrap_err();

        assert!(matches!(err, WidgetError::MissingInput(_)));
        assert_eq!(w.notifier().0, vec![MSG_MISSING_CITY_OR_KEY]);
        assert!(provider.calls.lock().unwrap().is_empty());
        assert_eq!(w.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn empty_key_alerts_once_without_request() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, None, "", "Paris");

        assert!(w.fetch_weather().await.is_err());

        assert_eq!(w.notifier().0.len(), 1);
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn city_success_renders_and_hides_dialog() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, None, "  KEY ", " Paris ");

        w.fetch_weather().await.expect("fetch succeeds");

        let calls = provider.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![(LocationQuery::City("Paris".into()), "KEY".to_string())]
        );
        assert_eq!(w.panel().location, "Paris, FR");
        assert!(w.panel().icon_url.ends_with("01d@2x.png"));
        assert!(w.panel().visible);
        assert_eq!(w.reading(), Some(&paris()));
        assert_eq!(w.modal().shown, 1);
        assert_eq!(w.modal().hidden, 1);
        assert_eq!(w.state(), FlowState::Done);
        assert!(w.notifier().0.is_empty());
    }

    #[tokio::test]
    async fn not_found_alerts_once_and_keeps_panel_hidden() {
        let provider = FakeProvider::new(Reply::Status(404));
        let mut w = widget(&provider, None, "KEY", "Atlantis");

        let err = w.fetch_weather().await.unwrap_err();

        assert!(matches!(err, WidgetError::Fetch(FetchError::Status { .. })));
        assert_eq!(w.notifier().0, vec![MSG_CITY_NOT_FOUND]);
        assert!(!w.panel().visible);
        assert!(w.reading().is_none());
        assert_eq!(w.modal().hidden, 0);
        assert_eq!(w.state(), FlowState::Idle);
    }

    #[tokio::test]
    async fn undecodable_body_uses_generic_message() {
        let provider = FakeProvider::new(Reply::Garbage);
        let mut w = widget(&provider, None, "KEY", "Paris");

        assert!(w.fetch_weather().await.is_err());
        assert_eq!(w.notifier().0, vec![MSG_FETCH_FAILED]);
    }

    #[tokio::test]
    async fn failed_fetch_keeps_previous_reading() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, None, "KEY", "Paris");
        w.fetch_weather().await.expect("first fetch succeeds");

        w.provider = Box::new(FakeProvider::new(Reply::Status(401)));
        assert!(w.fetch_weather().await.is_err());

        assert_eq!(w.panel().location, "Paris, FR");
        assert_eq!(w.notifier().0.len(), 1);
    }

    #[tokio::test]
    async fn location_success_uses_coordinates_and_clears_city() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, here(), "KEY", "Berlin");

        w.fetch_weather_by_location().await.expect("fetch succeeds");

        let calls = provider.calls.lock().unwrap().clone();
        assert_eq!(
            calls,
            vec![(
                LocationQuery::Coordinates(Coordinates::new(48.8, 2.3)),
                "KEY".to_string()
            )]
        );
        assert_eq!(w.inputs().city, "");
        assert!(w.panel().visible);
        assert_eq!(w.modal().hidden, 1);
    }

    #[tokio::test]
    async fn location_without_geolocator_alerts_once() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, None, "KEY", "");

        let err = w.fetch_weather_by_location().await.unwrap_err();

        assert!(matches!(err, WidgetError::GeolocationUnsupported));
        assert_eq!(w.notifier().0, vec![MSG_GEOLOCATION_UNSUPPORTED]);
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn denied_location_alerts_once() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, Some(Box::new(DeniedGeolocator)), "KEY", "");

        let err = w.fetch_weather_by_location().await.unwrap_err();

        assert!(matches!(err, WidgetError::Location(LocationError::PermissionDenied)));
        assert_eq!(w.notifier().0, vec![MSG_LOCATION_DENIED]);
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn location_without_key_does_not_request() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, here(), " ", "");

        assert!(w.fetch_weather_by_location().await.is_err());

        assert_eq!(w.notifier().0, vec![MSG_MISSING_KEY]);
        assert!(provider.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn location_fetch_failure_keeps_city_text() {
        let provider = FakeProvider::new(Reply::Status(500));
        let mut w = widget(&provider, here(), "KEY", "Berlin");

        assert!(w.fetch_weather_by_location().await.is_err());

        assert_eq!(w.notifier().0, vec![MSG_LOCATION_WEATHER_FAILED]);
        assert_eq!(w.inputs().city, "Berlin");
        assert!(!w.panel().visible);
    }

    #[tokio::test]
    async fn missing_input_after_success_returns_to_idle() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let mut w = widget(&provider, here(), "KEY", "Paris");
        w.fetch_weather().await.expect("first fetch succeeds");
        assert_eq!(w.state(), FlowState::Done);

        w.inputs_mut().city.clear();
        assert!(w.fetch_weather().await.is_err());
        assert_eq!(w.state(), FlowState::Idle);

        w.fetch_weather_by_location().await.expect("location fetch succeeds");
        assert_eq!(w.state(), FlowState::Done);

        w.inputs_mut().api_key.clear();
        assert!(w.fetch_weather_by_location().await.is_err());
        assert_eq!(w.state(), FlowState::Idle);
        assert_eq!(provider.calls.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn lookup_has_no_ui_side_effects() {
        let provider = FakeProvider::new(Reply::Reading(paris()));
        let w = widget(&provider, None, "KEY", "");

        let reading = w
            .lookup(&LocationQuery::City("Paris".into()))
            .await
            .expect("lookup succeeds");

        assert_eq!(reading, paris());
        assert!(!w.panel().visible);
        assert_eq!(w.modal().hidden, 0);

        let err = w.lookup(&LocationQuery::City(" ".into())).await.unwrap_err();
        assert!(matches!(err, WidgetError::MissingInput("city name")));
        assert!(w.notifier().0.is_empty());
    }
}
