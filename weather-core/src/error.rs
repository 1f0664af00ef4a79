use thiserror::Error;

/// Failures of a single provider request.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Network, TLS or timeout failure from the HTTP client. The request URL
    /// is stripped first since its query carries the API key.
    #[error("failed to reach the weather provider: {0}")]
    Transport(reqwest::Error),

    /// The provider answered with a non-2xx status.
    #[error("weather provider returned status {status}: {body}")]
    Status {
        status: reqwest::StatusCode,
        body: String,
    },

    #[error("invalid provider base URL {0}")]
    InvalidEndpoint(String),

    /// The body was not the expected current-weather JSON.
    #[error("failed to parse weather provider response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures of the one-shot position request.
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location service unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
    #[error("location error: {0}")]
    Other(String),
}

/// Everything a widget flow can end with instead of a reading.
#[derive(Debug, Error)]
pub enum WidgetError {
    #[error("missing input: {0}")]
    MissingInput(&'static str),

    #[error("no location service is available")]
    GeolocationUnsupported,

    #[error(transparent)]
    Location(#[from] LocationError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
