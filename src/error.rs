use thiserror::Error;

/// Weather fetch failures. No retries happen at this level; the caller
/// decides what a failure means for the UI.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid query: {0}")]
    InvalidQuery(String),
    #[error("weather request timed out")]
    Timeout,
    #[error("weather service returned status {status}")]
    Upstream { status: u16 },
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Geolocation failures. The orchestrator treats all variants as the same
/// fallback trigger and never branches on kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LocationError {
    #[error("location permission denied")]
    PermissionDenied,
    #[error("location service unavailable")]
    Unavailable,
    #[error("location request timed out")]
    Timeout,
}

/// Rejected unit label. Raised before any state changes.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized unit: {0:?}")]
pub struct InvalidUnit(pub String);

/// Background video failures. Logged by the orchestrator, never fatal.
#[derive(Debug, Error)]
pub enum VideoError {
    #[error("video preload timed out: {src}")]
    PreloadTimeout { src: String },
    #[error("video preload failed: {src}")]
    PreloadFailed { src: String },
    #[error("video playback failed to start: {src}")]
    PlaybackFailed { src: String },
}
