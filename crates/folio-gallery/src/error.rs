#![forbid(unsafe_code)]

//! Error types for fallible setup paths.
//!
//! Runtime input (card attributes, image events, key presses) never produces
//! an error; it degrades instead. Only configuration can be rejected.

/// Rejected gallery configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The configuration text was not valid JSON for [`crate::GalleryConfig`].
    #[error("invalid gallery config JSON: {0}")]
    Json(#[from] serde_json::Error),
    /// A selector the host cannot run without was empty.
    #[error("selector `{0}` must not be empty")]
    EmptySelector(&'static str),
    /// The image load guard would fire immediately.
    #[error("load_timeout_ms must be greater than zero")]
    ZeroLoadTimeout,
    /// The log level string is not a `tracing` level.
    #[error("unknown log level: {0}")]
    UnknownLogLevel(String),
}
