//! Error types shared across the crate.
//!
//! Resolution outcomes (rate limiting, missing connectivity, server errors) are not
//! errors: they travel as [`crate::domain::entities::AttributionResult`] values so that
//! observers and referral waiters always receive a structured answer. The types here
//! cover the failures that callers are expected to branch on.

/// Message delivered when the connectivity flag is unset or the transport cannot reach the backend.
pub const NETWORK_ERROR: &str = "No Network Available!";
/// Message delivered when the application identifier is empty.
pub const APP_ID_MISSING: &str = "App id missing!";
/// Message delivered for unexpected failures without a server-provided body.
pub const SOMETHING_WENT_WRONG: &str = "Something went wrong please try again!";

/// Errors raised while classifying an inbound link.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClassificationError {
    #[error("Invalid link URI: {0}")]
    InvalidUri(String),

    #[error("Missing `link` query parameter in {0}")]
    MissingLinkParameter(String),

    #[error("Link has no path segment to resolve: {0}")]
    MissingLinkId(String),
}

/// Errors reported by an [`crate::domain::ports::HttpClient`] implementation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Connection failed: {0}")]
    Connect(String),

    #[error("Transport error: {0}")]
    Other(String),
}

impl TransportError {
    /// Returns true when the failure means the backend is unreachable.
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connect(_))
    }
}

/// Errors reported by a [`crate::domain::ports::Store`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Stored value could not be decoded: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

/// Errors reported by a [`crate::domain::ports::LinkOpener`] implementation.
#[derive(Debug, thiserror::Error)]
pub enum OpenError {
    #[error("Invalid fallback URL: {0}")]
    InvalidUrl(String),

    #[error("Failed to launch opener: {0}")]
    Launch(#[from] std::io::Error),
}

/// Top-level error type for operations that reject a request outright.
#[derive(Debug, thiserror::Error)]
pub enum AppLinkError {
    #[error(transparent)]
    Classification(#[from] ClassificationError),

    #[error("App id missing!")]
    ConfigMissing,

    #[error("No Network Available!")]
    NetworkUnavailable,

    #[error("Validation failed: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid endpoint URL: {0}")]
    Endpoint(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}
