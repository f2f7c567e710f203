//! Attribution result returned by the lookup backend.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{APP_ID_MISSING, NETWORK_ERROR};

/// Outcome category of an attribution request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributionStatus {
    Ok,
    NotFound,
    RateLimited,
    NetworkUnavailable,
    ConfigMissing,
    Unknown,
}

impl AttributionStatus {
    /// Stable label used in logs and metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ok => "ok",
            Self::NotFound => "not_found",
            Self::RateLimited => "rate_limited",
            Self::NetworkUnavailable => "network_unavailable",
            Self::ConfigMissing => "config_missing",
            Self::Unknown => "unknown",
        }
    }
}

/// Structured result of a backend request.
///
/// Every path through the attribution client produces one of these; failures are
/// carried in [`AttributionStatus`] and `message` instead of an `Err`, so the caller
/// can always hand something to the observer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributionResult {
    pub status: AttributionStatus,
    pub payload: Option<Value>,
    pub message: String,
}

impl AttributionResult {
    pub fn ok(payload: Value) -> Self {
        Self {
            status: AttributionStatus::Ok,
            payload: Some(payload),
            message: String::new(),
        }
    }

    pub fn not_found(body: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            status: AttributionStatus::NotFound,
            payload,
            message: body.into(),
        }
    }

    /// HTTP 429: the payload is always dropped and the raw body kept as message.
    pub fn rate_limited(body: impl Into<String>) -> Self {
        Self {
            status: AttributionStatus::RateLimited,
            payload: None,
            message: body.into(),
        }
    }

    pub fn network_unavailable() -> Self {
        Self {
            status: AttributionStatus::NetworkUnavailable,
            payload: None,
            message: NETWORK_ERROR.to_string(),
        }
    }

    pub fn config_missing() -> Self {
        Self {
            status: AttributionStatus::ConfigMissing,
            payload: None,
            message: APP_ID_MISSING.to_string(),
        }
    }

    pub fn unknown(message: impl Into<String>, payload: Option<Value>) -> Self {
        Self {
            status: AttributionStatus::Unknown,
            payload,
            message: message.into(),
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == AttributionStatus::Ok
    }

    /// Returns the top-level `data` object of a successful response.
    pub fn data(&self) -> Option<&Map<String, Value>> {
        if !self.is_ok() {
            return None;
        }
        self.payload.as_ref()?.get("data")?.as_object()
    }

    /// Payload handed to observers for a resolved link.
    ///
    /// The `data` object when present, otherwise the raw backend body, otherwise an
    /// `{"error": message}` object.
    pub fn observer_payload(&self) -> Value {
        if let Some(data) = self.data() {
            return Value::Object(data.clone());
        }
        match &self.payload {
            Some(payload) if payload.is_object() => payload.clone(),
            _ => json!({ "error": self.message }),
        }
    }
}
