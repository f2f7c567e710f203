//! Platform install-referrer port.

use async_trait::async_trait;

/// Terminal outcome of a referrer lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferrerOutcome {
    /// The raw referrer string the app was installed with.
    Ok(String),
    /// The platform has no referrer facility.
    Unsupported,
    /// The facility exists but could not be reached.
    Unavailable,
    /// The connection to the facility dropped before it answered.
    Disconnected,
}

impl ReferrerOutcome {
    /// Human-readable description reported to the install callback on failure.
    pub fn failure_message(&self) -> Option<&'static str> {
        match self {
            Self::Ok(_) => None,
            Self::Unsupported => Some("Install referrer API not supported on this device."),
            Self::Unavailable => Some("Install referrer service unavailable."),
            Self::Disconnected => Some("Install referrer service disconnected."),
        }
    }
}

/// One-shot install referrer lookup provided by the platform.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferrerSource: Send + Sync {
    async fn fetch(&self) -> ReferrerOutcome;
}
