//! Observer interface implemented by the surrounding UI.

use serde_json::Value;

/// Receives link handling results.
///
/// Callbacks are delivered one at a time from a single dispatcher task (see
/// [`crate::application::dispatcher`]), never concurrently with each other.
pub trait AppLinkObserver: Send + Sync + 'static {
    /// A link was classified and resolved. `payload` is the backend `data` object,
    /// or the raw result when the lookup failed.
    fn on_resolved(&self, uri: &str, payload: &Value);

    /// A link could not be handled.
    fn on_error(&self, uri: Option<&str>, message: &str);

    /// The install referral was resolved. Optional for observers that do not track installs.
    fn on_referral_ready(&self, _payload: &Value) {}
}
