//! Fallback navigation when link handling fails.

use std::sync::Arc;

use tracing::{info, warn};
use url::Url;

use crate::domain::ports::LinkOpener;
use crate::error::OpenError;

/// What the navigator did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackAction {
    /// The fallback URL was handed to the opener.
    Opened(Url),
    /// No fallback URL was supplied; the package and source were logged.
    Logged,
}

/// A fallback URL that could not be opened.
#[derive(Debug, thiserror::Error)]
#[error("Failed to open fallback URL: {source}")]
pub struct FallbackError {
    pub uri: String,
    #[source]
    pub source: OpenError,
}

/// Opens a substitute destination when a link cannot be handled.
pub struct FallbackNavigator {
    opener: Arc<dyn LinkOpener>,
}

impl FallbackNavigator {
    pub fn new(opener: Arc<dyn LinkOpener>) -> Self {
        Self { opener }
    }

    /// Opens `fallback_url` if one is supplied, otherwise logs the package and source.
    ///
    /// # Errors
    ///
    /// Returns [`FallbackError`] if the URL is invalid or the opener fails.
    pub fn navigate(
        &self,
        fallback_package: &str,
        fallback_url: Option<&str>,
        source: Option<&str>,
    ) -> Result<FallbackAction, FallbackError> {
        let Some(raw) = fallback_url.map(str::trim).filter(|url| !url.is_empty()) else {
            info!(
                package = %fallback_package,
                source = source.unwrap_or("none"),
                "No fallback URL supplied"
            );
            return Ok(FallbackAction::Logged);
        };

        let url = Url::parse(raw).map_err(|e| FallbackError {
            uri: raw.to_string(),
            source: OpenError::InvalidUrl(e.to_string()),
        })?;

        self.opener.open(&url).map_err(|source| {
            warn!(url = %url, error = %source, "Fallback URL could not be opened");
            FallbackError {
                uri: raw.to_string(),
                source,
            }
        })?;

        info!(url = %url, "Opened fallback URL");
        Ok(FallbackAction::Opened(url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::MockLinkOpener;

    #[test]
    fn test_opens_fallback_url() {
        let mut opener = MockLinkOpener::new();
        opener
            .expect_open()
            .withf(|url| url.as_str() == "https://example.com/fallback")
            .times(1)
            .returning(|_| Ok(()));

        let navigator = FallbackNavigator::new(Arc::new(opener));
        let action = navigator
            .navigate("com.example.app", Some("https://example.com/fallback"), None)
            .unwrap();

        assert!(matches!(action, FallbackAction::Opened(_)));
    }

    #[test]
    fn test_without_fallback_url_only_logs() {
        let mut opener = MockLinkOpener::new();
        opener.expect_open().times(0);

        let navigator = FallbackNavigator::new(Arc::new(opener));

        assert_eq!(
            navigator.navigate("com.example.app", None, Some("push")).unwrap(),
            FallbackAction::Logged
        );
        assert_eq!(
            navigator.navigate("com.example.app", Some("  "), None).unwrap(),
            FallbackAction::Logged
        );
    }

    #[test]
    fn test_invalid_fallback_url() {
        let mut opener = MockLinkOpener::new();
        opener.expect_open().times(0);

        let navigator = FallbackNavigator::new(Arc::new(opener));
        let err = navigator
            .navigate("com.example.app", Some("not a url"), None)
            .unwrap_err();

        assert_eq!(err.uri, "not a url");
        assert!(err.to_string().starts_with("Failed to open fallback URL"));
    }

    #[test]
    fn test_opener_failure() {
        let mut opener = MockLinkOpener::new();
        opener.expect_open().times(1).returning(|_| {
            Err(OpenError::Launch(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "xdg-open not found",
            )))
        });

        let navigator = FallbackNavigator::new(Arc::new(opener));
        let err = navigator
            .navigate("com.example.app", Some("https://example.com"), None)
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Failed to open fallback URL: Failed to launch opener: xdg-open not found"
        );
    }
}
