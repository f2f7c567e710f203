//! Link count event model for the analytics endpoint.

use serde::Serialize;

use super::LinkEvent;

/// Body of a `POST dynamic-link-analytics/` request.
///
/// Serialized with the backend's camelCase field names:
/// `{domain, shortId, isClicked, isFirstOpen, isInstalled, isReOpen}`.
///
/// `is_re_open` is always derived as `!is_installed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkCountEvent {
    pub domain: String,
    pub short_id: String,
    pub is_clicked: bool,
    pub is_first_open: bool,
    pub is_installed: bool,
    pub is_re_open: bool,
}

impl LinkCountEvent {
    /// Creates a new link count event.
    ///
    /// # Arguments
    ///
    /// - `link_id` - Short link identifier (sent as `shortId`)
    /// - `domain` - Host serving the short link
    /// - `is_clicked` - The open is a fresh click on the link
    /// - `is_first_open` - First launch after install
    /// - `is_install` - The open is the install itself
    pub fn new(
        link_id: impl Into<String>,
        domain: impl Into<String>,
        is_clicked: bool,
        is_first_open: bool,
        is_install: bool,
    ) -> Self {
        Self {
            domain: domain.into(),
            short_id: link_id.into(),
            is_clicked,
            is_first_open,
            is_installed: is_install,
            is_re_open: !is_install,
        }
    }

    /// Event reported for an inbound link open.
    pub fn open(event: &LinkEvent) -> Self {
        Self::new(&event.link_id, &event.domain, event.is_click, false, false)
    }

    /// Event reported once per install for the referral link.
    pub fn install(link_id: impl Into<String>, domain: impl Into<String>) -> Self {
        Self::new(link_id, domain, false, true, true)
    }
}
