//! Link event entity produced by the classifier for each inbound link.

/// A classified inbound link.
///
/// Derived from the raw URI delivered to the application. Immutable and never
/// persisted: a new event is built for every launch or resume carrying a link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEvent {
    /// The URI exactly as it was delivered.
    pub raw_uri: String,
    /// Host serving the short link (e.g. `go.example.com`).
    pub domain: String,
    /// Short link identifier, the last path segment of the link.
    pub link_id: String,
    /// Whether this open counts as a fresh click.
    pub is_click: bool,
}

impl LinkEvent {
    pub fn new(
        raw_uri: impl Into<String>,
        domain: impl Into<String>,
        link_id: impl Into<String>,
        is_click: bool,
    ) -> Self {
        Self {
            raw_uri: raw_uri.into(),
            domain: domain.into(),
            link_id: link_id.into(),
            is_click,
        }
    }
}
