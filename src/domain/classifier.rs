//! Classification of inbound links into [`LinkEvent`]s.
//!
//! Two link shapes are recognized:
//!
//! 1. **Web links** - `http(s)://host/.../linkId`. The host is the domain and the
//!    last path segment is the link id. Counted as a click unless a `link` query
//!    parameter is present (a deferred link carried through the web page).
//! 2. **Custom-scheme links** - `myapp://open?link=host/linkId`. The embedded `link`
//!    parameter is recovered (scheme prepended if missing) and classified like a web
//!    link, but never counted as a click.

use url::Url;

use crate::domain::entities::LinkEvent;
use crate::error::ClassificationError;
use crate::utils::url_recovery::{last_path_segment, query_param, recover_link};

/// Query parameter carrying an embedded attribution link.
pub const LINK_PARAM: &str = "link";

/// Classifies an inbound link URI.
///
/// # Errors
///
/// - [`ClassificationError::InvalidUri`] if the URI, or the embedded link, cannot be parsed
/// - [`ClassificationError::MissingLinkParameter`] for custom-scheme links without `link`
/// - [`ClassificationError::MissingLinkId`] if the embedded link has no path segment
///
/// # Examples
///
/// ```ignore
/// let event = classify("https://go.example.com/abc123").unwrap();
/// assert_eq!(event.domain, "go.example.com");
/// assert_eq!(event.link_id, "abc123");
/// assert!(event.is_click);
/// ```
pub fn classify(raw_uri: &str) -> Result<LinkEvent, ClassificationError> {
    let uri = Url::parse(raw_uri.trim())
        .map_err(|e| ClassificationError::InvalidUri(format!("{raw_uri}: {e}")))?;

    let is_web = matches!(uri.scheme(), "http" | "https");
    let embedded = query_param(&uri, LINK_PARAM).filter(|link| !link.is_empty());

    if is_web
        && let (Some(domain), Some(link_id)) = (uri.host_str(), last_path_segment(&uri))
    {
        return Ok(LinkEvent::new(raw_uri, domain, link_id, embedded.is_none()));
    }

    let embedded =
        embedded.ok_or_else(|| ClassificationError::MissingLinkParameter(raw_uri.to_string()))?;

    let recovered = recover_link(&embedded)
        .map_err(|e| ClassificationError::InvalidUri(format!("{embedded}: {e}")))?;

    let domain = recovered
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| ClassificationError::InvalidUri(embedded.clone()))?;
    let link_id = last_path_segment(&recovered)
        .ok_or_else(|| ClassificationError::MissingLinkId(embedded.clone()))?;

    Ok(LinkEvent::new(raw_uri, domain, link_id, false))
}
