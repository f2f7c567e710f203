//! URL recovery helpers for embedded attribution links.
//!
//! Attribution links often travel without a scheme (`go.example.com/abc123`) inside
//! a query parameter or an install referrer string. These helpers turn such values
//! back into parseable URLs and pull out the parts the attribution flow needs.

use url::Url;

/// Prepends `https://` to links that carry no `http`/`https` scheme.
///
/// The scheme match is case-insensitive and a present scheme is lowercased, so
/// `HTTPS://d/x` becomes `https://d/x`. Hosts that merely start with `http`
/// (`httpbin.example.com/x`) still get the prefix.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(ensure_scheme("go.example.com/abc"), "https://go.example.com/abc");
/// assert_eq!(ensure_scheme("http://go.example.com/abc"), "http://go.example.com/abc");
/// ```
pub fn ensure_scheme(raw: &str) -> String {
    let trimmed = raw.trim();
    match trimmed.split_once("://") {
        Some((scheme, rest))
            if scheme.eq_ignore_ascii_case("http") || scheme.eq_ignore_ascii_case("https") =>
        {
            format!("{}://{}", scheme.to_ascii_lowercase(), rest)
        }
        _ => format!("https://{}", trimmed),
    }
}

/// Parses a possibly scheme-less link into a [`Url`].
pub fn recover_link(raw: &str) -> Result<Url, url::ParseError> {
    Url::parse(&ensure_scheme(raw))
}

/// Returns the last non-empty path segment of a URL.
///
/// Empty segments produced by trailing slashes are skipped, so
/// `https://d/abc/` yields `abc`. Cannot-be-a-base URLs have no segments.
pub fn last_path_segment(url: &Url) -> Option<String> {
    url.path_segments()?
        .filter(|segment| !segment.is_empty())
        .next_back()
        .map(str::to_string)
}

/// Returns the first value of a query parameter, if present.
pub fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Returns the first value of a parameter in a bare query string (`a=1&b=2`).
///
/// A leading `?` is tolerated.
pub fn query_string_param(query: &str, name: &str) -> Option<String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}
