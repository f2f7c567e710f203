//! Input data for creating a new app link on the backend.

use regex::Regex;
use serde_json::{Map, Value, json};
use std::sync::LazyLock;
use validator::{Validate, ValidationError};

/// Compiled regex for custom short id validation.
static SHORT_ID_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[a-z0-9-]+$").unwrap());

/// Request to create an app link.
///
/// Optional open-target flags default to "open in the app" on both platforms.
/// If neither app flag is set, both browser flags must be set, otherwise the
/// link would have nowhere to open.
#[derive(Debug, Clone, Default, Validate)]
#[validate(schema(function = "validate_open_targets"))]
pub struct NewAppLink {
    /// Destination URL of the link.
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,

    /// Display name of the link.
    #[validate(length(min = 1, message = "Name must not be empty"))]
    pub name: String,

    /// Domain prefix the link is created under (e.g. `go.example.com`).
    #[validate(length(min = 1, message = "URL prefix must not be empty"))]
    pub url_prefix: String,

    /// Optional custom short id.
    #[validate(length(min = 4, max = 50))]
    #[validate(regex(path = "*SHORT_ID_REGEX"))]
    pub short_id: Option<String>,

    /// Social preview tags (`title`, `description`, `imageUrl`, ...).
    pub social_meta: Option<Map<String, Value>>,

    pub is_open_in_browser_android: Option<bool>,
    pub is_open_in_android_app: Option<bool>,
    #[validate(url(message = "Invalid Android fallback URL"))]
    pub android_fallback_url: Option<String>,

    pub is_open_in_browser_apple: Option<bool>,
    pub is_open_in_ios_app: Option<bool>,
    #[validate(url(message = "Invalid iOS fallback URL"))]
    pub ios_fallback_url: Option<String>,
}

impl NewAppLink {
    pub fn new(
        url: impl Into<String>,
        name: impl Into<String>,
        url_prefix: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            name: name.into(),
            url_prefix: url_prefix.into(),
            ..Default::default()
        }
    }

    fn open_in_android_app(&self) -> bool {
        self.is_open_in_android_app.unwrap_or(true)
    }

    fn open_in_ios_app(&self) -> bool {
        self.is_open_in_ios_app.unwrap_or(true)
    }

    fn open_in_browser_android(&self) -> bool {
        self.is_open_in_browser_android.unwrap_or(false)
    }

    fn open_in_browser_apple(&self) -> bool {
        self.is_open_in_browser_apple.unwrap_or(false)
    }

    /// Builds the `POST dynamic-link/` body: `{"data": {...}, "where": {"urlPrefix": ...}}`.
    pub fn to_request_body(&self) -> Value {
        let mut data = Map::new();
        data.insert("name".into(), json!(self.name));
        data.insert("link".into(), json!(self.url));
        if let Some(short_id) = &self.short_id {
            data.insert("shortId".into(), json!(short_id));
        }
        if let Some(meta) = &self.social_meta {
            data.insert("socialMetaTags".into(), Value::Object(meta.clone()));
        }
        if let Some(url) = &self.android_fallback_url {
            data.insert("customUrlForAndroid".into(), json!(url));
        }
        if let Some(url) = &self.ios_fallback_url {
            data.insert("customUrlForIos".into(), json!(url));
        }
        data.insert("isOpenInBrowserApple".into(), json!(self.open_in_browser_apple()));
        data.insert("isOpenInAndroidApp".into(), json!(self.open_in_android_app()));
        data.insert("isOpenInIosApp".into(), json!(self.open_in_ios_app()));
        data.insert(
            "isOpenInBrowserAndroid".into(),
            json!(self.open_in_browser_android()),
        );

        json!({
            "data": data,
            "where": { "urlPrefix": self.url_prefix },
        })
    }
}

fn validate_open_targets(link: &NewAppLink) -> Result<(), ValidationError> {
    let in_app = link.open_in_android_app() || link.open_in_ios_app();
    let in_browser = link.open_in_browser_android() && link.open_in_browser_apple();

    if !in_app && !in_browser {
        let mut err = ValidationError::new("open_target");
        err.message = Some(
            "Links not opened in an app must open in the browser on both platforms".into(),
        );
        return Err(err);
    }

    Ok(())
}
