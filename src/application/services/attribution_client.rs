//! Client for the link lookup, link analytics and link creation endpoints.

use std::sync::{Arc, Mutex, PoisonError};

use metrics::counter;
use serde_json::Value;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use url::Url;
use validator::Validate;

use crate::domain::entities::{AttributionResult, LinkCountEvent, NewAppLink};
use crate::domain::ports::{ConnectivityFlag, HttpClient, HttpRequest, HttpResponse};
use crate::error::{AppLinkError, SOMETHING_WENT_WRONG, TransportError};

/// Header carrying the application identifier.
pub const APPLICATION_KEY_HEADER: &str = "x-application-key";

const DYNAMIC_LINK_PATH: &str = "dynamic-link";
const DYNAMIC_LINK_ANALYTICS_PATH: &str = "dynamic-link-analytics";

/// Backend client translating HTTP outcomes into [`AttributionResult`]s.
///
/// # Status Mapping
///
/// | Outcome                  | Status               | Message          |
/// |--------------------------|----------------------|------------------|
/// | 2xx                      | `Ok`                 | empty            |
/// | 404                      | `NotFound`           | raw body         |
/// | 429                      | `RateLimited`        | raw body         |
/// | other non-2xx            | `Unknown`            | raw body         |
/// | timeout / connect error  | `NetworkUnavailable` | fixed message    |
///
/// Requests are short-circuited without touching the network when the application
/// identifier is empty (`ConfigMissing`) or, for lookups, when the connectivity flag
/// is unset (`NetworkUnavailable`).
pub struct AttributionClient {
    http: Arc<dyn HttpClient>,
    base_url: Url,
    app_id: String,
    connectivity: ConnectivityFlag,
    in_flight_reports: Mutex<Vec<JoinHandle<()>>>,
}

impl AttributionClient {
    /// Creates a new client.
    ///
    /// # Arguments
    ///
    /// - `base_url` - Backend base URL; endpoint paths are appended to its path
    /// - `app_id` - Application identifier sent as `x-application-key`
    /// - `connectivity` - Flag maintained by the network watcher
    pub fn new(
        http: Arc<dyn HttpClient>,
        base_url: Url,
        app_id: impl Into<String>,
        connectivity: ConnectivityFlag,
    ) -> Self {
        Self {
            http,
            base_url,
            app_id: app_id.into(),
            connectivity,
            in_flight_reports: Mutex::new(Vec::new()),
        }
    }

    pub fn connectivity(&self) -> &ConnectivityFlag {
        &self.connectivity
    }

    /// Resolves link metadata: `GET {base}/dynamic-link/{link_id}?domain={domain}`.
    ///
    /// Never fails; every outcome is mapped to an [`AttributionResult`].
    pub async fn resolve(&self, link_id: &str, domain: &str) -> AttributionResult {
        let result = self.resolve_inner(link_id, domain).await;
        counter!("applink_resolutions_total", "status" => result.status.as_str()).increment(1);
        debug!(
            link_id = %link_id,
            domain = %domain,
            status = result.status.as_str(),
            "Link resolution finished"
        );
        result
    }

    async fn resolve_inner(&self, link_id: &str, domain: &str) -> AttributionResult {
        if self.app_id.is_empty() {
            return AttributionResult::config_missing();
        }
        if !self.connectivity.is_connected() {
            return AttributionResult::network_unavailable();
        }

        let mut url = match self.endpoint(&[DYNAMIC_LINK_PATH, link_id]) {
            Ok(url) => url,
            Err(e) => return AttributionResult::unknown(e.to_string(), None),
        };
        url.query_pairs_mut().append_pair("domain", domain);

        let request = HttpRequest::get(url).header(APPLICATION_KEY_HEADER, &self.app_id);
        map_outcome(self.http.request(request).await)
    }

    /// Reports a link count event: `POST {base}/dynamic-link-analytics/`.
    ///
    /// Fire-and-forget: the request runs on its own task and its failures are only
    /// logged. Use [`Self::flush_reports`] to wait for reports still in flight.
    ///
    /// # Errors
    ///
    /// Returns [`AppLinkError::ConfigMissing`] without dispatching anything when the
    /// application identifier is empty.
    pub fn report_link_count(&self, event: LinkCountEvent) -> Result<(), AppLinkError> {
        if self.app_id.is_empty() {
            counter!("applink_link_count_reports_total", "result" => "config_missing")
                .increment(1);
            return Err(AppLinkError::ConfigMissing);
        }

        let url = self.endpoint(&[DYNAMIC_LINK_ANALYTICS_PATH, ""])?;
        let body = serde_json::to_string(&event).map_err(|e| {
            AppLinkError::Endpoint(format!("Failed to encode link count event: {e}"))
        })?;
        let request = HttpRequest::post(url, body).header(APPLICATION_KEY_HEADER, &self.app_id);
        let http = self.http.clone();

        let handle = tokio::spawn(async move {
            match http.request(request).await {
                Ok(response) if response.is_success() => {
                    counter!("applink_link_count_reports_total", "result" => "ok").increment(1);
                    debug!(
                        short_id = %event.short_id,
                        domain = %event.domain,
                        "Link count reported"
                    );
                }
                Ok(response) => {
                    counter!("applink_link_count_reports_total", "result" => "rejected")
                        .increment(1);
                    warn!(
                        short_id = %event.short_id,
                        status = response.status,
                        body = %response.body,
                        "Link count rejected"
                    );
                }
                Err(e) => {
                    counter!("applink_link_count_reports_total", "result" => "failed")
                        .increment(1);
                    warn!(short_id = %event.short_id, error = %e, "Link count failed");
                }
            }
        });

        let mut reports = self
            .in_flight_reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        reports.retain(|report| !report.is_finished());
        reports.push(handle);

        Ok(())
    }

    /// Waits for every link count report dispatched so far.
    pub async fn flush_reports(&self) {
        let reports: Vec<_> = self
            .in_flight_reports
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .drain(..)
            .collect();

        for report in reports {
            if let Err(e) = report.await {
                warn!(error = %e, "Link count task aborted");
            }
        }
    }

    /// Creates an app link: `POST {base}/dynamic-link/`.
    ///
    /// # Errors
    ///
    /// Returns [`AppLinkError::Validation`] if the request is invalid. Connectivity and
    /// configuration problems are reported through the returned result, like lookups.
    pub async fn create_app_link(
        &self,
        link: &NewAppLink,
    ) -> Result<AttributionResult, AppLinkError> {
        link.validate()?;

        if !self.connectivity.is_connected() {
            return Ok(AttributionResult::network_unavailable());
        }
        if self.app_id.is_empty() {
            return Ok(AttributionResult::config_missing());
        }

        let url = self.endpoint(&[DYNAMIC_LINK_PATH, ""])?;
        let request = HttpRequest::post(url, link.to_request_body().to_string())
            .header(APPLICATION_KEY_HEADER, &self.app_id);

        let result = map_outcome(self.http.request(request).await);
        info!(
            name = %link.name,
            url_prefix = %link.url_prefix,
            status = result.status.as_str(),
            "App link creation finished"
        );
        Ok(result)
    }

    /// Appends path segments to the base URL.
    ///
    /// A trailing `""` segment produces a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, AppLinkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| AppLinkError::Endpoint(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }
}

fn map_outcome(outcome: Result<HttpResponse, TransportError>) -> AttributionResult {
    match outcome {
        Ok(response) => map_response(response),
        Err(e) if e.is_unreachable() => {
            warn!(error = %e, "Backend unreachable");
            AttributionResult::network_unavailable()
        }
        Err(e) => {
            warn!(error = %e, "Request failed");
            AttributionResult::unknown(SOMETHING_WENT_WRONG, None)
        }
    }
}

fn map_response(response: HttpResponse) -> AttributionResult {
    let parsed = serde_json::from_str::<Value>(&response.body).ok();

    match response.status {
        200..=299 => match parsed {
            Some(payload) => AttributionResult::ok(payload),
            None => AttributionResult::unknown(response.body, None),
        },
        404 => AttributionResult::not_found(response.body, parsed),
        429 => AttributionResult::rate_limited(response.body),
        _ => AttributionResult::unknown(response.body, parsed),
    }
}
