//! Facade tying link dispatch, install tracking and referral lookup together.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::dispatcher::ObserverDispatcher;
use crate::application::services::install_tracker::InstallOutcome;
use crate::application::services::{
    AttributionClient, FallbackNavigator, InstallTracker, ReferralResolver,
};
use crate::domain::classifier::classify;
use crate::domain::entities::{AttributionResult, LinkCountEvent, NewAppLink, ReferralRecord};
use crate::domain::ports::{LinkOpener, ReferrerSource, Store};
use crate::error::AppLinkError;

/// Delay before the referral notification, giving the UI time to attach.
pub const DEFAULT_REFERRAL_NOTIFY_DELAY: Duration = Duration::from_millis(750);

/// Entry point used by the host application.
///
/// Built once by the composition root (see [`crate::runtime`]) and shared by
/// reference; it replaces any process-wide singleton. All results reach the
/// observer through the [`ObserverDispatcher`].
pub struct AppLinkService {
    client: Arc<AttributionClient>,
    resolver: Arc<ReferralResolver>,
    tracker: Arc<InstallTracker>,
    navigator: FallbackNavigator,
    dispatcher: ObserverDispatcher,
    referral_notify_delay: Duration,
}

impl AppLinkService {
    pub fn new(
        client: Arc<AttributionClient>,
        store: Arc<dyn Store>,
        referrer: Arc<dyn ReferrerSource>,
        opener: Arc<dyn LinkOpener>,
        dispatcher: ObserverDispatcher,
    ) -> Self {
        let resolver = Arc::new(ReferralResolver::new(client.clone(), store.clone()));
        let tracker = Arc::new(InstallTracker::new(
            referrer,
            store,
            client.clone(),
            resolver.clone(),
        ));

        Self {
            client,
            resolver,
            tracker,
            navigator: FallbackNavigator::new(opener),
            dispatcher,
            referral_notify_delay: DEFAULT_REFERRAL_NOTIFY_DELAY,
        }
    }

    pub fn with_referral_notify_delay(mut self, delay: Duration) -> Self {
        self.referral_notify_delay = delay;
        self
    }

    pub fn client(&self) -> &AttributionClient {
        &self.client
    }

    /// Starts install tracking in the background, then handles the launch link.
    ///
    /// Returns the handle of the install tracking task. When the first install
    /// produces a referral, the observer receives `on_referral_ready` after the
    /// configured delay.
    pub async fn initialize(
        &self,
        launch_uri: Option<&str>,
        fallback_package: &str,
    ) -> JoinHandle<()> {
        let install = self.spawn_install_tracking();
        self.handle_deep_link(launch_uri, fallback_package, None, None)
            .await;
        install
    }

    fn spawn_install_tracking(&self) -> JoinHandle<()> {
        let tracker = self.tracker.clone();
        let dispatcher = self.dispatcher.clone();
        let delay = self.referral_notify_delay;

        tokio::spawn(async move {
            let outcome = tracker
                .track(|referrer| info!(referrer = %referrer, "Install referrer fetched"))
                .await;

            match outcome {
                Ok(InstallOutcome::FirstInstall {
                    referral: Some(record),
                }) => {
                    tokio::time::sleep(delay).await;
                    dispatcher.referral_ready(record.to_payload());
                }
                Ok(_) => {}
                Err(e) => warn!(error = %e, "Install tracking failed"),
            }
        })
    }

    /// Handles an inbound link.
    ///
    /// Absent URIs are ignored. Unclassifiable links are reported through
    /// `on_error` and trigger the fallback. Otherwise the open is counted
    /// (fire-and-forget), the link is resolved and `on_resolved` receives the
    /// backend `data` object or the raw result.
    pub async fn handle_deep_link(
        &self,
        uri: Option<&str>,
        fallback_package: &str,
        source: Option<&str>,
        fallback_url: Option<&str>,
    ) {
        let Some(uri) = uri else {
            return;
        };

        let event = match classify(uri) {
            Ok(event) => event,
            Err(e) => {
                counter!("applink_link_events_total", "outcome" => "unclassified").increment(1);
                warn!(uri = %uri, error = %e, "Deep link could not be classified");
                self.dispatcher.error(
                    Some(uri.to_string()),
                    format!("Error processing deep link: {e}"),
                );
                if let Err(e) = self.navigator.navigate(fallback_package, fallback_url, source) {
                    self.dispatcher.error(Some(e.uri.clone()), e.to_string());
                }
                return;
            }
        };

        if let Err(e) = self.client.report_link_count(LinkCountEvent::open(&event)) {
            warn!(error = %e, "Link open not counted");
        }

        let result = self.client.resolve(&event.link_id, &event.domain).await;
        counter!("applink_link_events_total", "outcome" => result.status.as_str()).increment(1);
        info!(
            uri = %uri,
            link_id = %event.link_id,
            is_click = event.is_click,
            status = result.status.as_str(),
            "Deep link processed"
        );
        self.dispatcher.resolved(uri, result.observer_payload());
    }

    /// Returns the install referral, waiting for the in-flight resolution if needed.
    pub async fn get_referral_info(&self) -> Arc<ReferralRecord> {
        self.resolver.get().await
    }

    /// Like [`Self::get_referral_info`], giving up after `timeout`.
    pub async fn get_referral_info_timeout(
        &self,
        timeout: Duration,
    ) -> Option<Arc<ReferralRecord>> {
        self.resolver.get_with_timeout(timeout).await
    }

    /// Returns the referral already held in memory, without waiting.
    #[deprecated(note = "use `get_referral_info`, which waits for the in-flight resolution")]
    pub async fn referral_details(&self) -> Option<Arc<ReferralRecord>> {
        self.resolver.current().await
    }

    /// Creates an app link on the backend.
    ///
    /// # Errors
    ///
    /// Returns [`AppLinkError::Validation`] if the request is invalid.
    pub async fn create_app_link(
        &self,
        link: &NewAppLink,
    ) -> Result<AttributionResult, AppLinkError> {
        self.client.create_app_link(link).await
    }

    /// Waits for fire-and-forget link count reports still in flight.
    pub async fn flush_reports(&self) {
        self.client.flush_reports().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dispatcher::ObserverEvent;
    use crate::domain::ports::{
        ConnectivityFlag, HttpResponse, MockHttpClient, MockLinkOpener, MockReferrerSource,
        ReferrerOutcome,
    };
    use crate::infrastructure::storage::MemoryStore;
    use serde_json::json;
    use tokio::sync::mpsc::UnboundedReceiver;
    use url::Url;

    fn service(
        http: MockHttpClient,
        referrer: ReferrerOutcome,
        opener: MockLinkOpener,
    ) -> (AppLinkService, UnboundedReceiver<ObserverEvent>) {
        let client = Arc::new(AttributionClient::new(
            Arc::new(http),
            Url::parse("https://api.example.com/").unwrap(),
            "app-1",
            ConnectivityFlag::new(true),
        ));
        let mut source = MockReferrerSource::new();
        source.expect_fetch().returning(move || referrer.clone());
        let (dispatcher, rx) = ObserverDispatcher::channel();

        let service = AppLinkService::new(
            client,
            Arc::new(MemoryStore::new()),
            Arc::new(source),
            Arc::new(opener),
            dispatcher,
        )
        .with_referral_notify_delay(Duration::from_millis(1));

        (service, rx)
    }

    #[tokio::test]
    async fn test_deep_link_counts_and_resolves() {
        let mut http = MockHttpClient::new();
        http.expect_request()
            .withf(|req| {
                req.url.path() == "/dynamic-link-analytics/"
                    && req.body.as_deref().is_some_and(|body| body.contains("\"isClicked\":true"))
            })
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "{}")));
        http.expect_request()
            .withf(|req| req.url.path() == "/dynamic-link/abc123")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"data":{"name":"promo"}}"#)));

        let (service, mut rx) =
            service(http, ReferrerOutcome::Unsupported, MockLinkOpener::new());

        service
            .handle_deep_link(Some("https://go.example.com/abc123"), "com.example", None, None)
            .await;
        service.flush_reports().await;

        assert_eq!(
            rx.recv().await.unwrap(),
            ObserverEvent::Resolved {
                uri: "https://go.example.com/abc123".into(),
                payload: json!({ "name": "promo" }),
            }
        );
    }

    #[tokio::test]
    async fn test_absent_uri_is_ignored() {
        let mut http = MockHttpClient::new();
        http.expect_request().times(0);

        let (service, mut rx) =
            service(http, ReferrerOutcome::Unsupported, MockLinkOpener::new());
        service.handle_deep_link(None, "com.example", None, None).await;
        drop(service);

        assert!(rx.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_unclassified_link_reports_error_and_falls_back() {
        let mut http = MockHttpClient::new();
        http.expect_request().times(0);

        let mut opener = MockLinkOpener::new();
        opener
            .expect_open()
            .withf(|url| url.as_str() == "https://example.com/store")
            .times(1)
            .returning(|_| Ok(()));

        let (service, mut rx) = service(http, ReferrerOutcome::Unsupported, opener);
        service
            .handle_deep_link(
                Some("myapp://open"),
                "com.example",
                Some("push"),
                Some("https://example.com/store"),
            )
            .await;

        let Some(ObserverEvent::Error { uri, message }) = rx.recv().await else {
            panic!("expected error event");
        };
        assert_eq!(uri.as_deref(), Some("myapp://open"));
        assert!(message.starts_with("Error processing deep link:"));
    }

    #[tokio::test]
    async fn test_failing_fallback_reports_second_error() {
        let mut http = MockHttpClient::new();
        http.expect_request().times(0);

        let (service, mut rx) =
            service(http, ReferrerOutcome::Unsupported, MockLinkOpener::new());
        service
            .handle_deep_link(Some("myapp://open"), "com.example", None, Some("not a url"))
            .await;

        assert!(matches!(rx.recv().await, Some(ObserverEvent::Error { .. })));
        let Some(ObserverEvent::Error { uri, message }) = rx.recv().await else {
            panic!("expected fallback error event");
        };
        assert_eq!(uri.as_deref(), Some("not a url"));
        assert!(message.starts_with("Failed to open fallback URL"));
    }

    #[tokio::test]
    async fn test_initialize_notifies_referral_on_first_install() {
        let mut http = MockHttpClient::new();
        http.expect_request()
            .withf(|req| req.url.path() == "/dynamic-link-analytics/")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, "{}")));
        http.expect_request()
            .withf(|req| req.url.path() == "/dynamic-link/abc123")
            .times(1)
            .returning(|_| Ok(HttpResponse::new(200, r#"{"data":{"name":"promo"}}"#)));

        let (service, mut rx) = service(
            http,
            ReferrerOutcome::Ok("appsonair_app_link=go.example.com%2Fabc123".into()),
            MockLinkOpener::new(),
        );

        let install = service.initialize(None, "com.example").await;
        install.await.unwrap();
        service.flush_reports().await;

        let Some(ObserverEvent::ReferralReady { payload }) = rx.recv().await else {
            panic!("expected referral event");
        };
        assert_eq!(payload["data"]["name"], json!("promo"));
        assert_eq!(
            payload["data"]["referralLink"],
            json!("https://go.example.com/abc123")
        );

        let info = service.get_referral_info().await;
        assert!(info.is_resolved());
    }

    #[tokio::test]
    async fn test_create_app_link_rejects_invalid_input() {
        let mut http = MockHttpClient::new();
        http.expect_request().times(0);

        let (service, _rx) =
            service(http, ReferrerOutcome::Unsupported, MockLinkOpener::new());
        let link = NewAppLink::new("", "not a url", "");

        assert!(matches!(
            service.create_app_link(&link).await,
            Err(AppLinkError::Validation(_))
        ));
    }
}
