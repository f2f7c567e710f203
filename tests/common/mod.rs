#![allow(dead_code)]

use applink::application::dispatcher::{ObserverDispatcher, ObserverEvent};
use applink::application::services::{AppLinkService, AttributionClient};
use applink::domain::ports::{
    AppLinkObserver, ConnectivityFlag, HttpClient, HttpMethod, HttpRequest, HttpResponse,
    ReferrerOutcome, ReferrerSource, Store,
};
use applink::error::TransportError;
use applink::infrastructure::opener::LoggingOpener;
use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::task::JoinHandle;
use url::Url;

pub const BASE_URL: &str = "https://api.example.com/";
pub const APP_ID: &str = "app-test";

/// In-process backend answering by request path and recording every request.
///
/// Unknown paths answer `404` with an empty body.
#[derive(Default)]
pub struct FakeBackend {
    routes: Mutex<HashMap<String, HttpResponse>>,
    requests: Mutex<Vec<HttpRequest>>,
    delay: Option<Duration>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), HttpResponse::new(status, body));
        self
    }

    /// Delays every answer, keeping resolutions in flight long enough to attach waiters.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn count(&self, method: HttpMethod, path: &str) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|req| req.method == method && req.url.path() == path)
            .count()
    }

    /// Bodies of the link count reports, decoded.
    pub fn reports(&self) -> Vec<Value> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .filter(|req| req.url.path() == "/dynamic-link-analytics/")
            .filter_map(|req| req.body.as_deref())
            .map(|body| serde_json::from_str(body).unwrap())
            .collect()
    }
}

#[async_trait]
impl HttpClient for FakeBackend {
    async fn request(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let path = request.url.path().to_string();
        self.requests.lock().unwrap().push(request);

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self
            .routes
            .lock()
            .unwrap()
            .get(&path)
            .cloned()
            .unwrap_or_else(|| HttpResponse::new(404, "")))
    }
}

/// Referrer source answering a fixed outcome and counting lookups.
pub struct CountingReferrer {
    outcome: ReferrerOutcome,
    calls: AtomicUsize,
}

impl CountingReferrer {
    pub fn new(outcome: ReferrerOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_link(raw_link: &str) -> Self {
        Self::new(ReferrerOutcome::Ok(format!(
            "utm_source=google-play&appsonair_app_link={raw_link}"
        )))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReferrerSource for CountingReferrer {
    async fn fetch(&self) -> ReferrerOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.outcome.clone()
    }
}

/// Observer keeping every callback, in delivery order.
#[derive(Default)]
pub struct RecordingObserver {
    events: Mutex<Vec<ObserverEvent>>,
}

impl RecordingObserver {
    pub fn events(&self) -> Vec<ObserverEvent> {
        self.events.lock().unwrap().clone()
    }
}

impl AppLinkObserver for RecordingObserver {
    fn on_resolved(&self, uri: &str, payload: &Value) {
        self.events.lock().unwrap().push(ObserverEvent::Resolved {
            uri: uri.to_string(),
            payload: payload.clone(),
        });
    }

    fn on_error(&self, uri: Option<&str>, message: &str) {
        self.events.lock().unwrap().push(ObserverEvent::Error {
            uri: uri.map(str::to_string),
            message: message.to_string(),
        });
    }

    fn on_referral_ready(&self, payload: &Value) {
        self.events
            .lock()
            .unwrap()
            .push(ObserverEvent::ReferralReady {
                payload: payload.clone(),
            });
    }
}

/// A service wired to test doubles.
pub struct TestEngine {
    pub service: AppLinkService,
    pub backend: Arc<FakeBackend>,
    pub referrer: Arc<CountingReferrer>,
    pub observer: Arc<RecordingObserver>,
    pub connectivity: ConnectivityFlag,
    worker: JoinHandle<()>,
}

impl TestEngine {
    /// Flushes pending reports and waits until every callback was delivered.
    pub async fn finish(self) -> Vec<ObserverEvent> {
        self.service.flush_reports().await;
        drop(self.service);
        self.worker.await.unwrap();
        self.observer.events()
    }
}

pub fn create_test_client(
    backend: Arc<FakeBackend>,
    app_id: &str,
    connectivity: ConnectivityFlag,
) -> Arc<AttributionClient> {
    Arc::new(AttributionClient::new(
        backend,
        Url::parse(BASE_URL).unwrap(),
        app_id,
        connectivity,
    ))
}

pub fn create_test_engine(
    backend: FakeBackend,
    referrer: CountingReferrer,
    store: Arc<dyn Store>,
) -> TestEngine {
    create_test_engine_with_app_id(backend, referrer, store, APP_ID)
}

pub fn create_test_engine_with_app_id(
    backend: FakeBackend,
    referrer: CountingReferrer,
    store: Arc<dyn Store>,
    app_id: &str,
) -> TestEngine {
    let backend = Arc::new(backend);
    let referrer = Arc::new(referrer);
    let observer = Arc::new(RecordingObserver::default());
    let connectivity = ConnectivityFlag::new(true);

    let client = create_test_client(backend.clone(), app_id, connectivity.clone());
    let (dispatcher, worker) = ObserverDispatcher::spawn(observer.clone());

    let service = AppLinkService::new(
        client,
        store,
        referrer.clone(),
        Arc::new(LoggingOpener),
        dispatcher,
    )
    .with_referral_notify_delay(Duration::from_millis(1));

    TestEngine {
        service,
        backend,
        referrer,
        observer,
        connectivity,
        worker,
    }
}
