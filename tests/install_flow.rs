mod common;

use applink::application::dispatcher::ObserverEvent;
use applink::domain::entities::AttributionStatus;
use applink::domain::ports::store::{
    ANALYTICS_NAMESPACE, APP_INSTALLED_KEY, REFERRAL_DETAILS_KEY, REFERRAL_NAMESPACE, read_flag,
};
use applink::domain::ports::{HttpMethod, ReferrerOutcome, Store};
use applink::infrastructure::storage::{FileStore, MemoryStore};
use common::{CountingReferrer, FakeBackend};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;

const REFERRAL_LINK: &str = "go.example.com%2Fabc123";

fn resolving_backend() -> FakeBackend {
    FakeBackend::new()
        .respond("/dynamic-link-analytics/", 200, "{}")
        .respond(
            "/dynamic-link/abc123",
            200,
            r#"{"data":{"name":"spring","campaign":"email"}}"#,
        )
}

#[tokio::test]
async fn test_first_install_reports_resolves_and_notifies() {
    let store = Arc::new(MemoryStore::new());
    let engine = common::create_test_engine(
        resolving_backend(),
        CountingReferrer::with_link(REFERRAL_LINK),
        store.clone(),
    );
    let backend = engine.backend.clone();

    let install = engine.service.initialize(None, "com.example").await;
    install.await.unwrap();

    let record = engine.service.get_referral_info().await;
    assert!(record.is_resolved());
    assert_eq!(record.referral_link, "https://go.example.com/abc123");
    assert_eq!(record.message, "Referral link fetched successfully!");
    assert_eq!(record.attribution_payload.get("campaign"), Some(&json!("email")));

    let events = engine.finish().await;
    assert_eq!(
        events,
        vec![ObserverEvent::ReferralReady {
            payload: json!({
                "data": {
                    "name": "spring",
                    "campaign": "email",
                    "referralLink": "https://go.example.com/abc123"
                },
                "message": "Referral link fetched successfully!"
            }),
        }]
    );

    assert_eq!(
        backend.reports(),
        vec![json!({
            "domain": "go.example.com",
            "shortId": "abc123",
            "isClicked": false,
            "isFirstOpen": true,
            "isInstalled": true,
            "isReOpen": false
        })]
    );
    assert_eq!(backend.count(HttpMethod::Get, "/dynamic-link/abc123"), 1);
    assert!(
        read_flag(store.as_ref(), ANALYTICS_NAMESPACE, APP_INSTALLED_KEY)
            .await
            .unwrap()
    );
    assert!(
        store
            .get(REFERRAL_NAMESPACE, REFERRAL_DETAILS_KEY)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_installed_app_never_reports_again() {
    let dir = TempDir::new().unwrap();

    let first = common::create_test_engine(
        resolving_backend(),
        CountingReferrer::with_link(REFERRAL_LINK),
        Arc::new(FileStore::open(dir.path()).await.unwrap()),
    );
    first.service.initialize(None, "com.example").await.await.unwrap();
    first.finish().await;

    // A new process with a different referrer and a backend that would answer.
    for raw_link in [REFERRAL_LINK, "go.example.com%2Fother", ""] {
        let again = common::create_test_engine(
            resolving_backend(),
            CountingReferrer::with_link(raw_link),
            Arc::new(FileStore::open(dir.path()).await.unwrap()),
        );
        let backend = again.backend.clone();

        again.service.initialize(None, "com.example").await.await.unwrap();
        let events = again.finish().await;

        assert!(backend.requests().is_empty(), "referrer {raw_link:?}");
        assert!(events.is_empty(), "referrer {raw_link:?}");
    }
}

#[tokio::test]
async fn test_persisted_referral_reloads_without_network() {
    let dir = TempDir::new().unwrap();

    let first = common::create_test_engine(
        resolving_backend(),
        CountingReferrer::with_link(REFERRAL_LINK),
        Arc::new(FileStore::open(dir.path()).await.unwrap()),
    );
    first.service.initialize(None, "com.example").await.await.unwrap();
    let original = first.service.get_referral_info().await;
    first.finish().await;

    let restarted = common::create_test_engine(
        FakeBackend::new(),
        CountingReferrer::new(ReferrerOutcome::Unsupported),
        Arc::new(FileStore::open(dir.path()).await.unwrap()),
    );
    restarted.connectivity.set_connected(false);
    let backend = restarted.backend.clone();

    let reloaded = restarted
        .service
        .get_referral_info_timeout(Duration::from_secs(1))
        .await
        .expect("persisted referral must be returned without waiting");

    assert_eq!(*reloaded, *original);
    assert!(backend.requests().is_empty());
    restarted.finish().await;
}

#[tokio::test]
async fn test_concurrent_waiters_share_one_resolution() {
    let engine = common::create_test_engine(
        resolving_backend().with_delay(Duration::from_millis(50)),
        CountingReferrer::with_link(REFERRAL_LINK),
        Arc::new(MemoryStore::new()),
    );
    let backend = engine.backend.clone();
    let service = &engine.service;

    let install = service.initialize(None, "com.example").await;
    let (a, b, c, d, e) = tokio::join!(
        service.get_referral_info(),
        service.get_referral_info(),
        service.get_referral_info(),
        service.get_referral_info(),
        service.get_referral_info(),
    );
    install.await.unwrap();

    for other in [&b, &c, &d, &e] {
        assert!(Arc::ptr_eq(&a, other));
    }
    assert!(a.is_resolved());
    assert_eq!(backend.count(HttpMethod::Get, "/dynamic-link/abc123"), 1);
    engine.finish().await;
}

#[tokio::test]
async fn test_failed_resolution_is_not_persisted() {
    let dir = TempDir::new().unwrap();

    let first = common::create_test_engine(
        FakeBackend::new()
            .respond("/dynamic-link-analytics/", 200, "{}")
            .respond("/dynamic-link/abc123", 500, "upstream down"),
        CountingReferrer::with_link(REFERRAL_LINK),
        Arc::new(FileStore::open(dir.path()).await.unwrap()),
    );
    first.service.initialize(None, "com.example").await.await.unwrap();

    let record = first.service.get_referral_info().await;
    assert_eq!(record.status, AttributionStatus::Unknown);
    assert_eq!(record.message, "Failed to fetch referral link: upstream down");
    assert_eq!(
        record.to_payload()["data"],
        json!({ "referralLink": "https://go.example.com/abc123" })
    );

    let events = first.finish().await;
    assert!(matches!(
        events.as_slice(),
        [ObserverEvent::ReferralReady { .. }]
    ));

    let store = FileStore::open(dir.path()).await.unwrap();
    assert!(
        store
            .get(REFERRAL_NAMESPACE, REFERRAL_DETAILS_KEY)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn test_unsupported_referrer_leaves_install_uncounted() {
    let store = Arc::new(MemoryStore::new());
    let engine = common::create_test_engine(
        resolving_backend(),
        CountingReferrer::new(ReferrerOutcome::Unsupported),
        store.clone(),
    );
    let backend = engine.backend.clone();
    let referrer = engine.referrer.clone();

    engine.service.initialize(None, "com.example").await.await.unwrap();
    engine.finish().await;

    assert_eq!(referrer.calls(), 1);
    assert!(backend.requests().is_empty());
    assert!(
        !read_flag(store.as_ref(), ANALYTICS_NAMESPACE, APP_INSTALLED_KEY)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_referrer_without_link_marks_installed_without_network() {
    let store = Arc::new(MemoryStore::new());
    let engine = common::create_test_engine(
        resolving_backend(),
        CountingReferrer::new(ReferrerOutcome::Ok("utm_source=google-play".into())),
        store.clone(),
    );
    let backend = engine.backend.clone();

    engine.service.initialize(None, "com.example").await.await.unwrap();
    let events = engine.finish().await;

    assert!(events.is_empty());
    assert!(backend.requests().is_empty());
    assert!(
        read_flag(store.as_ref(), ANALYTICS_NAMESPACE, APP_INSTALLED_KEY)
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn test_referral_lookup_returns_when_referrer_unavailable() {
    let engine = common::create_test_engine(
        resolving_backend(),
        CountingReferrer::new(ReferrerOutcome::Unavailable),
        Arc::new(MemoryStore::new()),
    );
    let backend = engine.backend.clone();

    let install = engine.service.initialize(None, "com.example").await;
    let record = engine
        .service
        .get_referral_info_timeout(Duration::from_secs(1))
        .await
        .expect("referral lookup must not wait for a producer that never runs");
    install.await.unwrap();

    assert_eq!(record.status, AttributionStatus::Unknown);
    assert_eq!(record.message, "Install referrer service unavailable.");
    assert!(record.referral_link.is_empty());
    assert!(backend.requests().is_empty());
    assert!(engine.finish().await.is_empty());
}

#[tokio::test]
async fn test_failed_resolution_settles_next_start() {
    let dir = TempDir::new().unwrap();

    let first = common::create_test_engine(
        FakeBackend::new()
            .respond("/dynamic-link-analytics/", 200, "{}")
            .respond("/dynamic-link/abc123", 500, "upstream down"),
        CountingReferrer::with_link(REFERRAL_LINK),
        Arc::new(FileStore::open(dir.path()).await.unwrap()),
    );
    first.service.initialize(None, "com.example").await.await.unwrap();
    first.finish().await;

    let restarted = common::create_test_engine(
        resolving_backend(),
        CountingReferrer::with_link(REFERRAL_LINK),
        Arc::new(FileStore::open(dir.path()).await.unwrap()),
    );
    let backend = restarted.backend.clone();

    restarted.service.initialize(None, "com.example").await.await.unwrap();
    let record = restarted
        .service
        .get_referral_info_timeout(Duration::from_secs(1))
        .await
        .expect("installed app without a cached referral must not hang");

    assert_eq!(record.status, AttributionStatus::NotFound);
    assert_eq!(record.message, "No referral data found");
    assert!(backend.requests().is_empty());
    restarted.finish().await;
}
