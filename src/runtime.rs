//! Composition root: wires configuration, adapters and services together.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::application::dispatcher::ObserverDispatcher;
use crate::application::services::{AppLinkService, AttributionClient};
use crate::config::Config;
use crate::domain::ports::{AppLinkObserver, ConnectivityFlag, LinkOpener, ReferrerSource};
use crate::infrastructure::http::ReqwestHttpClient;
use crate::infrastructure::opener::{CommandOpener, LoggingOpener};
use crate::infrastructure::storage::FileStore;

/// A running engine and the tasks it owns.
pub struct Runtime {
    service: AppLinkService,
    store: FileStore,
    connectivity: ConnectivityFlag,
    observer_worker: JoinHandle<()>,
}

impl Runtime {
    /// Builds the engine from configuration.
    ///
    /// The referrer source and the observer are supplied by the host; everything
    /// else is derived from `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the store directory
    /// cannot be created.
    pub async fn build(
        config: &Config,
        referrer: Arc<dyn ReferrerSource>,
        observer: Arc<dyn AppLinkObserver>,
    ) -> Result<Self> {
        let http = ReqwestHttpClient::new(config.http_timeout())
            .context("Failed to initialize HTTP transport")?;

        let store = FileStore::open(&config.store_dir)
            .await
            .with_context(|| format!("Failed to open store at {}", config.store_dir.display()))?;

        let connectivity = ConnectivityFlag::new(!config.offline);
        if config.offline {
            warn!("Starting offline: lookups will not reach the backend");
        }

        let client = Arc::new(AttributionClient::new(
            Arc::new(http),
            config.base_url.clone(),
            config.app_id.clone(),
            connectivity.clone(),
        ));

        let opener: Arc<dyn LinkOpener> = if config.fallback_opener.is_empty() {
            Arc::new(LoggingOpener)
        } else {
            Arc::new(CommandOpener::new(config.fallback_opener.clone()))
        };

        let (dispatcher, observer_worker) = ObserverDispatcher::spawn(observer);
        let service = AppLinkService::new(
            client,
            Arc::new(store.clone()),
            referrer,
            opener,
            dispatcher,
        );

        info!("✓ Engine ready");

        Ok(Self {
            service,
            store,
            connectivity,
            observer_worker,
        })
    }

    pub fn service(&self) -> &AppLinkService {
        &self.service
    }

    pub fn store(&self) -> &FileStore {
        &self.store
    }

    /// Connectivity flag to be maintained by the host's network watcher.
    pub fn connectivity(&self) -> &ConnectivityFlag {
        &self.connectivity
    }

    /// Waits for pending reports, then for every queued observer callback.
    ///
    /// # Errors
    ///
    /// Returns an error if the observer worker panicked.
    pub async fn shutdown(self) -> Result<()> {
        self.service.flush_reports().await;
        drop(self.service);

        self.observer_worker
            .await
            .context("Observer worker terminated abnormally")?;

        info!("Engine stopped");
        Ok(())
    }
}
