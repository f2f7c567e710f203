//! Cached, get-or-wait resolution of the install referral.
//!
//! # States
//!
//! ```text
//! Unresolved ──get()──────────────▶ Resolving ──resolve_and_complete()──▶ Resolved
//!     │                                                                      ▲
//!     └──get() finds a cached record in storage (CachedFromDisk) ────────────┘
//! ```
//!
//! `get()` never starts a lookup. The install tracker is the only producer: it calls
//! [`ReferralResolver::resolve_and_complete`] once per install, or
//! [`ReferralResolver::settle`] when this run will not resolve anything.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tracing::{debug, info, warn};

use crate::application::services::AttributionClient;
use crate::domain::entities::{AttributionStatus, ReferralLink, ReferralRecord};
use crate::domain::entities::referral::NO_REFERRAL_DATA;
use crate::domain::pending_resolution::PendingResolution;
use crate::domain::ports::Store;
use crate::domain::ports::store::{REFERRAL_DETAILS_KEY, REFERRAL_NAMESPACE, read_json, write_json};

#[derive(Default)]
struct ResolverState {
    record: Option<Arc<ReferralRecord>>,
    pending: Option<PendingResolution>,
}

/// Owner of the install referral record.
///
/// The record is published once, in memory first and then in storage, and never
/// mutated afterwards. Concurrent `get()` callers only read the published record or
/// attach to the pending resolution; the producer is the single writer.
pub struct ReferralResolver {
    client: Arc<AttributionClient>,
    store: Arc<dyn Store>,
    state: RwLock<ResolverState>,
}

impl ReferralResolver {
    pub fn new(client: Arc<AttributionClient>, store: Arc<dyn Store>) -> Self {
        Self {
            client,
            store,
            state: RwLock::new(ResolverState::default()),
        }
    }

    /// Returns the referral record, waiting for the in-flight resolution if needed.
    ///
    /// 1. In-memory record: returned immediately.
    /// 2. Record cached by a previous run: adopted and returned.
    /// 3. Otherwise attaches to the pending resolution, creating it if this is the
    ///    first waiter, and suspends until the producer completes it.
    pub async fn get(&self) -> Arc<ReferralRecord> {
        if let Some(record) = self.current().await {
            return record;
        }

        if let Some(record) = self.load_cached().await {
            return record;
        }

        let pending = {
            let mut state = self.state.write().await;
            if let Some(record) = &state.record {
                return record.clone();
            }
            state
                .pending
                .get_or_insert_with(|| {
                    debug!("Waiting for referral resolution");
                    PendingResolution::new()
                })
                .clone()
        };

        pending.wait().await
    }

    /// Like [`Self::get`], giving up after `timeout`.
    pub async fn get_with_timeout(&self, timeout: Duration) -> Option<Arc<ReferralRecord>> {
        tokio::time::timeout(timeout, self.get()).await.ok()
    }

    /// Returns the in-memory record without waiting or touching storage.
    pub async fn current(&self) -> Option<Arc<ReferralRecord>> {
        self.state.read().await.record.clone()
    }

    /// Loads the record cached by a previous run, publishing it in memory.
    ///
    /// Unreadable entries are logged and treated as absent.
    pub async fn load_cached(&self) -> Option<Arc<ReferralRecord>> {
        let cached = match read_json::<ReferralRecord>(
            self.store.as_ref(),
            REFERRAL_NAMESPACE,
            REFERRAL_DETAILS_KEY,
        )
        .await
        {
            Ok(cached) => cached?,
            Err(e) => {
                warn!(error = %e, "Failed to read cached referral");
                return None;
            }
        };

        let mut state = self.state.write().await;
        let record = state.record.get_or_insert_with(|| Arc::new(cached)).clone();
        if let Some(pending) = state.pending.take() {
            pending.complete(record.clone());
        }
        debug!(link_id = %record.link_id, "Referral loaded from cache");
        Some(record)
    }

    /// Completes the pending resolution when no lookup will run in this process.
    ///
    /// A record cached by a previous run wins. Otherwise a record without a link,
    /// carrying `status` and `message`, is published in memory only. A record
    /// already published is left untouched.
    pub async fn settle(
        &self,
        status: AttributionStatus,
        message: impl Into<String>,
    ) -> Arc<ReferralRecord> {
        if let Some(record) = self.load_cached().await {
            return record;
        }

        let (record, pending) = {
            let mut state = self.state.write().await;
            let record = state
                .record
                .get_or_insert_with(|| Arc::new(ReferralRecord::without_link(status, message)))
                .clone();
            (record, state.pending.take())
        };

        debug!(
            status = record.status.as_str(),
            message = %record.message,
            "Referral settled without lookup"
        );
        if let Some(pending) = pending {
            pending.complete(record.clone());
        }
        record
    }

    /// Resolves the referral link and completes the pending resolution.
    ///
    /// On success the record (backend `data` with `referralLink` merged in) is
    /// published in memory, then persisted. Otherwise waiters receive a best-effort
    /// record holding only the referral link and a message; it is kept in memory for
    /// this process but not persisted.
    pub async fn resolve_and_complete(&self, link: &ReferralLink) -> Arc<ReferralRecord> {
        let result = self.client.resolve(&link.link_id, &link.domain).await;

        let (record, persist) = match result.data() {
            Some(data) => (Arc::new(ReferralRecord::resolved(link, data)), true),
            None if result.is_ok() => (
                Arc::new(ReferralRecord::best_effort(
                    link,
                    AttributionStatus::NotFound,
                    NO_REFERRAL_DATA,
                )),
                false,
            ),
            None => (
                Arc::new(ReferralRecord::best_effort(
                    link,
                    result.status,
                    format!("Failed to fetch referral link: {}", result.message),
                )),
                false,
            ),
        };

        let pending = {
            let mut state = self.state.write().await;
            state.record = Some(record.clone());
            state.pending.take()
        };

        if persist {
            if let Err(e) = write_json(
                self.store.as_ref(),
                REFERRAL_NAMESPACE,
                REFERRAL_DETAILS_KEY,
                record.as_ref(),
            )
            .await
            {
                warn!(error = %e, link_id = %link.link_id, "Failed to persist referral");
            }
            info!(link_id = %link.link_id, domain = %link.domain, "Referral resolved");
        } else {
            warn!(
                link_id = %link.link_id,
                status = result.status.as_str(),
                message = %record.message,
                "Referral not resolved"
            );
        }

        if let Some(pending) = pending {
            pending.complete(record.clone());
        }

        record
    }
}
