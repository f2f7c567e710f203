//! One-time install referrer accounting.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::application::services::{AttributionClient, ReferralResolver};
use crate::domain::entities::referral::NO_REFERRAL_DATA;
use crate::domain::entities::{AttributionStatus, LinkCountEvent, ReferralLink, ReferralRecord};
use crate::domain::ports::store::{ANALYTICS_NAMESPACE, APP_INSTALLED_KEY, read_flag, write_flag};
use crate::domain::ports::{ReferrerOutcome, ReferrerSource, Store};
use crate::error::StoreError;
use crate::utils::url_recovery::{
    ensure_scheme, last_path_segment, query_string_param, recover_link,
};

/// Referrer parameter carrying the attribution link.
pub const REFERRER_LINK_PARAM: &str = "appsonair_app_link";

/// Result of an install tracking run.
#[derive(Debug, Clone)]
pub enum InstallOutcome {
    /// First run of this install. `referral` is the resolved (or best-effort) record
    /// when the referrer carried a usable link.
    FirstInstall {
        referral: Option<Arc<ReferralRecord>>,
    },
    /// The install was already counted by an earlier run.
    AlreadyInstalled,
    /// The referrer could not be read; nothing was counted.
    ReferrerFailed(String),
}

/// Consumes the platform install referrer exactly once per install.
///
/// # Flow
///
/// 1. Fetch the referrer; unsupported/unavailable sources end the run.
/// 2. Extract `appsonair_app_link` from the referrer query string.
/// 3. If the install was not yet counted: mark it counted **first**, then, when the
///    link yields both a link id and a domain, report the install and resolve the
///    referral through the [`ReferralResolver`].
/// 4. Otherwise preload the referral cached by the earlier run.
/// 5. Runs that resolve nothing settle the resolver with a record that is not persisted.
///
/// Marking before reporting means a crash mid-flow can lose the install report but
/// can never count it twice.
pub struct InstallTracker {
    source: Arc<dyn ReferrerSource>,
    store: Arc<dyn Store>,
    client: Arc<AttributionClient>,
    resolver: Arc<ReferralResolver>,
}

impl InstallTracker {
    pub fn new(
        source: Arc<dyn ReferrerSource>,
        store: Arc<dyn Store>,
        client: Arc<AttributionClient>,
        resolver: Arc<ReferralResolver>,
    ) -> Self {
        Self {
            source,
            store,
            client,
            resolver,
        }
    }

    /// Runs install tracking.
    ///
    /// `callback` receives the recovered referral link (empty when none), or a
    /// human-readable description when the referrer could not be read. Every run
    /// that does not resolve a link settles the [`ReferralResolver`], so waiters
    /// are never left without a producer.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the install flag cannot be read or written. No
    /// report or lookup is made in that case.
    pub async fn track<F>(&self, callback: F) -> Result<InstallOutcome, StoreError>
    where
        F: FnOnce(&str) + Send,
    {
        let raw_referrer = match self.source.fetch().await {
            ReferrerOutcome::Ok(raw) => raw,
            failure => {
                let message = failure.failure_message().unwrap_or_default().to_string();
                warn!(message = %message, "Install referrer not available");
                callback(&message);
                self.resolver
                    .settle(AttributionStatus::Unknown, message.clone())
                    .await;
                return Ok(InstallOutcome::ReferrerFailed(message));
            }
        };

        let referral = parse_referrer(&raw_referrer);
        let outcome = self.record_install(referral, callback).await;
        if let Err(e) = &outcome {
            self.resolver
                .settle(AttributionStatus::Unknown, e.to_string())
                .await;
        }
        outcome
    }

    async fn record_install<F>(
        &self,
        referral: Option<ReferralLink>,
        callback: F,
    ) -> Result<InstallOutcome, StoreError>
    where
        F: FnOnce(&str) + Send,
    {
        let store = self.store.as_ref();

        if read_flag(store, ANALYTICS_NAMESPACE, APP_INSTALLED_KEY).await? {
            debug!("Install already counted");
            self.resolver
                .settle(AttributionStatus::NotFound, NO_REFERRAL_DATA)
                .await;
            callback(referral.as_ref().map_or("", |link| link.uri.as_str()));
            return Ok(InstallOutcome::AlreadyInstalled);
        }

        write_flag(store, ANALYTICS_NAMESPACE, APP_INSTALLED_KEY, true).await?;
        info!(has_referral = referral.is_some(), "First install recorded");
        callback(referral.as_ref().map_or("", |link| link.uri.as_str()));

        let Some(link) = referral else {
            self.resolver
                .settle(AttributionStatus::NotFound, NO_REFERRAL_DATA)
                .await;
            return Ok(InstallOutcome::FirstInstall { referral: None });
        };

        if let Err(e) = self
            .client
            .report_link_count(LinkCountEvent::install(&link.link_id, &link.domain))
        {
            warn!(error = %e, "Install count not reported");
        }

        let record = self.resolver.resolve_and_complete(&link).await;
        Ok(InstallOutcome::FirstInstall {
            referral: Some(record),
        })
    }
}

/// Extracts the attribution link from a raw install referrer string.
///
/// Returns `None` when the parameter is absent or the link lacks a domain or a
/// link id.
///
/// # Examples
///
/// ```ignore
/// let link = parse_referrer("utm_source=x&appsonair_app_link=go.example.com%2Fabc").unwrap();
/// assert_eq!(link.domain, "go.example.com");
/// assert_eq!(link.link_id, "abc");
/// assert_eq!(link.uri, "https://go.example.com/abc");
/// ```
pub fn parse_referrer(raw_referrer: &str) -> Option<ReferralLink> {
    let raw_link = query_string_param(raw_referrer, REFERRER_LINK_PARAM)?;
    let raw_link = raw_link.trim();
    if raw_link.is_empty() {
        return None;
    }

    let url = recover_link(raw_link).ok()?;
    let domain = url.host_str().filter(|host| !host.is_empty())?.to_string();
    let link_id = last_path_segment(&url)?;

    Some(ReferralLink::new(link_id, domain, ensure_scheme(raw_link)))
}
