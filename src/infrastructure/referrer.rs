//! Install referrer sources.

use async_trait::async_trait;
use tracing::debug;

use crate::domain::ports::{ReferrerOutcome, ReferrerSource};

/// A referrer source answering every fetch with a fixed outcome.
///
/// Hosts without a platform referrer facility hand the referrer they obtained
/// elsewhere (a command line argument, an installer parameter) to this source.
/// Consuming it once per install is the install tracker's job: the persisted
/// install flag stops later runs from counting it again.
#[derive(Debug, Clone)]
pub struct StaticReferrerSource {
    outcome: ReferrerOutcome,
}

impl StaticReferrerSource {
    pub fn new(outcome: ReferrerOutcome) -> Self {
        Self { outcome }
    }

    /// A source answering with `raw_referrer`.
    pub fn referrer(raw_referrer: impl Into<String>) -> Self {
        Self::new(ReferrerOutcome::Ok(raw_referrer.into()))
    }

    /// A source for platforms without an install referrer facility.
    pub fn unsupported() -> Self {
        Self::new(ReferrerOutcome::Unsupported)
    }
}

#[async_trait]
impl ReferrerSource for StaticReferrerSource {
    async fn fetch(&self) -> ReferrerOutcome {
        debug!(outcome = ?self.outcome, "Install referrer requested");
        self.outcome.clone()
    }
}
