//! Broadcast-once cell for an in-flight referral resolution.

use std::sync::Arc;
use tokio::sync::{Notify, OnceCell};

use crate::domain::entities::ReferralRecord;

struct Inner {
    cell: OnceCell<Arc<ReferralRecord>>,
    notify: Notify,
}

/// A single-completion future of a [`ReferralRecord`].
///
/// Any number of waiters may attach through [`PendingResolution::wait`]; the first
/// call to [`PendingResolution::complete`] stores the record and wakes all of them.
/// Every waiter receives the same `Arc`. Later completions are ignored.
#[derive(Clone)]
pub struct PendingResolution {
    inner: Arc<Inner>,
}

impl PendingResolution {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Inner {
                cell: OnceCell::new(),
                notify: Notify::new(),
            }),
        }
    }

    /// Completes the resolution.
    ///
    /// Returns `false` if it was already completed; the stored record is unchanged.
    pub fn complete(&self, record: Arc<ReferralRecord>) -> bool {
        if self.inner.cell.set(record).is_err() {
            return false;
        }
        self.inner.notify.notify_waiters();
        true
    }

    pub fn is_completed(&self) -> bool {
        self.inner.cell.initialized()
    }

    /// Waits until the resolution completes and returns the record.
    ///
    /// Returns immediately if already completed.
    pub async fn wait(&self) -> Arc<ReferralRecord> {
        loop {
            // Registered before the check so a completion in between is not missed.
            let notified = self.inner.notify.notified();
            if let Some(record) = self.inner.cell.get() {
                return record.clone();
            }
            notified.await;
        }
    }

    /// Returns true if both handles refer to the same resolution.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl Default for PendingResolution {
    fn default() -> Self {
        Self::new()
    }
}
