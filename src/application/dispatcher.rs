//! Foreground delivery of observer callbacks.
//!
//! Network work runs on background tasks; results are funneled through an
//! unbounded channel into a single worker task that invokes the observer. This keeps
//! observer callbacks sequential regardless of how many flows complete at once.

use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::domain::ports::AppLinkObserver;

/// A callback queued for the observer.
#[derive(Debug, Clone, PartialEq)]
pub enum ObserverEvent {
    Resolved { uri: String, payload: Value },
    Error { uri: Option<String>, message: String },
    ReferralReady { payload: Value },
}

/// Sending half of the observer channel. Cheap to clone.
#[derive(Debug, Clone)]
pub struct ObserverDispatcher {
    tx: mpsc::UnboundedSender<ObserverEvent>,
}

impl ObserverDispatcher {
    /// Creates a dispatcher and spawns the worker delivering to `observer`.
    ///
    /// The worker exits once every dispatcher clone is dropped and the queue is drained.
    pub fn spawn(observer: Arc<dyn AppLinkObserver>) -> (Self, JoinHandle<()>) {
        let (dispatcher, rx) = Self::channel();
        let worker = tokio::spawn(run_observer_worker(rx, observer));
        (dispatcher, worker)
    }

    /// Creates a dispatcher with the raw receiving half, without a worker.
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<ObserverEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }

    pub fn resolved(&self, uri: impl Into<String>, payload: Value) {
        self.send(ObserverEvent::Resolved {
            uri: uri.into(),
            payload,
        });
    }

    pub fn error(&self, uri: Option<String>, message: impl Into<String>) {
        self.send(ObserverEvent::Error {
            uri,
            message: message.into(),
        });
    }

    pub fn referral_ready(&self, payload: Value) {
        self.send(ObserverEvent::ReferralReady { payload });
    }

    fn send(&self, event: ObserverEvent) {
        if self.tx.send(event).is_err() {
            warn!("Observer worker stopped; event dropped");
        }
    }
}

/// Delivers queued events to the observer, one at a time, in arrival order.
pub async fn run_observer_worker(
    mut rx: mpsc::UnboundedReceiver<ObserverEvent>,
    observer: Arc<dyn AppLinkObserver>,
) {
    while let Some(event) = rx.recv().await {
        match event {
            ObserverEvent::Resolved { uri, payload } => observer.on_resolved(&uri, &payload),
            ObserverEvent::Error { uri, message } => observer.on_error(uri.as_deref(), &message),
            ObserverEvent::ReferralReady { payload } => observer.on_referral_ready(&payload),
        }
    }
    debug!("Observer worker finished");
}
