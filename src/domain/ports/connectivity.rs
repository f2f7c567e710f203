//! Shared connectivity flag.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Whether the device currently has network connectivity.
///
/// Maintained by an external network watcher; read before each lookup so a
/// known-offline device does not wait for a transport timeout.
#[derive(Debug, Clone)]
pub struct ConnectivityFlag {
    connected: Arc<AtomicBool>,
}

impl ConnectivityFlag {
    pub fn new(connected: bool) -> Self {
        Self {
            connected: Arc::new(AtomicBool::new(connected)),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    pub fn set_connected(&self, connected: bool) {
        self.connected.store(connected, Ordering::Release);
    }
}

impl Default for ConnectivityFlag {
    fn default() -> Self {
        Self::new(true)
    }
}
