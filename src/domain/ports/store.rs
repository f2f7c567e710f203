//! Persistent key-value storage port.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};

use crate::error::StoreError;

/// Namespace of the install accounting flag.
pub const ANALYTICS_NAMESPACE: &str = "AnalyticsData";
/// Key of the durable "install already counted" flag.
pub const APP_INSTALLED_KEY: &str = "isAppInstalled";
/// Namespace of the cached referral record.
pub const REFERRAL_NAMESPACE: &str = "Referral";
/// Key of the cached referral record.
pub const REFERRAL_DETAILS_KEY: &str = "referral_details";

/// Durable byte storage grouped in namespaces.
///
/// A successful `put` must be visible to every later `get`, including after a
/// process restart.
///
/// # Implementations
///
/// - [`crate::infrastructure::storage::FileStore`] - One file per key on disk
/// - [`crate::infrastructure::storage::MemoryStore`] - In-process map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, namespace: &str, key: &str) -> Result<Option<Vec<u8>>, StoreError>;

    async fn put(&self, namespace: &str, key: &str, value: Vec<u8>) -> Result<(), StoreError>;

    /// Removes a key. Removing a missing key is not an error.
    async fn remove(&self, namespace: &str, key: &str) -> Result<(), StoreError>;
}

/// Reads a boolean flag, `false` when unset.
pub async fn read_flag(store: &dyn Store, namespace: &str, key: &str) -> Result<bool, StoreError> {
    Ok(store
        .get(namespace, key)
        .await?
        .is_some_and(|bytes| bytes.as_slice() == b"true"))
}

pub async fn write_flag(
    store: &dyn Store,
    namespace: &str,
    key: &str,
    value: bool,
) -> Result<(), StoreError> {
    let bytes = if value { b"true".to_vec() } else { b"false".to_vec() };
    store.put(namespace, key, bytes).await
}

/// Reads and decodes a JSON value. Missing or empty entries are `None`.
pub async fn read_json<T: DeserializeOwned>(
    store: &dyn Store,
    namespace: &str,
    key: &str,
) -> Result<Option<T>, StoreError> {
    match store.get(namespace, key).await? {
        Some(bytes) if !bytes.is_empty() => Ok(Some(serde_json::from_slice(&bytes)?)),
        _ => Ok(None),
    }
}

pub async fn write_json<T: Serialize + Sync>(
    store: &dyn Store,
    namespace: &str,
    key: &str,
    value: &T,
) -> Result<(), StoreError> {
    let bytes = serde_json::to_vec(value)?;
    store.put(namespace, key, bytes).await
}
