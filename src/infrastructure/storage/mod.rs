//! Key-value storage for install flags and cached referrals.
//!
//! Provides two [`crate::domain::ports::Store`] implementations:
//! - [`FileStore`] - One file per key under a root directory, survives restarts
//! - [`MemoryStore`] - In-process map for tests and ephemeral sessions

mod file_store;
mod memory_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;

use crate::error::StoreError;

/// Rejects names that could escape the storage root or collide with temp files.
fn validate_name(name: &str) -> Result<(), StoreError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));

    if valid {
        Ok(())
    } else {
        Err(StoreError::InvalidKey(name.to_string()))
    }
}
