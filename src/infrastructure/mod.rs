//! Infrastructure layer for external integrations.
//!
//! This layer implements the ports defined by the domain layer, providing
//! concrete transports, storage and platform adapters.
//!
//! # Modules
//!
//! - [`http`] - `reqwest`-backed HTTP transport
//! - [`storage`] - Key-value storage (file-backed and in-memory implementations)
//! - [`referrer`] - Install referrer sources
//! - [`opener`] - Link openers for fallback navigation

pub mod http;
pub mod opener;
pub mod referrer;
pub mod storage;
