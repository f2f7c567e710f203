//! Domain layer containing the attribution model and the link classifier.
//!
//! The domain layer has no dependencies on the transport, storage or platform
//! adapters; those are reached through the traits in [`ports`].
//!
//! # Architecture
//!
//! - [`entities`] - Link events, attribution results, referral records
//! - [`classifier`] - Inbound link classification
//! - [`pending_resolution`] - Broadcast-once cell for the in-flight referral lookup
//! - [`ports`] - Trait definitions for external collaborators

pub mod classifier;
pub mod entities;
pub mod pending_resolution;
pub mod ports;
