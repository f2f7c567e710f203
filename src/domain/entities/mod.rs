//! Core domain entities representing the attribution data model.
//!
//! Entities are plain data structures; the logic that produces them lives in the
//! classifier and the application services.
//!
//! # Entity Types
//!
//! - [`LinkEvent`] - A classified inbound link
//! - [`LinkCountEvent`] - Analytics body for click/first-open/install accounting
//! - [`AttributionResult`] - Structured outcome of a backend request
//! - [`ReferralLink`] / [`ReferralRecord`] - The install-driving link and its resolved attribution
//! - [`NewAppLink`] - Input for creating a link on the backend

pub mod app_link;
pub mod attribution;
pub mod link_count;
pub mod link_event;
pub mod referral;

pub use app_link::NewAppLink;
pub use attribution::{AttributionResult, AttributionStatus};
pub use link_count::LinkCountEvent;
pub use link_event::LinkEvent;
pub use referral::{ReferralLink, ReferralRecord};
