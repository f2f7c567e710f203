//! Application layer orchestrating the attribution flows.
//!
//! Services consume the domain ports and provide the API used by the host
//! application.
//!
//! # Available Services
//!
//! - [`services::AttributionClient`] - Link lookup, link counting and link creation
//! - [`services::InstallTracker`] - One-time install referrer accounting
//! - [`services::ReferralResolver`] - Cached, get-or-wait referral resolution
//! - [`services::FallbackNavigator`] - Fallback destination when link handling fails
//! - [`services::AppLinkService`] - Facade tying the flows together
//! - [`dispatcher`] - Sequential delivery of observer callbacks

pub mod dispatcher;
pub mod services;
