//! # AppLink
//!
//! Deep link attribution engine: turns an inbound application link (a URI delivered
//! to the app at launch or resume) into attribution data describing why the app was
//! opened, and whether the open is a first install driven by that link.
//!
//! ## Architecture
//!
//! The crate follows the same layering as a service backend:
//!
//! - **Domain Layer** ([`domain`]) - Link events, attribution results, referral records,
//!   the link classifier and the port traits for external collaborators
//! - **Application Layer** ([`application`]) - Attribution client, install tracking,
//!   referral resolution, fallback navigation and observer dispatch
//! - **Infrastructure Layer** ([`infrastructure`]) - HTTP transport, key-value storage,
//!   referrer sources, connectivity and link openers
//!
//! ## Flows
//!
//! - **Deep link dispatch** - every inbound link is classified, counted (fire-and-forget)
//!   and resolved; the result is delivered to the registered observer.
//! - **Install tracking** - once per install the platform referrer is consumed, the
//!   install is counted and the referral link is resolved and cached.
//! - **Referral lookup** - [`application::services::AppLinkService::get_referral_info`]
//!   returns the cached referral record or waits for the in-flight resolution.
//!
//! ## Configuration
//!
//! Runtime configuration is loaded from environment variables via [`config::Config`].

pub mod application;
pub mod config;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod runtime;
pub mod telemetry;
pub mod utils;

pub use error::AppLinkError;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::dispatcher::{ObserverDispatcher, ObserverEvent};
    pub use crate::application::services::{
        AppLinkService, AttributionClient, FallbackNavigator, InstallTracker, ReferralResolver,
    };
    pub use crate::domain::entities::{
        AttributionResult, AttributionStatus, LinkCountEvent, LinkEvent, NewAppLink,
        ReferralLink, ReferralRecord,
    };
    pub use crate::domain::ports::{
        AppLinkObserver, ConnectivityFlag, HttpClient, LinkOpener, ReferrerOutcome,
        ReferrerSource, Store,
    };
    pub use crate::error::AppLinkError;
}
