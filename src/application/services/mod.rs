//! Link handling services for the application layer.

pub mod app_link_service;
pub mod attribution_client;
pub mod fallback_navigator;
pub mod install_tracker;
pub mod referral_resolver;

pub use app_link_service::AppLinkService;
pub use attribution_client::AttributionClient;
pub use fallback_navigator::{FallbackAction, FallbackError, FallbackNavigator};
pub use install_tracker::{InstallOutcome, InstallTracker};
pub use referral_resolver::ReferralResolver;
