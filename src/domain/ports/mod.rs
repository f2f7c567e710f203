//! Port traits for the engine's external collaborators.
//!
//! These traits abstract the HTTP transport, durable storage, the platform install
//! referrer, the link opener and the UI observer. Concrete implementations live in
//! `crate::infrastructure`; mock implementations are auto-generated via `mockall`
//! for unit tests.

pub mod connectivity;
pub mod http_client;
pub mod link_opener;
pub mod observer;
pub mod referrer_source;
pub mod store;

pub use connectivity::ConnectivityFlag;
pub use http_client::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
pub use link_opener::LinkOpener;
pub use observer::AppLinkObserver;
pub use referrer_source::{ReferrerOutcome, ReferrerSource};
pub use store::Store;

#[cfg(test)]
pub use http_client::MockHttpClient;
#[cfg(test)]
pub use link_opener::MockLinkOpener;
#[cfg(test)]
pub use referrer_source::MockReferrerSource;
#[cfg(test)]
pub use store::MockStore;
