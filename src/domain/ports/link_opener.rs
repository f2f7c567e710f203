//! Port for handing a URL to the platform.

use url::Url;

use crate::error::OpenError;

/// Opens a URL outside the application (browser, store page, ...).
#[cfg_attr(test, mockall::automock)]
pub trait LinkOpener: Send + Sync {
    fn open(&self, url: &Url) -> Result<(), OpenError>;
}
