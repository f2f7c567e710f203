//! Utility functions shared by the classifier and the install tracker.
//!
//! - [`url_recovery`] - Scheme recovery, path segment and query parameter extraction

pub mod url_recovery;
