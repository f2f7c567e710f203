//! Referral entities produced by the install flow.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use super::AttributionStatus;

/// Message stored with a successfully resolved referral.
pub const REFERRAL_FETCHED: &str = "Referral link fetched successfully!";
/// Message stored when the backend answered without a `data` object.
pub const NO_REFERRAL_DATA: &str = "No referral data found";

/// The link recovered from the install referrer, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferralLink {
    pub link_id: String,
    pub domain: String,
    /// The recovered link as a string, carried into the resolved record.
    pub uri: String,
}

impl ReferralLink {
    pub fn new(
        link_id: impl Into<String>,
        domain: impl Into<String>,
        uri: impl Into<String>,
    ) -> Self {
        Self {
            link_id: link_id.into(),
            domain: domain.into(),
            uri: uri.into(),
        }
    }
}

/// Resolved attribution for the link that drove the install.
///
/// Written at most once per install and cached under `Referral/referral_details`.
/// Never mutated after it is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferralRecord {
    pub link_id: String,
    pub domain: String,
    pub referral_link: String,
    /// The backend `data` object with `referralLink` merged in.
    pub attribution_payload: Map<String, Value>,
    pub status: AttributionStatus,
    pub message: String,
    pub fetched_at_epoch: i64,
}

impl ReferralRecord {
    /// Builds a record from a successful lookup.
    ///
    /// The referral URI is merged into `data` as `referralLink`.
    pub fn resolved(link: &ReferralLink, data: &Map<String, Value>) -> Self {
        let mut payload = data.clone();
        payload.insert("referralLink".to_string(), Value::String(link.uri.clone()));

        Self {
            link_id: link.link_id.clone(),
            domain: link.domain.clone(),
            referral_link: link.uri.clone(),
            attribution_payload: payload,
            status: AttributionStatus::Ok,
            message: REFERRAL_FETCHED.to_string(),
            fetched_at_epoch: Utc::now().timestamp(),
        }
    }

    /// Builds the record delivered to waiters when resolution did not succeed.
    ///
    /// Only the referral URI is known; `message` explains what went wrong.
    pub fn best_effort(
        link: &ReferralLink,
        status: AttributionStatus,
        message: impl Into<String>,
    ) -> Self {
        let mut payload = Map::new();
        payload.insert("referralLink".to_string(), Value::String(link.uri.clone()));

        Self {
            link_id: link.link_id.clone(),
            domain: link.domain.clone(),
            referral_link: link.uri.clone(),
            attribution_payload: payload,
            status,
            message: message.into(),
            fetched_at_epoch: Utc::now().timestamp(),
        }
    }

    /// Builds the record delivered when no referral link is known at all, e.g. the
    /// referrer could not be read or carried no attribution link.
    pub fn without_link(status: AttributionStatus, message: impl Into<String>) -> Self {
        Self {
            link_id: String::new(),
            domain: String::new(),
            referral_link: String::new(),
            attribution_payload: Map::new(),
            status,
            message: message.into(),
            fetched_at_epoch: Utc::now().timestamp(),
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.status == AttributionStatus::Ok
    }

    /// Payload handed to observers: `{"data": {...}, "message": "..."}`.
    pub fn to_payload(&self) -> Value {
        json!({
            "data": self.attribution_payload,
            "message": self.message,
        })
    }
}
