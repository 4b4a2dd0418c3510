use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::string_enum;
use crate::api;

/// The status of an [`api::Challenge`].
///
/// See [RFC 8555 §7.1.6].
///
/// [RFC 8555 §7.1.6]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChallengeStatus {
    Pending,
    Processing,
    Valid,
    Invalid,
}

string_enum! {
    /// The validation method of a challenge.
    pub enum ChallengeType {
        /// Publish the key authorization under `/.well-known/acme-challenge/<token>` over HTTP.
        Http01 => "http-01",
        /// Publish the digest of the key authorization in a `TXT` record.
        Dns01 => "dns-01",
        /// Serve a self-signed certificate over TLS with the `acme-tls/1` ALPN protocol.
        TlsAlpn01 => "tls-alpn-01",
        /// Post a device attestation statement over the key authorization.
        DeviceAttest01 => "device-attest-01",
    }
}

/// An ACME challenge object.
///
/// Represents a server's offer to validate a client's possession of an identifier in a specific
/// way.
///
/// See [RFC 8555 §7.1.5].
///
/// # Example JSON
///
/// ```json
/// {
///   "type": "http-01",
///   "status": "pending",
///   "url": "https://acme-staging-v02.api.letsencrypt.org/acme/challenge/YTqpYUthlVfwBncUufE8IRA2TkzZkN4eYWWLMSRqcSs/216789597",
///   "token": "MUi-gqeOJdRkSb_YR2eaMxQBqf6al8dgt_dOttSWb0w"
/// }
/// ```
///
/// [RFC 8555 §7.1.5]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.5
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Challenge {
    /// Type of challenge encoded in the object.
    #[serde(rename = "type")]
    pub _type: ChallengeType,

    /// URL to which a response can be posted.
    pub url: String,

    /// Status of this challenge.
    pub status: ChallengeStatus,

    /// Time at which the server validated this challenge.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub validated: Option<OffsetDateTime>,

    /// Error that occurred while the server was validating the challenge, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<api::Problem>,

    #[serde(default)]
    pub token: String,
}

impl Challenge {
    /// Returns true while the challenge can still be answered.
    pub fn need_validate(&self) -> bool {
        matches!(
            self.status,
            ChallengeStatus::Pending | ChallengeStatus::Invalid
        )
    }
}

/// Payload answering a `device-attest-01` challenge.
///
/// `attObj` is the base64url encoded WebAuthn attestation object over the key authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Attestation {
    pub att_obj: String,
}

impl Attestation {
    pub fn new(att_obj: impl Into<String>) -> Self {
        Self {
            att_obj: att_obj.into(),
        }
    }
}
