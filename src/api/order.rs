use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::api;

/// The status of an [`api::Order`].
///
/// `invalid` and `valid` are terminal.
///
/// See [RFC 8555 §7.1.6].
///
/// [RFC 8555 §7.1.6]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Some authorizations still need to be fulfilled.
    Pending,
    /// All authorizations are valid; the order awaits finalization.
    Ready,
    /// The CSR was accepted and the certificate is being issued.
    Processing,
    /// The certificate is issued and can be downloaded.
    Valid,
    /// The order failed and can't be used again.
    Invalid,
}

/// Payload posted to the `newOrder` endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub identifiers: Vec<api::Identifier>,

    /// Requested `notBefore` of the certificate. Let's Encrypt does not support this.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub not_before: Option<OffsetDateTime>,

    /// Requested `notAfter` of the certificate. Let's Encrypt does not support this.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub not_after: Option<OffsetDateTime>,
}

/// An ACME order object.
///
/// Represents a client's request for a certificate and is used to track the progress of that order
/// through to issuance.
///
/// See [RFC 8555 §7.1.3].
///
/// [RFC 8555 §7.1.3]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.3
///
/// # Example JSON
///
/// ```json
/// {
///   "status": "pending",
///   "expires": "2019-01-09T08:26:43.570360537Z",
///   "identifiers": [
///     { "type": "dns", "value": "acmetest.example.org" }
///   ],
///   "authorizations": [
///     "https://example.com/acme/authz/YTqpYUthlVfwBncUufE8IRA2TkzZkN4eYWWLMSRqcSs"
///   ],
///   "finalize": "https://example.com/acme/finalize/7738992/18234324"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub status: OrderStatus,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires: Option<OffsetDateTime>,

    pub identifiers: Vec<api::Identifier>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub not_before: Option<OffsetDateTime>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub not_after: Option<OffsetDateTime>,

    /// The error that occurred while processing the order, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<api::Problem>,

    /// One authorization URL per identifier.
    #[serde(default)]
    pub authorizations: Vec<String>,

    /// URL the CSR is posted to once the order is `ready`.
    pub finalize: String,

    /// URL of the issued certificate, once the order is `valid`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub certificate: Option<String>,
}

impl Order {
    /// Returns all identifier values (domain names) of this order.
    pub fn domains(&self) -> Vec<&str> {
        self.identifiers
            .iter()
            .map(|identifier| identifier.value.as_str())
            .collect()
    }
}
