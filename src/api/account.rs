use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::jws::Jwk;

/// The status of an [`Account`].
///
/// See [RFC 8555 §7.1.2].
///
/// [RFC 8555 §7.1.2]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.2
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Pending,
    Valid,
    Deactivated,
    Revoked,
}

/// An ACME account resource.
///
/// Represents a set of metadata associated with an account.
///
/// See [RFC 8555 §7.1.2].
///
/// # Example JSON
///
/// ```json
/// {
///   "status": "valid",
///   "key": { "kty": "EC", "crv": "P-256", "x": "…", "y": "…" },
///   "contact": [
///     "mailto:cert-admin@example.com",
///     "mailto:admin@example.com"
///   ],
///   "initialIp": "90.171.37.12",
///   "createdAt": "2018-12-31T17:15:40.399104457Z",
///   "orders": "https://example.com/acme/acct/evOfKhNU60wg/orders"
/// }
/// ```
///
/// [RFC 8555 §7.1.2]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub status: AccountStatus,

    /// The account public key, as known to the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<Jwk>,

    #[serde(default)]
    pub contact: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub terms_of_service_agreed: Option<bool>,

    /// Source IP the account was created from, as seen by the server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_ip: Option<String>,

    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub created_at: Option<OffsetDateTime>,

    /// URL from which the list of orders of this account can be fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orders: Option<String>,
}

impl Account {
    pub fn is_status_valid(&self) -> bool {
        self.status == AccountStatus::Valid
    }

    pub fn is_status_deactivated(&self) -> bool {
        self.status == AccountStatus::Deactivated
    }

    pub fn terms_of_service_agreed(&self) -> bool {
        self.terms_of_service_agreed.unwrap_or(false)
    }
}

/// Payload posted to the `newAccount` endpoint.
///
/// The same endpoint is used to look up the account for a key, by setting
/// `onlyReturnExisting`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewAccount {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<Vec<String>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub terms_of_service_agreed: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub only_return_existing: Option<bool>,
}

impl NewAccount {
    pub(crate) fn create(contact: Vec<String>, terms_of_service_agreed: bool) -> Self {
        Self {
            contact: Some(contact),
            terms_of_service_agreed: Some(terms_of_service_agreed),
            only_return_existing: Some(false),
        }
    }

    pub(crate) fn lookup() -> Self {
        Self {
            only_return_existing: Some(true),
            ..Default::default()
        }
    }
}

/// Payload posted to an account URL to change it.
///
/// See [RFC 8555 §7.3.6].
///
/// [RFC 8555 §7.3.6]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.3.6
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AccountStatus>,
}

impl AccountUpdate {
    pub(crate) fn deactivate() -> Self {
        Self {
            status: Some(AccountStatus::Deactivated),
        }
    }
}

/// One page of order URLs of an account.
///
/// Further pages are announced through a `Link: <…>;rel="next"` header. See [RFC 8555 §7.1.2.1].
///
/// [RFC 8555 §7.1.2.1]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.2.1
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrdersList {
    pub orders: Vec<String>,
}
