use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::api::{self, ChallengeType};

/// The status of an [`api::Authorization`].
///
/// See [RFC 8555 §7.1.6].
///
/// [RFC 8555 §7.1.6]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.6
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuthorizationStatus {
    Pending,
    Valid,
    Invalid,
    Deactivated,
    Expired,
    Revoked,
}

/// An ACME authorization object.
///
/// Represents a server's authorization for an account to represent an identifier. While the
/// authorization is `pending` its challenges can be answered; afterwards they are frozen and only
/// describe what was attempted.
///
/// See [RFC 8555 §7.1.4].
///
/// # Example JSON
///
/// ```json
/// {
///   "identifier": { "type": "dns", "value": "www.example.org" },
///   "status": "pending",
///   "expires": "2019-01-09T08:26:43Z",
///   "challenges": [
///     {
///       "type": "http-01",
///       "status": "pending",
///       "url": "https://example.com/acme/chall/prV_B7yEyA4",
///       "token": "DGyRejmCefe7v4NfDGDKfA"
///     }
///   ],
///   "wildcard": false
/// }
/// ```
///
/// [RFC 8555 §7.1.4]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1.4
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Authorization {
    /// The identifier this authorization is proving control of.
    pub identifier: api::Identifier,

    pub status: AuthorizationStatus,

    /// The timestamp after which the server will consider this authorization invalid.
    ///
    /// Required for objects with `valid` status.
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "time::serde::rfc3339::option"
    )]
    pub expires: Option<OffsetDateTime>,

    /// Challenges the client can fulfill to prove possession of the identifier.
    ///
    /// For valid and invalid authorizations this is the challenge that was attempted.
    pub challenges: Vec<api::Challenge>,

    /// Present and true for authorizations created from a wildcard DNS identifier.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wildcard: Option<bool>,
}

impl Authorization {
    /// Returns true if authorization was created for a wildcard domain.
    pub fn is_wildcard(&self) -> bool {
        self.wildcard.unwrap_or(false)
    }

    /// Returns true while challenges of this authorization can be answered.
    pub fn is_status_pending(&self) -> bool {
        self.status == AuthorizationStatus::Pending
    }

    pub fn is_status_valid(&self) -> bool {
        self.status == AuthorizationStatus::Valid
    }

    /// Returns the first challenge of the given type, if one is present.
    pub fn challenge(&self, _type: &ChallengeType) -> Option<&api::Challenge> {
        self.challenges.iter().find(|c| &c._type == _type)
    }

    /// Returns an `http-01` challenge, if one is present.
    pub fn http_challenge(&self) -> Option<&api::Challenge> {
        self.challenge(&ChallengeType::Http01)
    }

    /// Returns a `dns-01` challenge, if one is present.
    pub fn dns_challenge(&self) -> Option<&api::Challenge> {
        self.challenge(&ChallengeType::Dns01)
    }
}
