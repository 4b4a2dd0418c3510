//! JSON API payloads.
//!
//! These mirror the objects of [RFC 8555 §7.1] one-to-one. Higher level calls on
//! [`Client`](crate::Client) return them directly where no extra client-side state is needed.
//!
//! [RFC 8555 §7.1]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.1

use std::fmt;

use serde::{
    ser::{SerializeMap as _, Serializer},
    Deserialize, Serialize,
};

mod account;
mod authorization;
mod challenge;
mod directory;
mod finalize;
mod identifier;
mod order;
mod revocation;

pub use self::{
    account::{Account, AccountStatus, AccountUpdate, NewAccount, OrdersList},
    authorization::{Authorization, AuthorizationStatus},
    challenge::{Attestation, Challenge, ChallengeStatus, ChallengeType},
    directory::{Directory, DirectoryMeta},
    finalize::Finalize,
    identifier::{Identifier, IdentifierType},
    order::{NewOrder, Order, OrderStatus},
    revocation::Revocation,
};
pub use crate::jws::Jwk;

/// Declares a string-valued enum that keeps unknown values in an `Other` variant.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $( $(#[$variant_meta:meta])* $variant:ident => $value:literal, )+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, ::serde::Serialize, ::serde::Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $( $(#[$variant_meta])* $variant, )+

            /// A value this client does not know about.
            Other(String),
        }

        impl $name {
            /// Returns the wire representation.
            pub fn as_str(&self) -> &str {
                match self {
                    $( $name::$variant => $value, )+
                    $name::Other(value) => value,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                match value.as_str() {
                    $( $value => $name::$variant, )+
                    _ => $name::Other(value),
                }
            }
        }

        impl From<&str> for $name {
            fn from(value: &str) -> Self {
                $name::from(value.to_owned())
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> String {
                match value {
                    $name::Other(value) => value,
                    known => known.as_str().to_owned(),
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

pub(crate) use string_enum;

/// Serializes to `{}`.
///
/// Posted to a challenge URL to ask the server to start validating it.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmptyObject;

impl Serialize for EmptyObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_map(Some(0))?.end()
    }
}

string_enum! {
    /// Error types registered for ACME in [RFC 8555 §6.7].
    ///
    /// [RFC 8555 §6.7]: https://datatracker.ietf.org/doc/html/rfc8555#section-6.7
    pub enum ProblemType {
        AccountDoesNotExist => "urn:ietf:params:acme:error:accountDoesNotExist",
        AlreadyRevoked => "urn:ietf:params:acme:error:alreadyRevoked",
        BadCsr => "urn:ietf:params:acme:error:badCSR",
        BadNonce => "urn:ietf:params:acme:error:badNonce",
        BadPublicKey => "urn:ietf:params:acme:error:badPublicKey",
        BadRevocationReason => "urn:ietf:params:acme:error:badRevocationReason",
        BadSignatureAlgorithm => "urn:ietf:params:acme:error:badSignatureAlgorithm",
        Caa => "urn:ietf:params:acme:error:caa",
        Compound => "urn:ietf:params:acme:error:compound",
        Connection => "urn:ietf:params:acme:error:connection",
        Dns => "urn:ietf:params:acme:error:dns",
        ExternalAccountRequired => "urn:ietf:params:acme:error:externalAccountRequired",
        IncorrectResponse => "urn:ietf:params:acme:error:incorrectResponse",
        InvalidContact => "urn:ietf:params:acme:error:invalidContact",
        /// Let's Encrypt (Boulder) specific.
        InvalidEmail => "urn:ietf:params:acme:error:invalidEmail",
        Malformed => "urn:ietf:params:acme:error:malformed",
        OrderNotReady => "urn:ietf:params:acme:error:orderNotReady",
        RateLimited => "urn:ietf:params:acme:error:rateLimited",
        RejectedIdentifier => "urn:ietf:params:acme:error:rejectedIdentifier",
        ServerInternal => "urn:ietf:params:acme:error:serverInternal",
        Tls => "urn:ietf:params:acme:error:tls",
        Unauthorized => "urn:ietf:params:acme:error:unauthorized",
        UnsupportedContact => "urn:ietf:params:acme:error:unsupportedContact",
        UnsupportedIdentifier => "urn:ietf:params:acme:error:unsupportedIdentifier",
        UserActionRequired => "urn:ietf:params:acme:error:userActionRequired",
    }
}

/// An [RFC 7807] problem document, as returned by the ACME server on errors and embedded in
/// failed orders and challenges.
///
/// [RFC 7807]: https://datatracker.ietf.org/doc/html/rfc7807
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Problem {
    #[serde(rename = "type")]
    pub _type: ProblemType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,

    /// For `userActionRequired`, the URL the user has to visit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,

    /// The identifier a subproblem relates to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Identifier>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subproblems: Option<Vec<Problem>>,
}

impl Problem {
    /// The typed problem kind.
    pub fn kind(&self) -> &ProblemType {
        &self._type
    }

    /// Returns true if problem type is `badNonce`.
    pub fn is_bad_nonce(&self) -> bool {
        self._type == ProblemType::BadNonce
    }

    /// Returns true if the request exceeded a rate limit.
    pub fn is_rate_limited(&self) -> bool {
        self._type == ProblemType::RateLimited
    }
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self._type)?;

        if let Some(detail) = self.detail.as_deref().or(self.title.as_deref()) {
            write!(f, ": {detail}")?;
        }

        if let Some(subproblems) = &self.subproblems {
            for sub in subproblems {
                match &sub.identifier {
                    Some(id) => write!(f, "; {} ({sub})", id.value)?,
                    None => write!(f, "; {sub}")?,
                }
            }
        }

        Ok(())
    }
}

impl std::error::Error for Problem {}
