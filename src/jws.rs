//! Flattened JWS request envelopes, see [RFC 8555 §6.2].
//!
//! [RFC 8555 §6.2]: https://datatracker.ietf.org/doc/html/rfc8555#section-6.2

use ecdsa::signature::Signer as _;
use p256::ecdsa::{Signature, SigningKey, VerifyingKey};
use serde::{Deserialize, Serialize};
use sha2::{Digest as _, Sha256};

use crate::{
    acc::AcmeKey,
    error::{Error, Result},
    util::{base64url, canonical_json},
};

/// JWS protected header as defined in [RFC 8555 §6.2].
///
/// > For newAccount requests, and for revokeCert requests authenticated by a certificate key,
/// > there MUST be a "jwk" field. [...] For all other requests, the request is signed using an
/// > existing account, and there MUST be a "kid" field.
///
/// The two constructors guarantee exactly one of them is set.
///
/// [RFC 8555 §6.2]: https://datatracker.ietf.org/doc/html/rfc8555#section-6.2
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct JwsProtectedHeader {
    /// Always `ES256`; ACME servers must implement it.
    alg: String,

    /// Anti-replay nonce, see [RFC 8555 §6.5].
    ///
    /// [RFC 8555 §6.5]: https://datatracker.ietf.org/doc/html/rfc8555#section-6.5
    nonce: String,

    /// The exact URL this JWS is posted to, see [RFC 8555 §6.4].
    ///
    /// [RFC 8555 §6.4]: https://datatracker.ietf.org/doc/html/rfc8555#section-6.4
    url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    jwk: Option<Jwk>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    kid: Option<String>,
}

impl JwsProtectedHeader {
    pub(crate) fn new_jwk(jwk: Jwk, url: &str, nonce: String) -> Self {
        JwsProtectedHeader {
            alg: "ES256".to_owned(),
            url: url.to_owned(),
            nonce,
            jwk: Some(jwk),
            kid: None,
        }
    }

    pub(crate) fn new_kid(kid: &str, url: &str, nonce: String) -> Self {
        JwsProtectedHeader {
            alg: "ES256".to_owned(),
            url: url.to_owned(),
            nonce,
            jwk: None,
            kid: Some(kid.to_owned()),
        }
    }
}

/// Public part of an account key as a JSON Web Key ([RFC 7517]).
///
/// [RFC 7517]: https://datatracker.ietf.org/doc/html/rfc7517
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alg: Option<String>,
    pub crv: String,
    pub kty: String,
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub _use: Option<String>,
    pub x: String,
    pub y: String,
}

impl Jwk {
    pub(crate) fn from_verifying_key(key: &VerifyingKey) -> Result<Self> {
        let point = key.to_encoded_point(false);

        let (Some(x), Some(y)) = (point.x(), point.y()) else {
            return Err(Error::InvalidKey("public key has no affine coordinates".to_owned()));
        };

        Ok(Jwk {
            alg: Some("ES256".to_owned()),
            crv: "P-256".to_owned(),
            kty: "EC".to_owned(),
            _use: Some("sig".to_owned()),
            x: base64url(x),
            y: base64url(y),
        })
    }

    /// JWK thumbprint as defined in [RFC 7638].
    ///
    /// Only the required members take part, serialized with sorted keys and no whitespace.
    ///
    /// [RFC 7638]: https://datatracker.ietf.org/doc/html/rfc7638
    pub fn thumbprint(&self) -> Result<String> {
        let json = canonical_json(&JwkThumb::from(self))?;
        Ok(base64url(&Sha256::digest(json)))
    }
}

impl TryFrom<&AcmeKey> for Jwk {
    type Error = Error;

    fn try_from(key: &AcmeKey) -> Result<Self> {
        Self::from_verifying_key(key.signing_key().verifying_key())
    }
}

#[derive(Debug, Serialize)]
struct JwkThumb<'a> {
    crv: &'a str,
    kty: &'a str,
    x: &'a str,
    y: &'a str,
}

impl<'a> From<&'a Jwk> for JwkThumb<'a> {
    fn from(jwk: &'a Jwk) -> Self {
        JwkThumb {
            crv: &jwk.crv,
            kty: &jwk.kty,
            x: &jwk.x,
            y: &jwk.y,
        }
    }
}

/// <https://datatracker.ietf.org/doc/html/rfc7515#section-7.2.2>
#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct FlattenedJsonJws {
    pub(crate) protected: String,
    pub(crate) payload: String,
    pub(crate) signature: String,
}

/// Constructs a JWS with the given protected header according to [RFC 7515 §5.1].
///
/// A `None` payload yields an empty `payload` member, which makes the request a POST-as-GET.
///
/// [RFC 7515 §5.1]: https://datatracker.ietf.org/doc/html/rfc7515#section-5.1
pub(crate) fn jws_with<T: Serialize + ?Sized>(
    protected: &JwsProtectedHeader,
    key: &SigningKey,
    payload: Option<&T>,
) -> Result<FlattenedJsonJws> {
    let protected = base64url(&canonical_json(protected)?);

    let payload = match payload {
        Some(payload) => base64url(&canonical_json(payload)?),
        None => String::new(),
    };

    let signing_input = format!("{protected}.{payload}");

    // fixed width r || s, not DER
    let signature: Signature = key.try_sign(signing_input.as_bytes())?;

    Ok(FlattenedJsonJws {
        protected,
        payload,
        signature: base64url(&signature.to_bytes()),
    })
}

/// Key authorization for a challenge token, see [RFC 8555 §8.1].
///
/// [RFC 8555 §8.1]: https://datatracker.ietf.org/doc/html/rfc8555#section-8.1
pub fn key_authorization(token: &str, thumbprint: &str) -> String {
    format!("{token}.{thumbprint}")
}

/// Digest of a key authorization, as published in `dns-01` TXT records.
pub fn key_authorization_sha256(key_authorization: &str) -> String {
    base64url(&Sha256::digest(key_authorization))
}
