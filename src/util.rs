//! Base64url, PEM and canonical JSON helpers.

use base64::{
    alphabet,
    engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig},
    prelude::*,
};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// URL-safe alphabet that accepts input with or without `=` padding.
const BASE64_URL_SAFE_LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::URL_SAFE,
    GeneralPurposeConfig::new()
        .with_encode_padding(false)
        .with_decode_padding_mode(DecodePaddingMode::Indifferent),
);

/// Encodes bytes as unpadded base64url, see [RFC 7515 §2].
///
/// [RFC 7515 §2]: https://datatracker.ietf.org/doc/html/rfc7515#section-2
pub fn base64url<T: ?Sized + AsRef<[u8]>>(input: &T) -> String {
    BASE64_URL_SAFE_NO_PAD.encode(input)
}

/// Decodes base64url, tolerating (but not requiring) trailing `=` padding.
pub fn from_base64url(input: &str) -> Result<Vec<u8>> {
    Ok(BASE64_URL_SAFE_LENIENT.decode(input)?)
}

/// Returns true if `input` is non-empty and only uses the base64url alphabet.
pub(crate) fn is_base64url(input: &str) -> bool {
    !input.is_empty()
        && input
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Converts PEM text (e.g. a `CERTIFICATE` or `CERTIFICATE REQUEST`) to DER bytes.
///
/// All `-----BEGIN …-----` and `-----END …-----` lines are dropped along with any whitespace;
/// the remainder must be standard base64.
pub fn pem_to_der(pem: &str) -> Result<Vec<u8>> {
    let body = pem
        .lines()
        .map(str::trim)
        .filter(|line| !(line.starts_with("-----BEGIN") || line.starts_with("-----END")))
        .flat_map(|line| line.split_whitespace())
        .collect::<String>();

    if body.is_empty() {
        return Err(Error::MalformedPem("no PEM body".to_owned()));
    }

    BASE64_STANDARD
        .decode(body)
        .map_err(|err| Error::MalformedPem(err.to_string()))
}

/// Wraps DER bytes in an [RFC 7468] PEM block with the given label.
///
/// [RFC 7468]: https://datatracker.ietf.org/doc/html/rfc7468
pub fn der_to_pem(label: &str, der: &[u8]) -> Result<String> {
    pem::encode_string(label, pem::LineEnding::LF, der)
        .map_err(|err| Error::MalformedPem(err.to_string()))
}

/// Serializes `value` to JSON with object keys sorted at every depth.
pub(crate) fn canonical_json<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let value = sort_keys(serde_json::to_value(value)?);
    Ok(serde_json::to_string(&value)?)
}

fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries = map.into_iter().collect::<Vec<_>>();
            entries.sort_by(|(a, _), (b, _)| a.cmp(b));

            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, value)| (key, sort_keys(value)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

pub(crate) fn read_json<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    log::trace!("{}", String::from_utf8_lossy(body));
    serde_json::from_slice(body).map_err(Error::InvalidResponse)
}
