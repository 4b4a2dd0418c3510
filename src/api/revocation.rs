use serde::{Deserialize, Serialize};

use crate::util::base64url;

/// Certificate revocation request.
///
/// See [RFC 8555 §7.6].
///
/// [RFC 8555 §7.6]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.6
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Revocation {
    /// The certificate to revoke in base64url-encoded DER.
    pub certificate: String,

    /// One of the reason codes of [RFC 5280 §5.3.1].
    ///
    /// [RFC 5280 §5.3.1]: https://datatracker.ietf.org/doc/html/rfc5280#section-5.3.1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<u8>,
}

impl Revocation {
    pub fn new(certificate_der: &[u8], reason: Option<u8>) -> Self {
        Self {
            certificate: base64url(certificate_der),
            reason,
        }
    }
}
