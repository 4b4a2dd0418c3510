use serde::{Deserialize, Serialize};

use crate::util::base64url;

/// Request to finalize an order with a signed CSR.
///
/// See [RFC 8555 §7.4].
///
/// [RFC 8555 §7.4]: https://datatracker.ietf.org/doc/html/rfc8555#section-7.4
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Finalize {
    /// Certificate Signing Request in base64url-encoded DER, without PEM armor.
    pub csr: String,
}

impl Finalize {
    pub fn new(csr_der: &[u8]) -> Self {
        Self {
            csr: base64url(csr_der),
        }
    }
}
