use crate::api::{AccountStatus, OrderStatus, Problem};

/// Result type used throughout this crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Everything that can go wrong while talking to an ACME provider.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An authenticated operation was attempted without account credentials.
    ///
    /// Bind credentials with [`AccountApi::use_credentials()`] or create an account first.
    ///
    /// [`AccountApi::use_credentials()`]: crate::AccountApi::use_credentials()
    #[error("operation requires account credentials: {0}")]
    MustBeAuthenticated(&'static str),

    /// Account info carries no private key, so no credentials can be built from it.
    #[error("account info does not contain a private key")]
    InvalidAccountInfo,

    /// Deactivating the account did not leave it in `deactivated` status.
    #[error("account deactivation failed, account status is {0:?}")]
    DeactivationFailed(Option<AccountStatus>),

    /// The order is not in a state that allows downloading the certificate.
    #[error("certificate is not ready, order status is {0:?}")]
    CertificateNotReady(OrderStatus),

    /// The nonce endpoint answered without a `Replay-Nonce` header.
    #[error("no Replay-Nonce header returned")]
    NoNonceReturned,

    /// A response lacked a header this client needs, e.g. `Location` for a new resource.
    #[error("missing response header: {0}")]
    MissingHeader(&'static str),

    /// A resource was used that does not (yet) know an URL it needs.
    #[error("missing resource URL: {0}")]
    MissingUrl(&'static str),

    /// The server returned an order for other identifiers than requested.
    #[error("order identifiers mismatch: requested {requested}, got {returned}")]
    IdentifierMismatch { requested: usize, returned: usize },

    /// An RFC 7807 problem document returned by the ACME server.
    #[error(transparent)]
    Protocol(#[from] Problem),

    /// A non-2xx response whose body was not a problem document.
    #[error("HTTP status {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// Network, TLS or timeout failure from the HTTP client.
    #[error("HTTP request failure: {0}")]
    Http(#[from] reqwest::Error),

    /// Input was not valid base64url.
    #[error("base64 decoding failed: {0}")]
    Decode(#[from] base64::DecodeError),

    /// Input was not valid PEM.
    #[error("malformed PEM: {0}")]
    MalformedPem(String),

    /// A request payload or JWS header could not be serialized.
    #[error("JSON encoding failed: {0}")]
    Encoding(#[from] serde_json::Error),

    /// A response body could not be decoded into the expected type.
    #[error("invalid response body: {0}")]
    InvalidResponse(#[source] serde_json::Error),

    /// The private key could not be read or written.
    #[error("invalid key: {0}")]
    InvalidKey(String),

    /// Signing failed.
    #[error("cryptographic operation failed: {0}")]
    Crypto(#[from] ecdsa::Error),

    /// The certificate signing request could not be built.
    #[error("CSR creation failed: {0}")]
    Csr(String),
}

impl From<pkcs8::Error> for Error {
    fn from(err: pkcs8::Error) -> Self {
        Error::InvalidKey(err.to_string())
    }
}

impl Error {
    /// Returns the server problem document, if this error carries one.
    pub fn problem(&self) -> Option<&Problem> {
        match self {
            Error::Protocol(problem) => Some(problem),
            _ => None,
        }
    }
}
