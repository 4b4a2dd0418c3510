use std::time::Duration;

use crate::acc::AccountCredentials;

const LETSENCRYPT_URL: &str = "https://acme-v02.api.letsencrypt.org/directory";
const LETSENCRYPT_STAGING_URL: &str = "https://acme-staging-v02.api.letsencrypt.org/directory";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Enumeration of known ACME API directories.
#[derive(Debug, Clone)]
pub enum DirectoryUrl<'a> {
    /// The main Let's Encrypt directory.
    ///
    /// Not appropriate for testing / development.
    LetsEncrypt,

    /// The staging Let's Encrypt directory.
    ///
    /// Use for testing and development. Doesn't issue "valid" certificates. The root signing
    /// certificate is not supposed to be in any trust chains.
    LetsEncryptStaging,

    /// Provide an arbitrary directory URL to connect to.
    Other(&'a str),
}

impl DirectoryUrl<'_> {
    pub fn to_url(&self) -> &str {
        match self {
            DirectoryUrl::LetsEncrypt => LETSENCRYPT_URL,
            DirectoryUrl::LetsEncryptStaging => LETSENCRYPT_STAGING_URL,
            DirectoryUrl::Other(url) => url,
        }
    }
}

/// Settings for a [`Client`](crate::Client).
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use acme::{ClientConfig, DirectoryUrl};
///
/// let config = ClientConfig::new(DirectoryUrl::LetsEncryptStaging)
///     .with_timeout(Duration::from_secs(10))
///     .with_user_agent("my-issuer/1.0");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    pub(crate) directory_url: String,
    pub(crate) root_certificates: Vec<String>,
    pub(crate) timeout: Duration,
    pub(crate) user_agent: String,
    pub(crate) http_client: Option<reqwest::Client>,
    pub(crate) credentials: Option<AccountCredentials>,
}

impl ClientConfig {
    pub fn new(directory_url: DirectoryUrl<'_>) -> Self {
        Self {
            directory_url: directory_url.to_url().to_owned(),
            root_certificates: Vec::new(),
            timeout: DEFAULT_TIMEOUT,
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).to_owned(),
            http_client: None,
            credentials: None,
        }
    }

    /// Trusts the CA certificate(s) in `pem` in addition to the default roots.
    ///
    /// Useful against test CAs like Pebble. Ignored when a custom HTTP client is set.
    pub fn with_root_certificate(mut self, pem: impl Into<String>) -> Self {
        self.root_certificates.push(pem.into());
        self
    }

    /// Per-request timeout. Defaults to 30 seconds. Ignored when a custom HTTP client is set.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Uses a pre-built HTTP client for all requests.
    pub fn with_http_client(mut self, client: reqwest::Client) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Binds account credentials to the session from the start.
    pub fn with_credentials(mut self, credentials: AccountCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    pub fn directory_url(&self) -> &str {
        &self.directory_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self::new(DirectoryUrl::LetsEncryptStaging)
    }
}
