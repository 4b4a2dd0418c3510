use std::sync::Arc;

use parking_lot::RwLock;
use serde::Serialize;

use crate::{
    acc::{AccountApi, AccountCredentials},
    api,
    cert::CertificatesApi,
    config::{ClientConfig, DirectoryUrl},
    error::{Error, Result},
    order::OrdersApi,
    req::{req_handle_error, Http},
    trans::{ApiResponse, Endpoint, ResponseBody, Transport},
    util::read_json,
};

#[derive(Debug)]
struct ClientInner {
    transport: Transport,
    directory: api::Directory,
    credentials: RwLock<Option<AccountCredentials>>,
}

/// Entry point for accessing an ACME API.
///
/// A client is one session against one ACME provider: the directory is fetched once on creation,
/// and at most one account is bound at a time. Clones share the session.
#[derive(Debug, Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

impl Client {
    /// Creates a session, fetching the directory of the configured provider.
    pub async fn new(config: ClientConfig) -> Result<Client> {
        let http = Http::from_config(&config)?;

        log::debug!("Fetch directory: {}", config.directory_url);
        let res = req_handle_error(http.get(&config.directory_url).await?).await?;
        let directory = read_json::<api::Directory>(&res.bytes().await?)?;

        let transport = Transport::new(http, &directory.new_nonce);

        Ok(Client {
            inner: Arc::new(ClientInner {
                transport,
                directory,
                credentials: RwLock::new(config.credentials),
            }),
        })
    }

    /// Creates a session with default settings against a directory.
    pub async fn fetch(url: DirectoryUrl<'_>) -> Result<Client> {
        Self::new(ClientConfig::new(url)).await
    }

    /// Returns a reference to the directory's API object.
    pub fn directory(&self) -> &api::Directory {
        &self.inner.directory
    }

    pub fn account(&self) -> AccountApi<'_> {
        AccountApi::new(self)
    }

    pub fn orders(&self) -> OrdersApi<'_> {
        OrdersApi::new(self)
    }

    pub fn certificates(&self) -> CertificatesApi<'_> {
        CertificatesApi::new(self)
    }

    /// Credentials currently bound to the session, if any.
    pub fn credentials(&self) -> Option<AccountCredentials> {
        self.inner.credentials.read().clone()
    }

    pub(crate) fn transport(&self) -> &Transport {
        &self.inner.transport
    }

    pub(crate) fn bind_credentials(&self, credentials: AccountCredentials) {
        *self.inner.credentials.write() = Some(credentials);
    }

    /// Bound credentials, or an error naming the operation that needed them.
    pub(crate) fn require_credentials(&self, operation: &'static str) -> Result<AccountCredentials> {
        self.credentials()
            .ok_or(Error::MustBeAuthenticated(operation))
    }

    /// Account URL of the bound credentials, looked up from the server if not yet known.
    pub(crate) async fn account_url(&self, operation: &'static str) -> Result<String> {
        let credentials = self.require_credentials(operation)?;

        if let Some(url) = credentials.account_url() {
            return Ok(url.to_owned());
        }

        log::debug!("Account URL unknown, looking up account");
        Ok(self.account().get().await?.url().to_owned())
    }

    /// Signed call on behalf of the bound account.
    pub(crate) async fn call_kid<R, B>(
        &self,
        endpoint: Endpoint<'_, R, B>,
        operation: &'static str,
    ) -> Result<ApiResponse<R>>
    where
        R: ResponseBody,
        B: Serialize + ?Sized,
    {
        let credentials = self.require_credentials(operation)?;
        let account_url = self.account_url(operation).await?;

        self.inner
            .transport
            .call_kid(endpoint, credentials.key(), &account_url)
            .await
    }
}
