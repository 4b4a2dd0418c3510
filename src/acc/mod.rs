use std::{fmt, sync::Arc};

use time::OffsetDateTime;
use zeroize::Zeroizing;

use crate::{
    api,
    dir::Client,
    error::{Error, Result},
    trans::Endpoint,
};

mod acme_key;

pub(crate) use self::acme_key::AcmeKey;

/// Key and contacts identifying an ACME account.
///
/// This library uses elliptic curve P-256 for accessing the account. The advantages of elliptic
/// curve cryptography are that the signed requests against the ACME API are small and that the
/// public key can be derived from the private key.
///
/// Clones share the key, including the account URL once the server told us about it.
#[derive(Debug, Clone)]
pub struct AccountCredentials {
    key: Arc<AcmeKey>,
    contacts: Vec<String>,
}

impl AccountCredentials {
    /// Creates credentials from an existing signing key.
    ///
    /// Contacts without a URI scheme are taken to be email addresses, so `a@example.com` becomes
    /// `mailto:a@example.com`.
    pub fn new<I, S>(signing_key: p256::ecdsa::SigningKey, contacts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_acme_key(AcmeKey::from_key(signing_key), contacts)
    }

    /// Creates credentials from a PKCS#8 PEM encoded P-256 private key.
    pub fn from_pem<I, S>(private_key_pem: &str, contacts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Ok(Self::from_acme_key(
            AcmeKey::from_pem(private_key_pem)?,
            contacts,
        ))
    }

    /// Creates credentials with a freshly generated key.
    pub fn generate<I, S>(contacts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self::from_acme_key(AcmeKey::generate(), contacts)
    }

    fn from_acme_key<I, S>(key: AcmeKey, contacts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        AccountCredentials {
            key: Arc::new(key),
            contacts: normalize_contacts(contacts),
        }
    }

    /// Private key for this account, as PKCS#8 PEM.
    pub fn private_key_pem(&self) -> Result<Zeroizing<String>> {
        self.key.to_pem()
    }

    pub fn contacts(&self) -> &[String] {
        &self.contacts
    }

    /// The account URL, once known.
    pub fn account_url(&self) -> Option<&str> {
        self.key.key_id()
    }

    /// Public key of this account.
    pub fn jwk(&self) -> Result<api::Jwk> {
        self.key.jwk()
    }

    /// JWK thumbprint of the account key, the second half of every key authorization.
    pub fn thumbprint(&self) -> Result<String> {
        self.key.jwk()?.thumbprint()
    }

    pub(crate) fn key(&self) -> &AcmeKey {
        &self.key
    }
}

impl TryFrom<&AccountInfo> for AccountCredentials {
    type Error = Error;

    /// Rebuilds credentials from an account created in this session.
    fn try_from(info: &AccountInfo) -> Result<Self> {
        let pem = info.private_key_pem.as_ref().ok_or(Error::InvalidAccountInfo)?;
        let credentials = Self::from_pem(pem, &info.account.contact)?;
        credentials.key.set_key_id(info.url.clone());
        Ok(credentials)
    }
}

fn normalize_contacts<I, S>(contacts: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    contacts
        .into_iter()
        .map(|contact| {
            let contact = contact.as_ref().trim();

            if contact.contains(':') {
                contact.to_owned()
            } else {
                format!("mailto:{contact}")
            }
        })
        .collect()
}

/// Account state as reported by the ACME server.
#[derive(Clone)]
pub struct AccountInfo {
    url: String,
    account: api::Account,
    private_key_pem: Option<Zeroizing<String>>,
}

impl AccountInfo {
    /// The account URL.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> api::AccountStatus {
        self.account.status
    }

    pub fn contacts(&self) -> &[String] {
        &self.account.contact
    }

    /// The account public key, as known to the server.
    pub fn key(&self) -> Option<&api::Jwk> {
        self.account.key.as_ref()
    }

    pub fn created_at(&self) -> Option<OffsetDateTime> {
        self.account.created_at
    }

    pub fn initial_ip(&self) -> Option<&str> {
        self.account.initial_ip.as_deref()
    }

    pub fn orders_url(&self) -> Option<&str> {
        self.account.orders.as_deref()
    }

    /// Private key of the account, only present when the account was created by this session.
    ///
    /// Store it to use the account again later, see [`AccountCredentials::try_from`].
    pub fn private_key_pem(&self) -> Option<&str> {
        self.private_key_pem.as_deref().map(String::as_str)
    }

    /// Returns a reference to the account's API object.
    ///
    /// Useful for debugging.
    pub fn api_account(&self) -> &api::Account {
        &self.account
    }
}

impl fmt::Debug for AccountInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccountInfo")
            .field("url", &self.url)
            .field("account", &self.account)
            .finish_non_exhaustive()
    }
}

/// Account operations, obtained from [`Client::account()`].
#[derive(Debug, Clone, Copy)]
pub struct AccountApi<'a> {
    client: &'a Client,
}

impl<'a> AccountApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        AccountApi { client }
    }

    /// Registers an account with the ACME provider and binds it to the session.
    ///
    /// The key of already bound credentials is reused, otherwise a new P-256 key is generated.
    /// Registering a key the server already knows returns the existing account.
    ///
    /// `accept_tos` must be true for providers that publish terms of service, see
    /// [`api::Directory::terms_of_service()`].
    pub async fn create<I, S>(&self, contacts: I, accept_tos: bool) -> Result<AccountInfo>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let contacts = normalize_contacts(contacts);

        let key = match self.client.credentials() {
            Some(credentials) => Arc::clone(&credentials.key),
            None => Arc::new(AcmeKey::generate()),
        };

        let payload = api::NewAccount::create(contacts.clone(), accept_tos);

        let res = self
            .client
            .transport()
            .call_jwk(
                Endpoint::<api::Account, _>::post(&self.client.directory().new_account, &payload),
                &key,
            )
            .await?;

        let url = key.set_key_id(res.expect_location()?).to_owned();
        let private_key_pem = key.to_pem()?;

        self.client
            .bind_credentials(AccountCredentials { key, contacts });

        log::debug!("Account created: {url}");

        Ok(AccountInfo {
            url,
            account: res.body,
            private_key_pem: Some(private_key_pem),
        })
    }

    /// Looks up the account of the bound credentials.
    ///
    /// Also caches the account URL for later requests.
    pub async fn get(&self) -> Result<AccountInfo> {
        let credentials = self.client.require_credentials("account lookup")?;

        let res = self
            .client
            .transport()
            .call_jwk(
                Endpoint::<api::Account, _>::post(
                    &self.client.directory().new_account,
                    &api::NewAccount::lookup(),
                ),
                credentials.key(),
            )
            .await?;

        let url = credentials.key().set_key_id(res.expect_location()?).to_owned();

        Ok(AccountInfo {
            url,
            account: res.body,
            private_key_pem: None,
        })
    }

    /// Binds credentials to the session without contacting the server.
    pub fn use_credentials(&self, credentials: AccountCredentials) {
        self.client.bind_credentials(credentials);
    }

    /// Deactivates the account.
    ///
    /// A deactivated account can't be used anymore, not even to revoke certificates.
    pub async fn deactivate(&self) -> Result<AccountInfo> {
        let url = self.client.account_url("account deactivation").await?;

        let res = self
            .client
            .call_kid(
                Endpoint::<api::Account, _>::post(&url, &api::AccountUpdate::deactivate()),
                "account deactivation",
            )
            .await?;

        if !res.body.is_status_deactivated() {
            return Err(Error::DeactivationFailed(Some(res.body.status)));
        }

        log::debug!("Account deactivated: {url}");

        Ok(AccountInfo {
            url,
            account: res.body,
            private_key_pem: None,
        })
    }

    /// Lists the URLs of this account's orders, following pagination.
    ///
    /// Let's Encrypt does not implement this.
    pub async fn list_orders(&self) -> Result<Vec<String>> {
        let url = self.client.account_url("order listing").await?;

        let account = self
            .client
            .call_kid(
                Endpoint::<api::Account>::post_as_get(&url),
                "order listing",
            )
            .await?
            .body;

        let mut next = Some(account.orders.ok_or(Error::MissingUrl("orders"))?);
        let mut orders = Vec::new();

        while let Some(page_url) = next.take() {
            let page = self
                .client
                .call_kid(
                    Endpoint::<api::OrdersList>::post_as_get(&page_url),
                    "order listing",
                )
                .await?;

            next = page.links("next").into_iter().next();
            orders.extend(page.body.orders);
        }

        Ok(orders)
    }
}

/// Enumeration of reasons for revocation.
///
/// The reason codes are taken from [RFC 5280 §5.3.1].
///
/// [RFC 5280 §5.3.1]: https://tools.ietf.org/html/rfc5280#section-5.3.1
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevocationReason {
    Unspecified = 0,
    KeyCompromise = 1,
    CACompromise = 2,
    AffiliationChanged = 3,
    Superseded = 4,
    CessationOfOperation = 5,
    CertificateHold = 6,
    // value 7 is not used
    RemoveFromCRL = 8,
    PrivilegeWithdrawn = 9,
    AACompromise = 10,
}

impl RevocationReason {
    /// Reason code to send, if any.
    ///
    /// > the reason code CRL entry extension SHOULD be absent instead of using the unspecified
    /// > (0) reasonCode value
    ///
    /// See [RFC 5280 §5.3.1](https://datatracker.ietf.org/doc/html/rfc5280#section-5.3.1).
    pub(crate) fn code(self) -> Option<u8> {
        match self {
            RevocationReason::Unspecified => None,
            reason => Some(reason as u8),
        }
    }
}
