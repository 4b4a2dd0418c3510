//! Order life cycle.
//!
//! An order moves through `pending → ready → processing → valid`; it becomes `invalid` if
//! anything fails on the way.
//!
//! 1. Prove control of every identifier:
//!    [`create`] → [`describe_pending_challenges`] → publish the values →
//!    [`validate_challenges`] → [`wait`]
//! 2. Submit a CSR and fetch the certificate:
//!    [`finalize`] → [`refresh`] until `valid` → [`CertificatesApi::download`]
//!
//! [`create`]: OrdersApi::create()
//! [`describe_pending_challenges`]: OrdersApi::describe_pending_challenges()
//! [`validate_challenges`]: OrdersApi::validate_challenges()
//! [`wait`]: OrdersApi::wait()
//! [`finalize`]: OrdersApi::finalize()
//! [`refresh`]: OrdersApi::refresh()
//! [`CertificatesApi::download`]: crate::CertificatesApi::download()

use std::{
    future::Future,
    time::{Duration, Instant},
};

use serde::Serialize;
use time::OffsetDateTime;

use crate::{
    api::{self, ChallengeType},
    dir::Client,
    error::{Error, Result},
    trans::Endpoint,
    util::pem_to_der,
};

mod auth;

pub use self::auth::ChallengeDescription;

/// Interval between two authorization polls in [`OrdersApi::wait()`].
const POLL_INTERVAL: Duration = Duration::from_secs(5);

/// An order together with its URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderInfo {
    pub(crate) url: String,
    pub(crate) order: api::Order,
}

impl OrderInfo {
    /// The order URL, from the `Location` header of the creating response.
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> api::OrderStatus {
        self.order.status
    }

    pub fn expires(&self) -> Option<OffsetDateTime> {
        self.order.expires
    }

    pub fn identifiers(&self) -> &[api::Identifier] {
        &self.order.identifiers
    }

    /// All identifier values (domain names) of this order.
    pub fn domains(&self) -> Vec<&str> {
        self.order.domains()
    }

    pub fn authorization_urls(&self) -> &[String] {
        &self.order.authorizations
    }

    pub fn finalize_url(&self) -> &str {
        &self.order.finalize
    }

    /// Present once the order is `valid`.
    pub fn certificate_url(&self) -> Option<&str> {
        self.order.certificate.as_deref()
    }

    pub fn not_before(&self) -> Option<OffsetDateTime> {
        self.order.not_before
    }

    pub fn not_after(&self) -> Option<OffsetDateTime> {
        self.order.not_after
    }

    /// The problem that made the order fail, if any.
    pub fn error(&self) -> Option<&api::Problem> {
        self.order.error.as_ref()
    }

    /// Access the underlying JSON object for debugging.
    pub fn api_order(&self) -> &api::Order {
        &self.order
    }
}

/// Source of time for polling loops.
pub(crate) trait Clock {
    fn now(&self) -> Instant;

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send;
}

#[derive(Debug)]
struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) -> impl Future<Output = ()> + Send {
        tokio::time::sleep(duration)
    }
}

/// Order operations, obtained from [`Client::orders()`].
///
/// All of them need bound account credentials.
#[derive(Debug, Clone, Copy)]
pub struct OrdersApi<'a> {
    client: &'a Client,
}

impl<'a> OrdersApi<'a> {
    pub(crate) fn new(client: &'a Client) -> Self {
        OrdersApi { client }
    }

    /// Creates a new order to issue a certificate for `domains`.
    ///
    /// Every call creates a new order with the ACME API provider, even when the domain names
    /// supplied are exactly the same. The provider limits the number of names per order; Let's
    /// Encrypt [sets a max of 100 names].
    ///
    /// Let's Encrypt rejects orders with `not_before` or `not_after` set.
    ///
    /// [sets a max of 100 names]: https://letsencrypt.org/docs/rate-limits/
    pub async fn create<I, S>(
        &self,
        domains: I,
        not_before: Option<OffsetDateTime>,
        not_after: Option<OffsetDateTime>,
    ) -> Result<OrderInfo>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let identifiers = domains
            .into_iter()
            .map(|domain| api::Identifier::dns(domain.as_ref()))
            .collect();

        self.create_with_identifiers(identifiers, not_before, not_after)
            .await
    }

    /// Creates an order for a device serial number, to be validated with `device-attest-01`.
    pub async fn create_permanent_identifier(&self, value: &str) -> Result<OrderInfo> {
        self.create_with_identifiers(vec![api::Identifier::permanent_identifier(value)], None, None)
            .await
    }

    /// Creates an order for arbitrary identifiers.
    pub async fn create_with_identifiers(
        &self,
        identifiers: Vec<api::Identifier>,
        not_before: Option<OffsetDateTime>,
        not_after: Option<OffsetDateTime>,
    ) -> Result<OrderInfo> {
        let requested = identifiers.len();

        let new_order = api::NewOrder {
            identifiers,
            not_before,
            not_after,
        };

        let res = self
            .client
            .call_kid(
                Endpoint::<api::Order, _>::post(&self.client.directory().new_order, &new_order),
                "order creation",
            )
            .await?;

        let url = res.expect_location()?;
        let order = res.body;

        if order.identifiers.len() != requested {
            return Err(Error::IdentifierMismatch {
                requested,
                returned: order.identifiers.len(),
            });
        }

        log::debug!("Order created: {url}");

        Ok(OrderInfo { url, order })
    }

    /// Fetches an order by URL.
    pub async fn get(&self, url: &str) -> Result<OrderInfo> {
        let res = self
            .client
            .call_kid(Endpoint::<api::Order>::post_as_get(url), "order lookup")
            .await?;

        let url = res.location().unwrap_or_else(|| url.to_owned());

        Ok(OrderInfo {
            url,
            order: res.body,
        })
    }

    /// Refreshes the order state against the ACME API.
    pub async fn refresh(&self, order: &mut OrderInfo) -> Result<()> {
        *order = self.get(&order.url).await?;
        log::debug!("Order {} is {:?}", order.url, order.status());
        Ok(())
    }

    /// Fetches the authorizations of an order.
    ///
    /// There is one per identifier. If the account proved control of some identifiers recently,
    /// their authorizations may already be valid.
    pub async fn get_authorizations(&self, order: &OrderInfo) -> Result<Vec<api::Authorization>> {
        let mut authorizations = Vec::with_capacity(order.order.authorizations.len());

        for url in &order.order.authorizations {
            let res = self
                .client
                .call_kid(
                    Endpoint::<api::Authorization>::post_as_get(url),
                    "authorization lookup",
                )
                .await?;

            authorizations.push(res.body);
        }

        Ok(authorizations)
    }

    /// Describes what to publish for the challenges of all pending authorizations.
    ///
    /// Picks the challenges of type `preferring`; for wildcard names `dns-01` is picked as well,
    /// since it is the only way to validate them. Wildcards add `dns-01` and nothing else: other
    /// challenge types of a wildcard authorization are only picked when they are `preferring`.
    /// `tls-alpn-01` is never described.
    pub async fn describe_pending_challenges(
        &self,
        order: &OrderInfo,
        preferring: ChallengeType,
    ) -> Result<Vec<ChallengeDescription>> {
        let thumbprint = self
            .client
            .require_credentials("challenge description")?
            .thumbprint()?;

        let authorizations = self.get_authorizations(order).await?;

        Ok(auth::describe_challenges(
            &authorizations,
            &preferring,
            &thumbprint,
        ))
    }

    /// Tells the ACME API to validate a challenge.
    ///
    /// The value must be published before this call. Returns the challenge state right after the
    /// request; use [`wait`](Self::wait) for the outcome.
    pub async fn validate_challenge(&self, url: &str) -> Result<api::Challenge> {
        self.validate_challenge_with(url, &api::EmptyObject).await
    }

    /// Like [`validate_challenge`](Self::validate_challenge) with a custom payload, e.g. an
    /// [`attestation_payload`] for `device-attest-01`.
    pub async fn validate_challenge_with<B>(&self, url: &str, payload: &B) -> Result<api::Challenge>
    where
        B: Serialize + ?Sized,
    {
        log::debug!("Validate challenge: {url}");

        let res = self
            .client
            .call_kid(
                Endpoint::<api::Challenge, _>::post(url, payload),
                "challenge validation",
            )
            .await?;

        Ok(res.body)
    }

    /// Triggers validation of every challenge [`describe_pending_challenges`] yields.
    ///
    /// [`describe_pending_challenges`]: Self::describe_pending_challenges()
    pub async fn validate_challenges(
        &self,
        order: &OrderInfo,
        preferring: ChallengeType,
    ) -> Result<Vec<api::Challenge>> {
        self.validate_challenges_with(order, preferring, &api::EmptyObject)
            .await
    }

    pub async fn validate_challenges_with<B>(
        &self,
        order: &OrderInfo,
        preferring: ChallengeType,
        payload: &B,
    ) -> Result<Vec<api::Challenge>>
    where
        B: Serialize + ?Sized,
    {
        let descriptions = self.describe_pending_challenges(order, preferring).await?;

        let mut challenges = Vec::with_capacity(descriptions.len());
        for desc in &descriptions {
            challenges.push(self.validate_challenge_with(&desc.url, payload).await?);
        }

        Ok(challenges)
    }

    /// Polls the authorizations of `order` every 5 seconds until none is `pending` or the next
    /// poll would fall after `timeout`.
    ///
    /// Returns the authorizations that are not `valid`; an empty list means the order can be
    /// finalized.
    pub async fn wait(
        &self,
        order: &OrderInfo,
        timeout: Duration,
    ) -> Result<Vec<api::Authorization>> {
        self.wait_with_clock(order, timeout, &TokioClock).await
    }

    pub(crate) async fn wait_with_clock<C: Clock>(
        &self,
        order: &OrderInfo,
        timeout: Duration,
        clock: &C,
    ) -> Result<Vec<api::Authorization>> {
        let deadline = clock.now() + timeout;

        loop {
            let authorizations = self.get_authorizations(order).await?;

            let pending = authorizations
                .iter()
                .any(api::Authorization::is_status_pending);

            // the next poll must not land past the deadline
            if !pending || clock.now() + POLL_INTERVAL > deadline {
                return Ok(authorizations
                    .into_iter()
                    .filter(|authz| !authz.is_status_valid())
                    .collect());
            }

            log::trace!("Authorizations still pending, polling again");
            clock.sleep(POLL_INTERVAL).await;
        }
    }

    /// Submits a DER encoded CSR to finalize the order.
    ///
    /// The order usually goes to `processing`; [`refresh`](Self::refresh) it until it is `valid`.
    pub async fn finalize(&self, order: &OrderInfo, csr_der: &[u8]) -> Result<OrderInfo> {
        let finalize = api::Finalize::new(csr_der);

        // if the CSR is invalid, the server answers with a badCSR problem
        let res = self
            .client
            .call_kid(
                Endpoint::<api::Order, _>::post(&order.order.finalize, &finalize),
                "order finalization",
            )
            .await?;

        let url = res.location().unwrap_or_else(|| order.url.clone());

        Ok(OrderInfo {
            url,
            order: res.body,
        })
    }

    /// Submits a PEM encoded CSR to finalize the order.
    pub async fn finalize_pem(&self, order: &OrderInfo, csr_pem: &str) -> Result<OrderInfo> {
        self.finalize(order, &pem_to_der(csr_pem)?).await
    }
}

/// Builds the payload answering a `device-attest-01` challenge.
///
/// `att_obj` is the base64url encoded WebAuthn attestation object over the key authorization.
pub fn attestation_payload(att_obj: impl Into<String>) -> api::Attestation {
    api::Attestation::new(att_obj)
}
