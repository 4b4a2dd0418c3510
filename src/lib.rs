//! Provisioning certificates from ACME (Automatic Certificate Management Environment) providers
//! such as [Let's Encrypt](https://letsencrypt.org/).
//!
//! It follows the [RFC 8555](https://datatracker.ietf.org/doc/html/rfc8555) spec, using ACME v2 to
//! issue and revoke certificates. The library only speaks the protocol: publishing challenge
//! responses on a web server or in DNS is up to the caller.
//!
//! # Usage
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use acme::{api::ChallengeType, Client, Csr, DirectoryUrl};
//!
//! # async fn run() -> acme::Result<()> {
//! let client = Client::fetch(DirectoryUrl::LetsEncryptStaging).await?;
//!
//! // keep `account.private_key_pem()` to restore the account later
//! let account = client.account().create(["admin@example.com"], true).await?;
//!
//! let orders = client.orders();
//! let order = orders.create(["example.com"], None, None).await?;
//!
//! for challenge in orders
//!     .describe_pending_challenges(&order, ChallengeType::Http01)
//!     .await?
//! {
//!     // serve `challenge.value` at `challenge.endpoint`, then
//!     orders.validate_challenge(&challenge.url).await?;
//! }
//!
//! let failed = orders.wait(&order, Duration::from_secs(60)).await?;
//! assert!(failed.is_empty());
//!
//! let csr = Csr::new_p256(&["example.com"])?;
//! let mut order = orders.finalize(&order, csr.der()).await?;
//!
//! while order.status() != acme::api::OrderStatus::Valid {
//!     tokio::time::sleep(Duration::from_secs(5)).await;
//!     orders.refresh(&mut order).await?;
//! }
//!
//! let chain = client.certificates().download(&order).await?;
//! # drop((account, chain));
//! # Ok(())
//! # }
//! ```
//!
//! ## Examples
//!
//! Complete usage examples are provided in the `demos/` directory of the source repository:
//!
//! - `http-01.rs`: serves the challenge files from a temporary Actix Web server
//! - `dns-01.rs`: prints the TXT records to create, including a wildcard name
//! - `account-management.rs`: persists the account key and restores the account
//!
//! # Domain Ownership
//!
//! Most website TLS certificates tries to prove ownership/control over the domain they are issued
//! for. For ACME, this means proving you control either:
//!
//! - a server answering HTTP requests for that domain;
//! - the DNS server answering name lookups against the domain.
//!
//! To use this library, there are points in the flow where you would need to modify either the web
//! server or DNS server before progressing to get the certificate. See
//! [`OrdersApi::describe_pending_challenges()`] and [`ChallengeDescription`].
//!
//! ## Multiple Domains
//!
//! When creating a new order, it's possible to provide multiple alt-names that will also be part of
//! the certificate. The ACME API requires you to prove ownership of each such domain; there is one
//! authorization per name.
//!
//! # Rate Limits
//!
//! The ACME API provider Let's Encrypt uses [rate limits] to ensure the API is not being abused. It
//! might be tempting to poll orders in a tight loop, but balance this against the real risk of
//! having access cut off.
//!
//! ## Use Staging For Development!
//!
//! Especially take care to use the Let's Encrypt staging environment for development where the rate
//! limits are more relaxed. See [`DirectoryUrl::LetsEncryptStaging`].
//!
//! [rate limits]: https://letsencrypt.org/docs/rate-limits

#![deny(rust_2018_idioms, nonstandard_style, future_incompatible)]

mod acc;
mod cert;
mod config;
mod dir;
mod error;
mod jws;
mod req;
mod trans;
mod util;

pub mod api;
pub mod order;

#[cfg(test)]
mod test;

pub use crate::{
    acc::{AccountApi, AccountCredentials, AccountInfo, RevocationReason},
    cert::{create_p256_key, CertificatesApi, Csr},
    config::{ClientConfig, DirectoryUrl},
    dir::Client,
    error::{Error, Result},
    jws::{key_authorization, key_authorization_sha256},
    order::{attestation_payload, ChallengeDescription, OrderInfo, OrdersApi},
    util::{base64url, der_to_pem, from_base64url, pem_to_der},
};
