use std::{collections::VecDeque, marker::PhantomData, sync::Arc};

use parking_lot::Mutex;
use reqwest::{header::HeaderMap, Method};
use serde::Serialize;

use crate::{
    acc::AcmeKey,
    api,
    error::{Error, Result},
    jws::{jws_with, JwsProtectedHeader},
    req::{req_expect_header, req_handle_error, Http},
    util::{is_base64url, read_json},
};

/// Maximum number of nonces kept for later requests.
const NONCE_POOL_CAPACITY: usize = 10;

/// Describes one ACME API call: where it goes, what is sent and what comes back.
///
/// `R` is the type the response body decodes to; `B` is the request payload. A missing payload
/// makes the call a POST-as-GET.
#[derive(Debug)]
pub(crate) struct Endpoint<'a, R, B: ?Sized = api::EmptyObject> {
    method: Method,
    url: &'a str,
    body: Option<&'a B>,
    _response: PhantomData<fn() -> R>,
}

impl<'a, R> Endpoint<'a, R> {
    /// POST-as-GET, see [RFC 8555 §6.3].
    ///
    /// [RFC 8555 §6.3]: https://datatracker.ietf.org/doc/html/rfc8555#section-6.3
    pub(crate) fn post_as_get(url: &'a str) -> Self {
        Endpoint {
            method: Method::POST,
            url,
            body: None,
            _response: PhantomData,
        }
    }
}

impl<'a, R, B: Serialize + ?Sized> Endpoint<'a, R, B> {
    pub(crate) fn post(url: &'a str, body: &'a B) -> Self {
        Endpoint {
            method: Method::POST,
            url,
            body: Some(body),
            _response: PhantomData,
        }
    }
}

/// Types a successful response body can be decoded into.
pub(crate) trait ResponseBody: Sized {
    fn decode(body: &[u8]) -> Result<Self>;
}

macro_rules! json_response_body {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl ResponseBody for $ty {
                fn decode(body: &[u8]) -> Result<Self> {
                    read_json(body)
                }
            }
        )+
    };
}

json_response_body!(
    api::Account,
    api::Authorization,
    api::Challenge,
    api::Order,
    api::OrdersList,
);

/// PEM text, as returned by the certificate endpoint.
impl ResponseBody for String {
    fn decode(body: &[u8]) -> Result<Self> {
        log::trace!("{}", String::from_utf8_lossy(body));
        Ok(String::from_utf8_lossy(body).into_owned())
    }
}

/// Ignores the body.
impl ResponseBody for () {
    fn decode(_body: &[u8]) -> Result<Self> {
        Ok(())
    }
}

/// A decoded response body together with the response headers.
#[derive(Debug)]
pub(crate) struct ApiResponse<R> {
    pub(crate) body: R,
    pub(crate) headers: HeaderMap,
}

impl<R> ApiResponse<R> {
    pub(crate) fn location(&self) -> Option<String> {
        req_expect_header(&self.headers, "location").ok()
    }

    /// Returns the `Location` header, required for responses creating a resource.
    pub(crate) fn expect_location(&self) -> Result<String> {
        req_expect_header(&self.headers, "location")
    }

    /// Returns the targets of all `Link` headers with the given relation.
    pub(crate) fn links(&self, rel: &str) -> Vec<String> {
        self.headers
            .get_all(reqwest::header::LINK)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| parse_links(value, rel))
            .collect()
    }
}

/// Parses an [RFC 8288] `Link` header value, keeping targets with relation `rel`.
///
/// [RFC 8288]: https://datatracker.ietf.org/doc/html/rfc8288
fn parse_links(value: &str, rel: &str) -> Vec<String> {
    value
        .split(',')
        .filter_map(|link| {
            let mut parts = link.split(';');

            let target = parts.next()?.trim();
            let target = target.strip_prefix('<')?.strip_suffix('>')?;

            let matches = parts.any(|param| {
                let Some((name, value)) = param.split_once('=') else {
                    return false;
                };

                name.trim().eq_ignore_ascii_case("rel")
                    && value
                        .trim()
                        .trim_matches('"')
                        .split_ascii_whitespace()
                        .any(|r| r.eq_ignore_ascii_case(rel))
            });

            matches.then(|| target.to_owned())
        })
        .collect()
}

/// JWS payload and nonce handling for requests to the API.
///
/// Requests are signed either with the full public key (`call_jwk`, only for looking up or
/// creating an account) or with the account URL as key ID (`call_kid`, everything else).
#[derive(Clone, Debug)]
pub(crate) struct Transport {
    http: Http,
    nonce_pool: Arc<NoncePool>,
}

impl Transport {
    pub(crate) fn new(http: Http, nonce_url: &str) -> Self {
        Transport {
            http,
            nonce_pool: Arc::new(NoncePool::new(nonce_url)),
        }
    }

    /// Make call using the full JWK.
    pub(crate) async fn call_jwk<R, B>(
        &self,
        endpoint: Endpoint<'_, R, B>,
        key: &AcmeKey,
    ) -> Result<ApiResponse<R>>
    where
        R: ResponseBody,
        B: Serialize + ?Sized,
    {
        let jwk = key.jwk()?;

        self.do_call(endpoint, key, |url, nonce| {
            JwsProtectedHeader::new_jwk(jwk.clone(), url, nonce)
        })
        .await
    }

    /// Make call using the account URL as key ID.
    pub(crate) async fn call_kid<R, B>(
        &self,
        endpoint: Endpoint<'_, R, B>,
        key: &AcmeKey,
        account_url: &str,
    ) -> Result<ApiResponse<R>>
    where
        R: ResponseBody,
        B: Serialize + ?Sized,
    {
        self.do_call(endpoint, key, |url, nonce| {
            JwsProtectedHeader::new_kid(account_url, url, nonce)
        })
        .await
    }

    async fn do_call<R, B, F>(
        &self,
        endpoint: Endpoint<'_, R, B>,
        key: &AcmeKey,
        make_header: F,
    ) -> Result<ApiResponse<R>>
    where
        R: ResponseBody,
        B: Serialize + ?Sized,
        F: Fn(&str, String) -> JwsProtectedHeader,
    {
        let mut retried = false;

        loop {
            let nonce = self.nonce_pool.get_nonce(&self.http).await?;

            let protected = make_header(endpoint.url, nonce);
            let jws = jws_with(&protected, key.signing_key(), endpoint.body)?;
            let body = serde_json::to_string(&jws)?;

            log::debug!("Call endpoint: {}", endpoint.url);

            let res = self
                .http
                .send_jose(endpoint.method.clone(), endpoint.url, body)
                .await?;

            let headers = res.headers().clone();

            match req_handle_error(res).await {
                Ok(res) => {
                    self.nonce_pool.extract_nonce(&headers);
                    let body = res.bytes().await?;

                    return Ok(ApiResponse {
                        body: R::decode(&body)?,
                        headers,
                    });
                }

                Err(Error::Protocol(problem)) if problem.is_bad_nonce() && !retried => {
                    log::debug!("Retrying on bad nonce");
                    // the error response carries a fresh nonce; only older ones are stale
                    self.nonce_pool.replace_with(&headers);
                    retried = true;
                }

                Err(err) => {
                    // error responses carry a nonce too
                    self.nonce_pool.extract_nonce(&headers);
                    return Err(err);
                }
            }
        }
    }
}

/// Shared pool of nonces.
///
/// Each nonce is handed out once and then forgotten.
#[derive(Debug)]
pub(crate) struct NoncePool {
    nonce_url: String,
    pool: Mutex<VecDeque<String>>,
}

impl NoncePool {
    pub(crate) fn new(nonce_url: &str) -> Self {
        NoncePool {
            nonce_url: nonce_url.to_owned(),
            pool: Mutex::new(VecDeque::with_capacity(NONCE_POOL_CAPACITY)),
        }
    }

    fn extract_nonce(&self, headers: &HeaderMap) {
        let Ok(nonce) = req_expect_header(headers, "replay-nonce") else {
            return;
        };

        // see https://datatracker.ietf.org/doc/html/rfc8555#section-6.5.1
        if !is_base64url(&nonce) {
            log::debug!("Ignoring invalid nonce: {nonce:?}");
            return;
        }

        log::trace!("Extracting new nonce");

        let mut pool = self.pool.lock();
        pool.push_back(nonce);

        if pool.len() > NONCE_POOL_CAPACITY {
            pool.pop_front();
        }
    }

    fn clear(&self) {
        self.pool.lock().clear();
    }

    /// Drops every pooled nonce, then keeps the one carried by `headers`, if any.
    fn replace_with(&self, headers: &HeaderMap) {
        self.clear();
        self.extract_nonce(headers);
    }

    async fn get_nonce(&self, http: &Http) -> Result<String> {
        {
            let mut pool = self.pool.lock();

            if let Some(nonce) = pool.pop_front() {
                log::trace!("Use previous nonce");
                return Ok(nonce);
            }
        }

        log::debug!("Request new nonce");
        let res = req_handle_error(http.head(&self.nonce_url).await?).await?;

        match req_expect_header(res.headers(), "replay-nonce") {
            Ok(nonce) if is_base64url(&nonce) => Ok(nonce),
            _ => Err(Error::NoNonceReturned),
        }
    }
}
