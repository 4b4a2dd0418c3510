use reqwest::{header::HeaderMap, Method, Response};

use crate::{api::Problem, config::ClientConfig, error::*};

/// Thin wrapper over the HTTP client with the request conventions of ACME servers.
#[derive(Debug, Clone)]
pub(crate) struct Http {
    client: reqwest::Client,
}

impl Http {
    pub(crate) fn from_config(config: &ClientConfig) -> Result<Self> {
        if let Some(client) = &config.http_client {
            return Ok(Http {
                client: client.clone(),
            });
        }

        let mut builder = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.as_str());

        for pem in &config.root_certificates {
            for cert in reqwest::Certificate::from_pem_bundle(pem.as_bytes())? {
                builder = builder.add_root_certificate(cert);
            }
        }

        Ok(Http {
            client: builder.build()?,
        })
    }

    pub(crate) async fn get(&self, url: &str) -> Result<Response> {
        log::trace!("GET {url}");
        Ok(self.client.get(url).send().await?)
    }

    pub(crate) async fn head(&self, url: &str) -> Result<Response> {
        log::trace!("HEAD {url}");
        Ok(self.client.head(url).send().await?)
    }

    pub(crate) async fn send_jose(&self, method: Method, url: &str, body: String) -> Result<Response> {
        log::trace!("{method} {url} {body}");
        Ok(self
            .client
            .request(method, url)
            .header(reqwest::header::CONTENT_TYPE, "application/jose+json")
            .body(body)
            .send()
            .await?)
    }
}

/// Passes 2xx responses through and turns everything else into an error.
///
/// Bodies that are RFC 7807 problem documents become [`Error::Protocol`]; anything else is
/// reported with its status and raw body.
pub(crate) async fn req_handle_error(res: Response) -> Result<Response> {
    // ok responses pass through
    if res.status().is_success() {
        return Ok(res);
    }

    let status = res.status().as_u16();

    // letsencrypt sometimes closes the TLS abruptly causing an error even though the body was
    // captured, so a failed read is treated as an empty body
    let body = res.text().await.unwrap_or_default();

    match serde_json::from_str::<Problem>(&body) {
        Ok(problem) => {
            log::debug!("Problem response ({status}): {problem}");
            Err(Error::Protocol(problem))
        }
        Err(_) => Err(Error::HttpStatus { status, body }),
    }
}

pub(crate) fn req_expect_header(headers: &HeaderMap, name: &'static str) -> Result<String> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(ToOwned::to_owned)
        .ok_or(Error::MissingHeader(name))
}
