use crate::{
    api::{self, ChallengeType},
    jws::{key_authorization, key_authorization_sha256},
};

/// What to publish, and where, to answer a challenge.
///
/// Obtained from [`OrdersApi::describe_pending_challenges()`]. Once the value is in place, pass
/// [`url`](Self::url) to [`OrdersApi::validate_challenge()`], or validate all at once with
/// [`OrdersApi::validate_challenges()`].
///
/// [`OrdersApi::describe_pending_challenges()`]: crate::OrdersApi::describe_pending_challenges()
/// [`OrdersApi::validate_challenge()`]: crate::OrdersApi::validate_challenge()
/// [`OrdersApi::validate_challenges()`]: crate::OrdersApi::validate_challenges()
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChallengeDescription {
    pub challenge_type: ChallengeType,

    /// Where the value must be published.
    ///
    /// - `dns-01`: the name of the `TXT` record, `_acme-challenge.<domain>`
    /// - `http-01`: the URL the CA fetches, `http://<domain>/.well-known/acme-challenge/<token>`
    /// - `device-attest-01`: the permanent identifier of the device
    pub endpoint: String,

    /// The exact value to publish.
    ///
    /// - `dns-01`: base64url encoded SHA-256 digest of the key authorization
    /// - `http-01`: the key authorization, served as the response body
    /// - `device-attest-01`: the key authorization the device has to attest
    pub value: String,

    /// Challenge URL, posted to when asking the CA to validate.
    pub url: String,
}

impl ChallengeDescription {
    /// Describes `challenge` of `authorization`, if this client knows how to answer its type.
    fn new(
        authorization: &api::Authorization,
        challenge: &api::Challenge,
        thumbprint: &str,
    ) -> Option<Self> {
        let identifier = authorization.identifier.value.as_str();
        let key_auth = key_authorization(&challenge.token, thumbprint);

        let (endpoint, value) = match challenge._type {
            ChallengeType::Dns01 => {
                let domain = identifier.strip_prefix("*.").unwrap_or(identifier);
                (
                    format!("_acme-challenge.{domain}"),
                    key_authorization_sha256(&key_auth),
                )
            }

            ChallengeType::Http01 => (
                format!(
                    "http://{identifier}/.well-known/acme-challenge/{}",
                    challenge.token
                ),
                key_auth,
            ),

            ChallengeType::DeviceAttest01 => (identifier.to_owned(), key_auth),

            ChallengeType::TlsAlpn01 | ChallengeType::Other(_) => return None,
        };

        Some(ChallengeDescription {
            challenge_type: challenge._type.clone(),
            endpoint,
            value,
            url: challenge.url.clone(),
        })
    }
}

/// Returns true if `challenge` should be answered when `preferring` a challenge type.
///
/// Wildcard names can only be validated over DNS, so their `dns-01` challenge is always picked.
/// That is the only extra type a wildcard brings in.
fn is_wanted(
    authorization: &api::Authorization,
    challenge: &api::Challenge,
    preferring: &ChallengeType,
) -> bool {
    let wanted = challenge._type == *preferring
        || (authorization.is_wildcard() && challenge._type == ChallengeType::Dns01);

    wanted && challenge.need_validate()
}

/// Describes the challenges of all pending authorizations that have to be answered.
pub(crate) fn describe_challenges(
    authorizations: &[api::Authorization],
    preferring: &ChallengeType,
    thumbprint: &str,
) -> Vec<ChallengeDescription> {
    authorizations
        .iter()
        .filter(|authz| authz.is_status_pending())
        .flat_map(|authz| {
            authz
                .challenges
                .iter()
                .filter(move |challenge| is_wanted(authz, challenge, preferring))
                .filter_map(move |challenge| ChallengeDescription::new(authz, challenge, thumbprint))
        })
        .collect()
}
