//! AWS Signature Version 4 signing.
//!
//! [`sign_request`] runs the whole flow on an outgoing request:
//!
//! 1. Add `host`, `x-amz-date` and, for temporary credentials,
//!    `x-amz-security-token`.
//! 2. Build the canonical request over every signable header.
//! 3. Hash it into the string to sign with the credential scope.
//! 4. Derive the signing key and attach the `Authorization` header.

use chrono::{DateTime, Utc};
use digest::KeyInit;
use hmac::{Hmac, Mac};
use http::header::{AUTHORIZATION, HOST, HeaderValue};
use sha2::{Digest, Sha256};

use crate::canonical::CanonicalRequest;
use crate::credentials::Credentials;
use crate::error::AuthError;

/// The signing algorithm identifier.
pub const ALGORITHM: &str = "AWS4-HMAC-SHA256";

const X_AMZ_DATE: &str = "x-amz-date";
const X_AMZ_SECURITY_TOKEN: &str = "x-amz-security-token";

type HmacSha256 = Hmac<Sha256>;

/// Everything besides the request needed to produce a signature.
#[derive(Debug, Clone, Copy)]
pub struct SigningParams<'a> {
    /// The credentials to sign with.
    pub credentials: &'a Credentials,
    /// The region of the credential scope, e.g. `us-east-1`.
    pub region: &'a str,
    /// The service of the credential scope, e.g. `dynamodb`.
    pub service: &'a str,
    /// The signing time.
    pub time: DateTime<Utc>,
}

impl SigningParams<'_> {
    /// `YYYYMMDD` of the signing time.
    #[must_use]
    pub fn date(&self) -> String {
        self.time.format("%Y%m%d").to_string()
    }

    /// ISO 8601 basic format of the signing time, as sent in `x-amz-date`.
    #[must_use]
    pub fn timestamp(&self) -> String {
        self.time.format("%Y%m%dT%H%M%SZ").to_string()
    }

    /// `date/region/service/aws4_request`.
    #[must_use]
    pub fn credential_scope(&self) -> String {
        format!("{}/{}/{}/aws4_request", self.date(), self.region, self.service)
    }
}

/// Sign a request in place.
///
/// Any existing `Authorization` header is replaced. The body is hashed as
/// is, so it must not change after signing.
///
/// # Errors
///
/// Returns [`AuthError::MissingHost`] when the host cannot be determined and
/// [`AuthError::InvalidHeaderValue`] when a header is not visible ASCII.
pub fn sign_request<B: AsRef<[u8]>>(
    request: &mut http::Request<B>,
    params: &SigningParams<'_>,
) -> Result<(), AuthError> {
    if !request.headers().contains_key(HOST) {
        let host = request
            .uri()
            .authority()
            .map(|authority| authority.as_str().to_owned())
            .ok_or(AuthError::MissingHost)?;
        request.headers_mut().insert(HOST, header_value("host", &host)?);
    }

    let timestamp = params.timestamp();
    request
        .headers_mut()
        .insert(X_AMZ_DATE, header_value(X_AMZ_DATE, &timestamp)?);

    match params.credentials.session_token() {
        Some(token) => {
            let value = header_value(X_AMZ_SECURITY_TOKEN, token)?;
            request.headers_mut().insert(X_AMZ_SECURITY_TOKEN, value);
        }
        None => {
            request.headers_mut().remove(X_AMZ_SECURITY_TOKEN);
        }
    }

    let payload_hash = hash_payload(request.body().as_ref());
    let canonical = CanonicalRequest::from_request(request, &payload_hash)?;
    let canonical_hash = hash_payload(canonical.render().as_bytes());

    let scope = params.credential_scope();
    let string_to_sign = build_string_to_sign(&timestamp, &scope, &canonical_hash);
    let signing_key = derive_signing_key(
        params.credentials.secret_access_key(),
        &params.date(),
        params.region,
        params.service,
    );
    let signature = compute_signature(&signing_key, &string_to_sign);

    let authorization = format!(
        "{ALGORITHM} Credential={}/{scope}, SignedHeaders={}, Signature={signature}",
        params.credentials.access_key_id(),
        canonical.signed_headers(),
    );
    tracing::trace!(
        scope = %scope,
        signed_headers = %canonical.signed_headers(),
        "signed request"
    );
    request
        .headers_mut()
        .insert(AUTHORIZATION, header_value("authorization", &authorization)?);
    Ok(())
}

/// Build the string to sign.
///
/// ```text
/// AWS4-HMAC-SHA256\n<timestamp>\n<credential scope>\n<hex(SHA256(canonical request))>
/// ```
#[must_use]
pub fn build_string_to_sign(
    timestamp: &str,
    credential_scope: &str,
    canonical_request_hash: &str,
) -> String {
    format!("{ALGORITHM}\n{timestamp}\n{credential_scope}\n{canonical_request_hash}")
}

/// Derive the signing key by chaining HMAC-SHA256 over the scope.
///
/// ```text
/// kDate    = HMAC("AWS4" + secret, date)
/// kRegion  = HMAC(kDate, region)
/// kService = HMAC(kRegion, service)
/// kSigning = HMAC(kService, "aws4_request")
/// ```
#[must_use]
pub fn derive_signing_key(secret_key: &str, date: &str, region: &str, service: &str) -> Vec<u8> {
    [region, service, "aws4_request"].iter().fold(
        hmac_sha256(format!("AWS4{secret_key}").as_bytes(), date.as_bytes()),
        |key, part| hmac_sha256(&key, part.as_bytes()),
    )
}

/// Hex-encoded HMAC-SHA256 of `data` under `signing_key`.
#[must_use]
pub fn compute_signature(signing_key: &[u8], data: &str) -> String {
    hex::encode(hmac_sha256(signing_key, data.as_bytes()))
}

/// Hex-encoded SHA-256 of a payload.
///
/// ```
/// use dynaxpr_auth::sigv4::hash_payload;
///
/// assert_eq!(
///     hash_payload(b""),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
#[must_use]
pub fn hash_payload(payload: &[u8]) -> String {
    hex::encode(Sha256::digest(payload))
}

fn hmac_sha256(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac =
        <HmacSha256 as KeyInit>::new_from_slice(key).expect("HMAC accepts keys of any length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}

fn header_value(name: &str, value: &str) -> Result<HeaderValue, AuthError> {
    HeaderValue::from_str(value).map_err(|e| AuthError::InvalidHeaderValue {
        name: name.to_owned(),
        reason: e.to_string(),
    })
}
