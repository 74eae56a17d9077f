//! Canonical request construction for outgoing requests.
//!
//! The canonical request is the normalized form of an HTTP request that gets
//! hashed into the string to sign:
//!
//! ```text
//! HTTPMethod\n
//! CanonicalURI\n
//! CanonicalQueryString\n
//! CanonicalHeaders\n
//! \n
//! SignedHeaders\n
//! HashedPayload
//! ```

use std::collections::BTreeMap;

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};

use crate::error::AuthError;

/// Characters left unencoded in path segments: RFC 3986 unreserved set.
const UNRESERVED: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Headers never included in the signature. Proxies and HTTP stacks are free
/// to rewrite them after signing.
const UNSIGNED_HEADERS: &[&str] = &["authorization", "user-agent", "content-length", "expect"];

/// The canonical form of a request, ready to be rendered and hashed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    method: String,
    uri: String,
    query: String,
    headers: BTreeMap<String, String>,
    payload_hash: String,
}

impl CanonicalRequest {
    /// Build the canonical request from a request and the hex SHA-256 of its
    /// body.
    ///
    /// Every header on the request is signed except the ones proxies may
    /// rewrite. Repeated headers are joined with commas in arrival order.
    pub fn from_request<B>(
        request: &http::Request<B>,
        payload_hash: &str,
    ) -> Result<Self, AuthError> {
        let mut headers: BTreeMap<String, String> = BTreeMap::new();
        for (name, value) in request.headers() {
            let name = name.as_str();
            if UNSIGNED_HEADERS.contains(&name) {
                continue;
            }
            let value = value.to_str().map_err(|e| AuthError::InvalidHeaderValue {
                name: name.to_owned(),
                reason: e.to_string(),
            })?;
            let value = normalize_header_value(value);
            headers
                .entry(name.to_owned())
                .and_modify(|existing| {
                    existing.push(',');
                    existing.push_str(&value);
                })
                .or_insert(value);
        }

        Ok(Self {
            method: request.method().as_str().to_owned(),
            uri: canonical_uri(request.uri().path()),
            query: canonical_query(request.uri().query().unwrap_or_default()),
            headers,
            payload_hash: payload_hash.to_owned(),
        })
    }

    /// The `;`-separated, sorted list of signed header names.
    #[must_use]
    pub fn signed_headers(&self) -> String {
        self.headers.keys().map(String::as_str).collect::<Vec<_>>().join(";")
    }

    /// Render the canonical request text.
    #[must_use]
    pub fn render(&self) -> String {
        let headers: String = self
            .headers
            .iter()
            .map(|(name, value)| format!("{name}:{value}\n"))
            .collect();
        format!(
            "{}\n{}\n{}\n{headers}\n{}\n{}",
            self.method,
            self.uri,
            self.query,
            self.signed_headers(),
            self.payload_hash
        )
    }
}

/// Percent-encode each path segment, keeping the slashes.
///
/// Segments are decoded first so an already encoded path is not encoded
/// twice. An empty path is `/`.
#[must_use]
pub fn canonical_uri(path: &str) -> String {
    if path.is_empty() {
        return "/".to_owned();
    }
    path.split('/')
        .map(|segment| {
            let decoded = percent_decode_str(segment).decode_utf8_lossy();
            utf8_percent_encode(&decoded, UNRESERVED).to_string()
        })
        .collect::<Vec<_>>()
        .join("/")
}

/// Sort query parameters by name, then by value.
///
/// Values are kept as they appear on the URI; the transport sends exactly
/// these bytes.
#[must_use]
pub fn canonical_query(query: &str) -> String {
    let mut pairs: Vec<(&str, &str)> = query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| pair.split_once('=').unwrap_or((pair, "")))
        .collect();
    pairs.sort_unstable();
    pairs
        .iter()
        .map(|(name, value)| format!("{name}={value}"))
        .collect::<Vec<_>>()
        .join("&")
}

/// Trim a header value and collapse internal whitespace runs to one space.
#[must_use]
pub fn normalize_header_value(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}
