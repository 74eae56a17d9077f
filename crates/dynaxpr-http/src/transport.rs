//! HTTP transport abstraction.

use std::future::Future;
use std::pin::Pin;

use bytes::Bytes;

use crate::error::TransportError;

/// The future returned by [`HttpTransport::send`].
pub type TransportFuture =
    Pin<Box<dyn Future<Output = Result<http::Response<Bytes>, TransportError>> + Send>>;

/// Sends a fully built, signed request and returns the buffered response.
///
/// The trait is object safe so the client can hold an `Arc<dyn HttpTransport>`.
/// Dropping the returned future cancels the request.
pub trait HttpTransport: Send + Sync + 'static {
    /// Send a request.
    fn send(&self, request: http::Request<Bytes>) -> TransportFuture;
}

/// The default transport, backed by a shared `reqwest::Client`.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Create a transport with a default `reqwest::Client`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a preconfigured `reqwest::Client`, e.g. with custom timeouts.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl HttpTransport for ReqwestTransport {
    fn send(&self, request: http::Request<Bytes>) -> TransportFuture {
        let client = self.client.clone();
        Box::pin(async move {
            let (parts, body) = request.into_parts();
            let url = parts.uri.to_string();
            let response = client
                .request(parts.method, &url)
                .headers(parts.headers)
                .body(body)
                .send()
                .await
                .map_err(|e| TransportError::Request {
                    url: url.clone(),
                    reason: e.to_string(),
                })?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes()
                .await
                .map_err(|e| TransportError::Body(e.to_string()))?;

            let mut out = http::Response::new(body);
            *out.status_mut() = status;
            *out.headers_mut() = headers;
            Ok(out)
        })
    }
}
