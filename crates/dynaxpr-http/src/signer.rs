//! Request signing seam between the client and `dynaxpr-auth`.

use std::fmt;
use std::sync::Arc;

use bytes::Bytes;
use chrono::{DateTime, Utc};
use dynaxpr_auth::{AuthError, CredentialProvider, SigningParams, sign_request};

/// Signs outgoing requests in place, just before they are sent.
pub trait RequestSigner: Send + Sync + fmt::Debug + 'static {
    /// Sign the request.
    fn sign(&self, request: &mut http::Request<Bytes>) -> Result<(), AuthError>;
}

/// Leaves requests unsigned, for local servers that skip authentication.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopSigner;

impl RequestSigner for NoopSigner {
    fn sign(&self, _request: &mut http::Request<Bytes>) -> Result<(), AuthError> {
        Ok(())
    }
}

/// AWS Signature Version 4 signer.
///
/// Credentials are resolved from the provider on every request.
#[derive(Debug, Clone)]
pub struct SigV4Signer {
    provider: Arc<dyn CredentialProvider>,
    region: String,
    service: String,
}

impl SigV4Signer {
    /// Service name in the credential scope of DynamoDB requests.
    pub const SERVICE: &'static str = "dynamodb";

    /// Create a signer for DynamoDB in `region`.
    pub fn new(provider: impl CredentialProvider + 'static, region: impl Into<String>) -> Self {
        Self {
            provider: Arc::new(provider),
            region: region.into(),
            service: Self::SERVICE.to_owned(),
        }
    }

    /// Sign for a different service name, e.g. when a proxy expects one.
    #[must_use]
    pub fn with_service(mut self, service: impl Into<String>) -> Self {
        self.service = service.into();
        self
    }

    /// Sign a request as of `time`.
    pub fn sign_at(
        &self,
        request: &mut http::Request<Bytes>,
        time: DateTime<Utc>,
    ) -> Result<(), AuthError> {
        let credentials = self.provider.credentials()?;
        let params = SigningParams {
            credentials: &credentials,
            region: &self.region,
            service: &self.service,
            time,
        };
        sign_request(request, &params)
    }
}

impl RequestSigner for SigV4Signer {
    fn sign(&self, request: &mut http::Request<Bytes>) -> Result<(), AuthError> {
        self.sign_at(request, Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use dynaxpr_auth::{Credentials, StaticCredentialProvider};

    use super::*;

    fn request() -> http::Request<Bytes> {
        http::Request::builder()
            .method("POST")
            .uri("https://dynamodb.eu-west-1.amazonaws.com/")
            .header("x-amz-target", "DynamoDB_20120810.GetItem")
            .header("content-type", "application/x-amz-json-1.0")
            .body(Bytes::from_static(b"{}"))
            .unwrap()
    }

    #[test]
    fn test_should_leave_request_untouched_with_noop_signer() {
        let mut req = request();
        NoopSigner.sign(&mut req).unwrap();
        assert!(!req.headers().contains_key("authorization"));
    }

    #[test]
    fn test_should_sign_with_dynamodb_scope() {
        let signer = SigV4Signer::new(
            StaticCredentialProvider::new(Credentials::new("AKID", "secret")),
            "eu-west-1",
        );
        let mut req = request();
        let time = Utc.with_ymd_and_hms(2024, 2, 29, 12, 30, 0).unwrap();
        signer.sign_at(&mut req, time).unwrap();

        let authorization = req.headers()["authorization"].to_str().unwrap();
        assert!(authorization.starts_with(
            "AWS4-HMAC-SHA256 Credential=AKID/20240229/eu-west-1/dynamodb/aws4_request, "
        ));
        assert!(authorization.contains("SignedHeaders=content-type;host;x-amz-date;x-amz-target,"));
        assert_eq!(req.headers()["x-amz-date"], "20240229T123000Z");
    }

    #[test]
    fn test_should_be_deterministic_for_fixed_time() {
        let signer = SigV4Signer::new(
            StaticCredentialProvider::new(Credentials::new("AKID", "secret")),
            "us-east-1",
        );
        let time = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let mut first = request();
        let mut second = request();
        signer.sign_at(&mut first, time).unwrap();
        signer.sign_at(&mut second, time).unwrap();
        assert_eq!(first.headers()["authorization"], second.headers()["authorization"]);
    }
}
