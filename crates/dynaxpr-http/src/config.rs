//! Client configuration.
//!
//! [`ClientConfig`] is loaded from environment variables by default and can
//! also be deserialized from a file or assembled with its builder.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::retry::{DEFAULT_TIME_LIMIT_SECS, RetryConfig};

/// Region used when neither `AWS_REGION` nor `DEFAULT_REGION` is set.
pub const DEFAULT_REGION: &str = "us-east-1";

/// DynamoDB client configuration.
///
/// # Examples
///
/// ```
/// use dynaxpr_http::ClientConfig;
///
/// let config = ClientConfig::builder()
///     .region("eu-west-1")
///     .endpoint_url("http://localhost:8000")
///     .build();
/// assert_eq!(config.endpoint(), "http://localhost:8000");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase", default)]
pub struct ClientConfig {
    /// The region requests are signed for.
    #[builder(default = String::from(DEFAULT_REGION), setter(into))]
    pub region: String,

    /// Override of the service endpoint, e.g. a local DynamoDB-compatible
    /// server. When unset the regional AWS endpoint is used.
    #[builder(default, setter(strip_option, into))]
    pub endpoint_url: Option<String>,

    /// Send requests unsigned.
    #[builder(default = false)]
    pub skip_signature: bool,

    /// How throttled and transient failures are retried.
    #[builder(default)]
    pub retry: RetryConfig,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            region: String::from(DEFAULT_REGION),
            endpoint_url: None,
            skip_signature: false,
            retry: RetryConfig::default(),
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `AWS_REGION`, then `DEFAULT_REGION` | `us-east-1` |
    /// | `DYNAMODB_ENDPOINT_URL` | regional AWS endpoint |
    /// | `DYNAMODB_SKIP_SIGNATURE` | `false` |
    /// | `DYNAMODB_RETRY_TIME_LIMIT_SECS` | `60` |
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.is_empty());
        Self {
            region: non_empty("AWS_REGION")
                .or_else(|| non_empty("DEFAULT_REGION"))
                .unwrap_or_else(|| DEFAULT_REGION.to_owned()),
            endpoint_url: non_empty("DYNAMODB_ENDPOINT_URL"),
            skip_signature: non_empty("DYNAMODB_SKIP_SIGNATURE").is_some_and(|v| parse_bool(&v)),
            retry: RetryConfig {
                time_limit_secs: non_empty("DYNAMODB_RETRY_TIME_LIMIT_SECS")
                    .and_then(|v| v.parse().ok())
                    .unwrap_or(DEFAULT_TIME_LIMIT_SECS),
                ..RetryConfig::default()
            },
        }
    }

    /// The URL requests are sent to.
    #[must_use]
    pub fn endpoint(&self) -> String {
        self.endpoint_url
            .clone()
            .unwrap_or_else(|| format!("https://dynamodb.{}.amazonaws.com", self.region))
    }
}

/// Parse a string as a boolean, accepting `1`, `true` and `yes` in any case.
fn parse_bool(value: &str) -> bool {
    value == "1" || value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("yes")
}
