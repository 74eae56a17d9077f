//! Service error responses.
//!
//! A failed call answers with a JSON body such as
//! `{"__type": "com.amazonaws.dynamodb.v20120810#ResourceNotFoundException",
//! "message": "..."}`. Some errors spell the message field `Message`.

use std::fmt;

use serde::Deserialize;

macro_rules! error_codes {
    ($($(#[$doc:meta])* $variant:ident $(| $alias:literal)*),+ $(,)?) => {
        /// Error codes the service is known to return.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        #[non_exhaustive]
        pub enum DynamoDBErrorCode {
            $($(#[$doc])* $variant,)+
            /// A code this crate does not recognise; see `DynamoDBError::type_name`.
            #[default]
            Unknown,
        }

        impl DynamoDBErrorCode {
            /// The short wire name of the code.
            #[must_use]
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => stringify!($variant),)+
                    Self::Unknown => "Unknown",
                }
            }

            /// Map a `__type` value, qualified or bare, to a code.
            #[must_use]
            pub fn from_type_name(type_name: &str) -> Self {
                let (_, short) = type_name.rsplit_once('#').unwrap_or(("", type_name));
                match short {
                    $(stringify!($variant) $(| $alias)* => Self::$variant,)+
                    _ => Self::Unknown,
                }
            }
        }
    };
}

error_codes! {
    /// The conditional expression evaluated to false.
    ConditionalCheckFailedException,
    /// The table or index does not exist.
    ResourceNotFoundException,
    /// The table is being created, updated or deleted.
    ResourceInUseException,
    /// The request was malformed.
    ValidationException,
    /// The request body could not be parsed.
    SerializationException,
    /// Another transaction touches the same item.
    TransactionConflictException,
    /// An item collection grew past 10 GB.
    ItemCollectionSizeLimitExceededException,
    /// Provisioned throughput is exhausted.
    ProvisionedThroughputExceededException,
    /// Account-level request limit reached.
    RequestLimitExceeded,
    /// The caller is sending too fast.
    ThrottlingException,
    /// Failure on the service side.
    InternalServerError | "InternalFailure",
    /// The service is temporarily down.
    ServiceUnavailable,
    /// No `X-Amz-Target` header.
    MissingAction,
    /// The credentials may not perform the action.
    AccessDeniedException,
    /// The access key is unknown.
    UnrecognizedClientException,
    /// The request signature is wrong.
    InvalidSignatureException,
}

impl DynamoDBErrorCode {
    /// Whether an identical request may succeed later.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ThrottlingException
                | Self::ProvisionedThroughputExceededException
                | Self::RequestLimitExceeded
                | Self::TransactionConflictException
                | Self::InternalServerError
                | Self::ServiceUnavailable
        )
    }
}

impl fmt::Display for DynamoDBErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An error returned by the service.
#[derive(Debug)]
pub struct DynamoDBError {
    /// Parsed error code.
    pub code: DynamoDBErrorCode,
    /// The raw `__type`, kept so unknown codes are still inspectable.
    pub type_name: String,
    /// Message sent by the service, or the raw body when it was not JSON.
    pub message: String,
    /// HTTP status of the response.
    pub status_code: http::StatusCode,
}

impl fmt::Display for DynamoDBError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (HTTP {}): {}",
            self.short_type(),
            self.status_code.as_u16(),
            self.message
        )
    }
}

impl std::error::Error for DynamoDBError {}

#[derive(Deserialize)]
struct ErrorEnvelope {
    #[serde(rename = "__type")]
    kind: Option<String>,
    #[serde(alias = "Message")]
    message: Option<String>,
}

impl DynamoDBError {
    /// Build an error locally, picking the status the service would use.
    #[must_use]
    pub fn with_message(code: DynamoDBErrorCode, message: impl Into<String>) -> Self {
        let status_code = match code {
            DynamoDBErrorCode::InternalServerError => http::StatusCode::INTERNAL_SERVER_ERROR,
            DynamoDBErrorCode::ServiceUnavailable => http::StatusCode::SERVICE_UNAVAILABLE,
            _ => http::StatusCode::BAD_REQUEST,
        };
        Self {
            code,
            type_name: code.as_str().to_owned(),
            message: message.into(),
            status_code,
        }
    }

    /// Decode the body of a non-2xx response.
    ///
    /// Bodies without a `__type` (proxies, load balancers) still produce an
    /// error: 5xx maps to `InternalServerError`, anything else to `Unknown`,
    /// and the raw body becomes the message.
    #[must_use]
    pub fn from_response(status_code: http::StatusCode, body: &[u8]) -> Self {
        let envelope = serde_json::from_slice::<ErrorEnvelope>(body).ok();
        if let Some(ErrorEnvelope {
            kind: Some(type_name),
            message,
        }) = envelope
        {
            return Self {
                code: DynamoDBErrorCode::from_type_name(&type_name),
                type_name,
                message: message.unwrap_or_default(),
                status_code,
            };
        }

        let code = if status_code.is_server_error() {
            DynamoDBErrorCode::InternalServerError
        } else {
            DynamoDBErrorCode::Unknown
        };
        Self {
            code,
            type_name: code.as_str().to_owned(),
            message: String::from_utf8_lossy(body).into_owned(),
            status_code,
        }
    }

    /// `type_name` without its namespace prefix.
    #[must_use]
    pub fn short_type(&self) -> &str {
        self.type_name
            .rsplit_once('#')
            .map_or(self.type_name.as_str(), |(_, short)| short)
    }

    /// Whether an identical request may succeed later. Any 5xx counts.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        self.code.is_retryable() || self.status_code.is_server_error()
    }
}
