//! Client error types.

use dynaxpr_auth::AuthError;
use dynaxpr_core::{CodecError, ExpressionError, KeyConditionError, SchemaError};
use dynaxpr_model::{DynamoDBError, DynamoDBOperation};

/// Errors raised while moving bytes over the wire.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The request could not be constructed, e.g. a malformed endpoint.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The request could not be sent or no response arrived.
    #[error("request to {url} failed: {reason}")]
    Request {
        /// The target URL.
        url: String,
        /// The underlying failure.
        reason: String,
    },

    /// The response body could not be read.
    #[error("failed to read response body: {0}")]
    Body(String),
}

/// Any error returned by [`Client`](crate::Client).
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The request was rejected by the translation core before sending.
    #[error(transparent)]
    Core(#[from] dynaxpr_core::Error),

    /// A request value could not be encoded, or a response item decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The service returned an error response.
    #[error(transparent)]
    Service(#[from] DynamoDBError),

    /// The transport failed.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// The request could not be signed.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// The JSON envelope could not be produced or parsed.
    #[error("{operation}: invalid JSON payload: {source}")]
    Serialization {
        /// The operation being performed.
        operation: DynamoDBOperation,
        /// The serde error.
        #[source]
        source: serde_json::Error,
    },

    /// An item or key with no attributes was supplied.
    #[error("{operation} requires at least one attribute in the item or key")]
    EmptyItem {
        /// The operation being performed.
        operation: DynamoDBOperation,
    },

    /// Retryable failures kept coming until the retry time limit ran out.
    #[error("{operation}: gave up after {attempts} attempts")]
    RetryTimeout {
        /// The operation being performed.
        operation: DynamoDBOperation,
        /// Requests sent, the first one included.
        attempts: u32,
        /// The error of the final attempt.
        #[source]
        last: Box<ClientError>,
    },
}

impl ClientError {
    /// The service error, if the request reached the service.
    #[must_use]
    pub fn service_error(&self) -> Option<&DynamoDBError> {
        match self {
            Self::Service(err) => Some(err),
            Self::RetryTimeout { last, .. } => last.service_error(),
            _ => None,
        }
    }

    /// Returns `true` for throttling, server-side and transport failures.
    ///
    /// The client resends these per its [`RetryConfig`](crate::RetryConfig).
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Service(err) => err.is_retryable(),
            Self::Transport(TransportError::Request { .. } | TransportError::Body(_)) => true,
            _ => false,
        }
    }
}

macro_rules! impl_from_core {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for ClientError {
                fn from(err: $ty) -> Self {
                    Self::Core(err.into())
                }
            }
        )*
    };
}

impl_from_core!(SchemaError, ExpressionError, KeyConditionError);

#[cfg(test)]
mod tests {
    use dynaxpr_model::error::DynamoDBErrorCode;

    use super::*;

    #[test]
    fn test_should_route_core_errors_through_core_variant() {
        let err = ClientError::from(ExpressionError::EmptyUpdate);
        assert!(matches!(
            err,
            ClientError::Core(dynaxpr_core::Error::Expression(ExpressionError::EmptyUpdate))
        ));
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_should_flag_throttling_as_retryable() {
        let err = ClientError::from(DynamoDBError::with_message(
            DynamoDBErrorCode::ThrottlingException,
            "slow down",
        ));
        assert!(err.is_retryable());
        assert_eq!(
            err.service_error().map(|e| e.code),
            Some(DynamoDBErrorCode::ThrottlingException)
        );
    }
}
