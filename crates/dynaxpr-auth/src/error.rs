//! Error types for request signing.

/// Errors that can occur while resolving credentials or signing a request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    /// A required credential could not be resolved.
    #[error("missing credentials: {0} is not set")]
    MissingCredentials(&'static str),

    /// The request has neither a `Host` header nor an absolute URI.
    #[error("cannot sign a request without a host")]
    MissingHost,

    /// A header on the request, or one produced by signing, is not valid
    /// visible ASCII.
    #[error("invalid value for header `{name}`: {reason}")]
    InvalidHeaderValue {
        /// The header name.
        name: String,
        /// Why the value was rejected.
        reason: String,
    },
}
