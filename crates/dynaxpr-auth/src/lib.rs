//! AWS Signature Version 4 request signing for DynamoDB clients.
//!
//! The crate signs outgoing `http::Request`s in place: it computes the
//! canonical request, derives the signing key from the credential scope and
//! attaches the `Authorization`, `x-amz-date` and (for temporary
//! credentials) `x-amz-security-token` headers.
//!
//! Credentials come from a [`CredentialProvider`]; a static provider and one
//! reading the standard `AWS_*` environment variables are included.

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod sigv4;

pub use credentials::{
    CredentialProvider, Credentials, EnvCredentialProvider, StaticCredentialProvider,
};
pub use error::AuthError;
pub use sigv4::{SigningParams, sign_request};
