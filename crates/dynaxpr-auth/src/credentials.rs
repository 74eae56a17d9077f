//! Credentials and the providers that resolve them.

use std::env;
use std::fmt;

use crate::error::AuthError;

/// An AWS access key pair, optionally with a session token for temporary
/// credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    access_key_id: String,
    secret_access_key: String,
    session_token: Option<String>,
}

impl Credentials {
    /// Create long-term credentials.
    pub fn new(access_key_id: impl Into<String>, secret_access_key: impl Into<String>) -> Self {
        Self {
            access_key_id: access_key_id.into(),
            secret_access_key: secret_access_key.into(),
            session_token: None,
        }
    }

    /// Attach a session token.
    #[must_use]
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = Some(token.into());
        self
    }

    /// The access key ID.
    #[must_use]
    pub fn access_key_id(&self) -> &str {
        &self.access_key_id
    }

    /// The secret access key.
    #[must_use]
    pub fn secret_access_key(&self) -> &str {
        &self.secret_access_key
    }

    /// The session token, if these are temporary credentials.
    #[must_use]
    pub fn session_token(&self) -> Option<&str> {
        self.session_token.as_deref()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("access_key_id", &self.access_key_id)
            .field("secret_access_key", &"** redacted **")
            .field("session_token", &self.session_token.as_ref().map(|_| "** redacted **"))
            .finish()
    }
}

/// Source of credentials for signing.
///
/// Providers are consulted once per request, so implementations that fetch
/// from a remote store should cache.
pub trait CredentialProvider: Send + Sync + fmt::Debug {
    /// Resolve the current credentials.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredentials`] when no credentials are
    /// available.
    fn credentials(&self) -> Result<Credentials, AuthError>;
}

/// A provider that always returns the same credentials.
///
/// # Examples
///
/// ```
/// use dynaxpr_auth::{CredentialProvider, Credentials, StaticCredentialProvider};
///
/// let provider = StaticCredentialProvider::new(Credentials::new("AKID", "secret"));
/// assert_eq!(provider.credentials().unwrap().access_key_id(), "AKID");
/// ```
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Wrap a fixed set of credentials.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        Ok(self.credentials.clone())
    }
}

/// Reads `AWS_ACCESS_KEY_ID`, `AWS_SECRET_ACCESS_KEY` and the optional
/// `AWS_SESSION_TOKEN` on every call, so rotated credentials are picked up.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentialProvider;

impl EnvCredentialProvider {
    const ACCESS_KEY_ID: &'static str = "AWS_ACCESS_KEY_ID";
    const SECRET_ACCESS_KEY: &'static str = "AWS_SECRET_ACCESS_KEY";
    const SESSION_TOKEN: &'static str = "AWS_SESSION_TOKEN";

    /// Build credentials from an arbitrary variable lookup.
    pub(crate) fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Credentials, AuthError> {
        let non_empty = |key: &'static str| lookup(key).filter(|v| !v.is_empty());

        let access_key_id = non_empty(Self::ACCESS_KEY_ID)
            .ok_or(AuthError::MissingCredentials(Self::ACCESS_KEY_ID))?;
        let secret_access_key = non_empty(Self::SECRET_ACCESS_KEY)
            .ok_or(AuthError::MissingCredentials(Self::SECRET_ACCESS_KEY))?;

        let credentials = Credentials::new(access_key_id, secret_access_key);
        Ok(match non_empty(Self::SESSION_TOKEN) {
            Some(token) => credentials.with_session_token(token),
            None => credentials,
        })
    }
}

impl CredentialProvider for EnvCredentialProvider {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        Self::resolve(|key| env::var(key).ok())
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_should_redact_secrets_in_debug() {
        let credentials = Credentials::new("AKID", "topsecret").with_session_token("tok");
        let debug = format!("{credentials:?}");
        assert!(debug.contains("AKID"));
        assert!(!debug.contains("topsecret"));
        assert!(!debug.contains("tok\""));
    }

    #[test]
    fn test_should_resolve_env_credentials_with_token() {
        let credentials = EnvCredentialProvider::resolve(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", "secret"),
            ("AWS_SESSION_TOKEN", "token"),
        ]))
        .unwrap();
        assert_eq!(credentials.access_key_id(), "AKID");
        assert_eq!(credentials.secret_access_key(), "secret");
        assert_eq!(credentials.session_token(), Some("token"));
    }

    #[test]
    fn test_should_report_missing_secret_key() {
        let err = EnvCredentialProvider::resolve(lookup(&[
            ("AWS_ACCESS_KEY_ID", "AKID"),
            ("AWS_SECRET_ACCESS_KEY", ""),
        ]))
        .unwrap_err();
        assert_eq!(err, AuthError::MissingCredentials("AWS_SECRET_ACCESS_KEY"));
    }
}
