// Error handling module
// Defines the credential error taxonomy and process exit mapping

use thiserror::Error;

/// Errors that can occur while resolving or refreshing a credential
#[derive(Error, Debug)]
pub enum AuthError {
    /// No complete credential record exists under this name. Not retryable
    /// without re-running the authorization flow.
    #[error("not authorized: no usable credential record under '{0}'; run the authorize command first")]
    NotAuthorized(String),

    /// A record exists but cannot be parsed. Distinct from NotAuthorized:
    /// this indicates store corruption and needs operator attention.
    #[error("stored record '{name}' is corrupt")]
    StoreCorrupt {
        name: String,
        #[source]
        source: serde_json::Error,
    },

    /// The authorization server rejected the refresh grant
    #[error("token refresh rejected: {status} - {message}")]
    RefreshRejected { status: u16, message: String },

    /// The refresh request could not complete (network failure, timeout,
    /// malformed response body)
    #[error("token refresh request failed: {0}")]
    RefreshTransport(#[from] reqwest::Error),

    /// Secret store backend failure
    #[error("secret store error: {0}")]
    Store(String),

    /// Internal error
    #[error("internal error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl AuthError {
    /// True for outcomes that mean "no token available" rather than a
    /// store or internal failure
    pub fn is_absent(&self) -> bool {
        matches!(
            self,
            AuthError::NotAuthorized(_)
                | AuthError::RefreshRejected { .. }
                | AuthError::RefreshTransport(_)
        )
    }

    /// Exit status for the CLI: 1 for "unauthorized/unavailable", 2 for
    /// store corruption and internal failures
    pub fn exit_code(&self) -> u8 {
        if self.is_absent() {
            1
        } else {
            2
        }
    }
}

/// Result type alias for credential operations
#[allow(dead_code)]
pub type Result<T> = std::result::Result<T, AuthError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AuthError::NotAuthorized("default".to_string());
        assert!(err.to_string().contains("'default'"));

        let err = AuthError::RefreshRejected {
            status: 400,
            message: "invalid_grant".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "token refresh rejected: 400 - invalid_grant"
        );

        let err = AuthError::Store("keyring locked".to_string());
        assert_eq!(err.to_string(), "secret store error: keyring locked");
    }

    #[test]
    fn test_absent_classification() {
        assert!(AuthError::NotAuthorized("x".to_string()).is_absent());
        assert!(AuthError::RefreshRejected {
            status: 400,
            message: "invalid_grant".to_string(),
        }
        .is_absent());

        let corrupt = AuthError::StoreCorrupt {
            name: "x".to_string(),
            source: serde_json::from_str::<serde_json::Value>("{").unwrap_err(),
        };
        assert!(!corrupt.is_absent());
        assert!(!AuthError::Store("backend".to_string()).is_absent());
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(AuthError::NotAuthorized("x".to_string()).exit_code(), 1);
        assert_eq!(AuthError::Store("backend".to_string()).exit_code(), 2);
    }
}
