//! Error taxonomy for the authentication flow
//!
//! Two of the taxonomy classes from the degradation policy never appear
//! here: malformed tokens resolve to "no claims" and corrupt persisted data
//! resolves to "no session / no proof", silently. Everything that remains is
//! either fatal at configuration time or recorded as a diagnostic while the
//! flow settles unauthenticated.

use thiserror::Error;

/// Errors surfaced by the authentication core.
///
/// The orchestrator never lets these escape its startup sequence; terminal
/// failures resolve the `ready` contract with an unauthenticated outcome and
/// the error is retained as the last diagnostic.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum AuthError {
    /// Client configuration rejected at build time. Fatal: without a valid
    /// configuration the public surface cannot be constructed.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// A callback arrived but no proof material was persisted (missing,
    /// malformed, or expired past its 10-minute window).
    #[error("no code verifier persisted for this callback")]
    MissingProof,

    /// The callback's `state` parameter did not match the persisted proof.
    #[error("state mismatch: expected {expected}, received {received}")]
    StateMismatch {
        /// State generated at sign-in and persisted with the proof.
        expected: String,
        /// State carried on the callback URL.
        received: String,
    },

    /// The token endpoint answered with a non-success status.
    #[error("code exchange failed with HTTP status {status}")]
    ExchangeFailed {
        /// HTTP status returned by the authorization server.
        status: u16,
    },

    /// Network-level failure before an HTTP status was available.
    #[error("code exchange transport failure: {0}")]
    Transport(String),

    /// The token endpoint returned 2xx but the body was not the expected
    /// token response shape.
    #[error("malformed token response: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for error.
    use super::*;

    #[test]
    fn display_includes_http_status() {
        let err = AuthError::ExchangeFailed { status: 502 };
        assert!(err.to_string().contains("502"));
    }

    #[test]
    fn display_includes_both_states_on_mismatch() {
        let err = AuthError::StateMismatch {
            expected: "abc".to_string(),
            received: "xyz".to_string(),
        };

        let rendered = err.to_string();
        assert!(rendered.contains("abc"));
        assert!(rendered.contains("xyz"));
    }
}
