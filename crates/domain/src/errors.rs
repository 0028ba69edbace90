//! Error types used throughout the application

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::impl_domain_label_conversions;

/// Classification of a token endpoint rejection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthErrorKind {
    InvalidCredentials,
    AccessDenied,
    RateLimited,
    UnknownError,
}

impl_domain_label_conversions!(AuthErrorKind {
    InvalidCredentials => "invalid_credentials",
    AccessDenied => "access_denied",
    RateLimited => "rate_limited",
    UnknownError => "unknown_error",
});

impl AuthErrorKind {
    /// Deterministic mapping from the remote HTTP status.
    #[must_use]
    pub fn from_status(status: u16) -> Self {
        match status {
            401 => Self::InvalidCredentials,
            403 => Self::AccessDenied,
            429 => Self::RateLimited,
            _ => Self::UnknownError,
        }
    }
}

/// Main error type for ProfileLink
///
/// `Display` is safe to show to end users: upstream response bodies are kept
/// out of it and only reachable through [`ProfileLinkError::diagnostic`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "message")]
pub enum ProfileLinkError {
    /// The `state` was never issued, already consumed or expired.
    #[error("Invalid or expired authorization state")]
    InvalidState,

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// The provider rejected a token exchange.
    #[error("Authentication failed: {kind}")]
    Auth {
        kind: AuthErrorKind,
        status: Option<u16>,
        #[serde(skip)]
        detail: Option<String>,
    },

    #[error("Store unavailable: {0}")]
    StoreUnavailable(String),

    /// The source answered but nothing usable could be extracted.
    #[error("Profile contains no usable data")]
    EmptyProfile,

    #[error("Profile fetch failed: {0}")]
    FetchFailed(String),

    #[error("{operation} timed out after {after_ms}ms")]
    Timeout { operation: String, after_ms: u64 },

    #[error("Operation cancelled")]
    Cancelled,

    /// A refresh token was presented a second time.
    #[error("Refresh token already used")]
    TokenConsumed,

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ProfileLinkError {
    /// Build an `Auth` error from a remote status and its raw body.
    pub fn auth(status: u16, detail: impl Into<String>) -> Self {
        let detail = detail.into();
        Self::Auth {
            kind: AuthErrorKind::from_status(status),
            status: Some(status),
            detail: (!detail.is_empty()).then_some(detail),
        }
    }

    /// Build a `Timeout` error for `operation`.
    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout {
            operation: operation.into(),
            after_ms: u64::try_from(after.as_millis()).unwrap_or(u64::MAX),
        }
    }

    /// Upstream detail for logs. Never render this to end users.
    #[must_use]
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            Self::Auth { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    /// Whether the error ends the current authorization attempt for good.
    ///
    /// Retrying with the same `state` or refresh token can never succeed.
    #[must_use]
    pub fn is_terminal_for_auth(&self) -> bool {
        matches!(
            self,
            Self::InvalidState | Self::Auth { .. } | Self::TokenConsumed | Self::InvalidResponse(_)
        )
    }
}

/// Result type alias for ProfileLink operations
pub type Result<T> = std::result::Result<T, ProfileLinkError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_kind_from_status() {
        assert_eq!(AuthErrorKind::from_status(401), AuthErrorKind::InvalidCredentials);
        assert_eq!(AuthErrorKind::from_status(403), AuthErrorKind::AccessDenied);
        assert_eq!(AuthErrorKind::from_status(429), AuthErrorKind::RateLimited);
        assert_eq!(AuthErrorKind::from_status(400), AuthErrorKind::UnknownError);
        assert_eq!(AuthErrorKind::from_status(500), AuthErrorKind::UnknownError);
    }

    #[test]
    fn test_auth_kind_labels() {
        assert_eq!("RATE_LIMITED".parse::<AuthErrorKind>(), Ok(AuthErrorKind::RateLimited));
        assert_eq!(AuthErrorKind::AccessDenied.to_string(), "access_denied");
        assert!("teapot".parse::<AuthErrorKind>().is_err());
    }

    #[test]
    fn test_auth_display_hides_detail() {
        let err = ProfileLinkError::auth(401, r#"{"error":"invalid_client","secret":"x"}"#);

        assert_eq!(err.to_string(), "Authentication failed: invalid_credentials");
        assert!(err.diagnostic().is_some_and(|d| d.contains("invalid_client")));
    }

    #[test]
    fn test_auth_empty_detail_is_none() {
        let err = ProfileLinkError::auth(503, "");
        assert_eq!(err.diagnostic(), None);
        assert!(matches!(
            err,
            ProfileLinkError::Auth { kind: AuthErrorKind::UnknownError, status: Some(503), .. }
        ));
    }

    #[test]
    fn test_serialization_skips_detail() {
        let err = ProfileLinkError::auth(403, "upstream body");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(json["type"], "Auth");
        assert_eq!(json["message"]["kind"], "access_denied");
        assert_eq!(json["message"]["status"], 403);
        assert!(json["message"].get("detail").is_none());

        let back: ProfileLinkError = serde_json::from_value(json).unwrap();
        assert_eq!(back.diagnostic(), None);
    }

    #[test]
    fn test_unit_variant_serialization() {
        let json = serde_json::to_value(ProfileLinkError::InvalidState).unwrap();
        assert_eq!(json, serde_json::json!({"type": "InvalidState"}));
    }

    #[test]
    fn test_timeout_display() {
        let err = ProfileLinkError::timeout("token exchange", Duration::from_secs(30));
        assert_eq!(err.to_string(), "token exchange timed out after 30000ms");
    }

    #[test]
    fn test_terminal_for_auth() {
        assert!(ProfileLinkError::InvalidState.is_terminal_for_auth());
        assert!(ProfileLinkError::auth(429, "").is_terminal_for_auth());
        assert!(!ProfileLinkError::StoreUnavailable("down".into()).is_terminal_for_auth());
    }
}
