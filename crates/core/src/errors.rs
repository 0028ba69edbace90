//! Conversions from shared infrastructure errors into domain errors.
//!
//! Both error types live in `profilelink-common` and the target lives in
//! `profilelink-domain`, so the conversions go through a local extension
//! trait instead of `From`.

use profilelink_common::auth::{OAuthClientError, DEFAULT_TOKEN_TIMEOUT};
use profilelink_common::cache::StoreError;
use profilelink_domain::{AuthErrorKind, ProfileLinkError};

/// Extension trait making the conversion explicit at call sites.
pub(crate) trait IntoDomainError {
    fn into_domain(self) -> ProfileLinkError;
}

/* -------------------------------------------------------------------------- */
/* StoreError → ProfileLinkError */
/* -------------------------------------------------------------------------- */

impl IntoDomainError for StoreError {
    fn into_domain(self) -> ProfileLinkError {
        match self {
            StoreError::Unavailable(reason) => ProfileLinkError::StoreUnavailable(reason),
            StoreError::Closed => ProfileLinkError::StoreUnavailable("store closed".into()),
            StoreError::Serialization(reason) => {
                ProfileLinkError::Internal(format!("stored value could not be decoded: {reason}"))
            }
        }
    }
}

/* -------------------------------------------------------------------------- */
/* OAuthClientError → ProfileLinkError */
/* -------------------------------------------------------------------------- */

impl IntoDomainError for OAuthClientError {
    fn into_domain(self) -> ProfileLinkError {
        match self {
            OAuthClientError::Remote { status, body } => ProfileLinkError::auth(status, body),
            OAuthClientError::InvalidResponse(reason) => ProfileLinkError::InvalidResponse(reason),
            OAuthClientError::Timeout => {
                ProfileLinkError::timeout("token exchange", DEFAULT_TOKEN_TIMEOUT)
            }
            OAuthClientError::Transport(reason) => ProfileLinkError::Auth {
                kind: AuthErrorKind::UnknownError,
                status: None,
                detail: Some(reason),
            },
            OAuthClientError::NoRefreshToken => {
                ProfileLinkError::InvalidInput("refresh token is empty".into())
            }
            OAuthClientError::ConfigError(reason) => ProfileLinkError::Config(reason),
        }
    }
}
