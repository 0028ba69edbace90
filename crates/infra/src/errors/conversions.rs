//! Conversions from external infrastructure errors into domain errors.

use profilelink_common::cache::StoreError;
use profilelink_domain::ProfileLinkError;
use redis::RedisError;
use reqwest::Error as HttpError;

/// Error newtype that keeps conversions on the infrastructure side and can be
/// converted back into the domain error.
#[derive(Debug)]
pub struct InfraError(pub ProfileLinkError);

impl From<InfraError> for ProfileLinkError {
    fn from(value: InfraError) -> Self {
        value.0
    }
}

impl From<ProfileLinkError> for InfraError {
    fn from(value: ProfileLinkError) -> Self {
        InfraError(value)
    }
}

/// Extension trait to make the conversion logic explicit in tests and within
/// this module.
trait IntoProfileLinkError {
    fn into_profilelink(self) -> ProfileLinkError;
}

/* -------------------------------------------------------------------------- */
/* reqwest::Error → ProfileLinkError */
/* -------------------------------------------------------------------------- */

impl IntoProfileLinkError for HttpError {
    fn into_profilelink(self) -> ProfileLinkError {
        if self.is_timeout() {
            return ProfileLinkError::FetchFailed("HTTP request timed out".into());
        }

        if self.is_connect() {
            return ProfileLinkError::FetchFailed("HTTP connection failure".into());
        }

        if let Some(status) = self.status() {
            let code = status.as_u16();
            return ProfileLinkError::FetchFailed(format!(
                "HTTP {} {}",
                code,
                status.canonical_reason().unwrap_or("unknown status")
            ));
        }

        if self.is_decode() {
            return ProfileLinkError::InvalidResponse(format!("undecodable body: {self}"));
        }

        if self.is_builder() {
            return ProfileLinkError::InvalidInput(format!("invalid request: {self}"));
        }

        ProfileLinkError::FetchFailed(self.to_string())
    }
}

impl From<HttpError> for InfraError {
    fn from(value: HttpError) -> Self {
        InfraError(value.into_profilelink())
    }
}

/* -------------------------------------------------------------------------- */
/* redis::RedisError → ProfileLinkError */
/* -------------------------------------------------------------------------- */

impl IntoProfileLinkError for RedisError {
    fn into_profilelink(self) -> ProfileLinkError {
        ProfileLinkError::StoreUnavailable(redis_reason(&self))
    }
}

impl From<RedisError> for InfraError {
    fn from(value: RedisError) -> Self {
        InfraError(value.into_profilelink())
    }
}

/// Store-level view of a Redis failure, used by the `TimedStore` backend.
pub(crate) fn redis_store_error(err: &RedisError) -> StoreError {
    StoreError::Unavailable(redis_reason(err))
}

fn redis_reason(err: &RedisError) -> String {
    if err.is_timeout() {
        "redis timed out".into()
    } else if err.is_connection_refusal() || err.is_connection_dropped() {
        format!("redis connection failure: {err}")
    } else {
        format!("redis error: {err}")
    }
}

/* -------------------------------------------------------------------------- */
/* Tests */
/* -------------------------------------------------------------------------- */
