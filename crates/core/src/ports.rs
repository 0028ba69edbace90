//! Port interfaces for profile retrieval
//!
//! These traits define the boundaries between core business logic
//! and infrastructure implementations.

use async_trait::async_trait;
use profilelink_domain::{Credential, RawProfile, Result};

/// Trait for fetching raw profile payloads from the remote source
#[async_trait]
pub trait ProfileSource: Send + Sync {
    /// Fetch the raw payload for the profile identified by `key`.
    ///
    /// # Errors
    /// `FetchFailed` when the source is unreachable or answers with an
    /// unexpected shape, `Timeout` when the request exceeds its bound.
    async fn fetch(&self, key: &str, credential: &Credential) -> Result<RawProfile>;

    /// Check whether the source accepts `credential`.
    async fn validate_credential(&self, credential: &Credential) -> Result<bool>;
}
