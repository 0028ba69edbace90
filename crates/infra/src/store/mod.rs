//! `TimedStore` backends and backend selection.

pub mod redis;

use std::sync::Arc;

use profilelink_common::cache::{MemoryStore, TimedStore};
use profilelink_domain::{ProfileLinkError, Result, StoreBackend, StoreSettings};
use tracing::info;

pub use self::redis::RedisStore;

/// Open the backend selected by `settings`.
///
/// # Errors
/// `Config` when the Redis backend is selected without a usable URL.
pub fn open_store(settings: &StoreSettings) -> Result<Arc<dyn TimedStore>> {
    match settings.backend {
        StoreBackend::Memory => {
            info!(backend = %settings.backend, "opening store");
            Ok(Arc::new(MemoryStore::new()))
        }
        StoreBackend::Redis => {
            let url = settings
                .redis_url
                .as_deref()
                .filter(|url| !url.trim().is_empty())
                .ok_or_else(|| ProfileLinkError::Config("store.redis_url is required".into()))?;
            info!(backend = %settings.backend, prefix = %settings.key_prefix, "opening store");
            Ok(Arc::new(RedisStore::new(url, settings.key_prefix.clone())?))
        }
    }
}
