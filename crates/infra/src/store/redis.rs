//! Redis-backed [`TimedStore`]
//!
//! Keys are namespaced with a configurable prefix so several deployments can
//! share one Redis database. Expiry is delegated to Redis (`PX`), and the
//! atomic operations map onto single commands:
//!
//! | Operation       | Command              |
//! |-----------------|----------------------|
//! | `put`           | `SET key value [PX]` |
//! | `put_if_absent` | `SET key value NX [PX]` |
//! | `take`          | `GETDEL key`         |
//! | `delete`        | `DEL key`            |
//! | `ping`          | `PING`               |

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use profilelink_common::cache::{StoreError, StoreHealth, StoreResult, TimedStore};
use profilelink_domain::{ProfileLinkError, Result};
use redis::aio::MultiplexedConnection;
use redis::{Client, Cmd, RedisResult};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::errors::conversions::redis_store_error;

/// Shared store over a Redis server.
///
/// The connection is opened lazily and reused; a failed command drops it so
/// the next call reconnects.
pub struct RedisStore {
    client: Client,
    connection: Mutex<Option<MultiplexedConnection>>,
    key_prefix: String,
    closed: AtomicBool,
}

impl RedisStore {
    /// Create a store for `redis_url`. No connection is made yet.
    ///
    /// # Errors
    /// `Config` when the URL cannot be parsed.
    pub fn new(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| ProfileLinkError::Config(format!("invalid redis URL: {e}")))?;

        Ok(Self {
            client,
            connection: Mutex::new(None),
            key_prefix: key_prefix.into(),
            closed: AtomicBool::new(false),
        })
    }

    fn prefixed_key(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }

    fn ensure_open(&self) -> StoreResult<()> {
        if self.closed.load(Ordering::Acquire) {
            Err(StoreError::Closed)
        } else {
            Ok(())
        }
    }

    async fn connection(&self) -> StoreResult<MultiplexedConnection> {
        let mut guard = self.connection.lock().await;
        if let Some(conn) = guard.as_ref() {
            return Ok(conn.clone());
        }

        let conn = self.client.get_multiplexed_async_connection().await.map_err(|e| {
            warn!(error = %e, "redis connection failed");
            redis_store_error(&e)
        })?;
        debug!("redis connection established");
        *guard = Some(conn.clone());
        Ok(conn)
    }

    async fn run<T: redis::FromRedisValue>(&self, cmd: Cmd) -> StoreResult<T> {
        self.ensure_open()?;
        let mut conn = self.connection().await?;
        let outcome: RedisResult<T> = cmd.query_async(&mut conn).await;
        outcome.map_err(|e| {
            if e.is_connection_dropped() || e.is_io_error() {
                // Poisoned connection; reconnect on next use.
                if let Ok(mut guard) = self.connection.try_lock() {
                    guard.take();
                }
            }
            redis_store_error(&e)
        })
    }
}

fn set_command(key: &str, value: &str, ttl: Option<Duration>, only_if_absent: bool) -> Cmd {
    let mut cmd = redis::cmd("SET");
    cmd.arg(key).arg(value);
    if only_if_absent {
        cmd.arg("NX");
    }
    if let Some(ttl) = ttl {
        // Redis rejects PX 0; an immediate expiry is one millisecond.
        let millis = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX).max(1);
        cmd.arg("PX").arg(millis);
    }
    cmd
}

#[async_trait]
impl TimedStore for RedisStore {
    async fn put(&self, key: &str, value: String, ttl: Option<Duration>) -> StoreResult<()> {
        self.run::<()>(set_command(&self.prefixed_key(key), &value, ttl, false)).await
    }

    async fn put_if_absent(
        &self,
        key: &str,
        value: String,
        ttl: Option<Duration>,
    ) -> StoreResult<bool> {
        // Nil reply when the key already exists.
        let reply: Option<String> =
            self.run(set_command(&self.prefixed_key(key), &value, ttl, true)).await?;
        Ok(reply.is_some())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut cmd = redis::cmd("GET");
        cmd.arg(self.prefixed_key(key));
        self.run(cmd).await
    }

    async fn take(&self, key: &str) -> StoreResult<Option<String>> {
        let mut cmd = redis::cmd("GETDEL");
        cmd.arg(self.prefixed_key(key));
        self.run(cmd).await
    }

    async fn delete(&self, key: &str) -> StoreResult<bool> {
        let mut cmd = redis::cmd("DEL");
        cmd.arg(self.prefixed_key(key));
        let removed: u64 = self.run(cmd).await?;
        Ok(removed > 0)
    }

    async fn ping(&self) -> StoreHealth {
        match self.run::<String>(redis::cmd("PING")).await {
            Ok(_) => StoreHealth::Healthy,
            Err(err) => StoreHealth::Unhealthy(err.to_string()),
        }
    }

    async fn close(&self) -> StoreResult<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.connection.lock().await.take();
        info!("redis store closed");
        Ok(())
    }
}
