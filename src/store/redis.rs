//! Redis implementation of the store interface
//!
//! One [`ConnectionManager`] handle is shared by every component; the
//! manager multiplexes and reconnects internally, so clones are cheap and
//! every tracker operation borrows a clone for the duration of one command.

use crate::config::{parse_address, StoreConfig};
use crate::store::{KeyValueStore, StateError, StateResult};
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::time::Duration;
use tracing::{debug, info};

/// Redis-backed key-value store
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RedisStore")
            .field("connection", &"ConnectionManager")
            .finish()
    }
}

impl RedisStore {
    /// Connects to the Redis server named by the configuration
    ///
    /// Performs a PING once the connection is established, so a bad
    /// address or password is reported at initialization rather than on
    /// the first tracker operation.
    ///
    /// # Arguments
    ///
    /// * `config` - Store address, credentials, and database selector
    ///
    /// # Returns
    ///
    /// * `Ok(RedisStore)` - Connected and responding store handle
    /// * `Err(ShioriError)` - Bad address, or the server is unreachable
    pub async fn connect(config: &StoreConfig) -> crate::Result<Self> {
        let (host, port) = parse_address(&config.address)?;
        info!("Connecting to Redis at {}:{} (db {})", host, port, config.database);

        let url = connection_url(&host, port, config);
        let client = redis::Client::open(url.as_str()).map_err(StateError::from)?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(StateError::from)?;

        let store = Self { conn };
        store.ping().await?;
        info!("Redis connection established");
        Ok(store)
    }
}

/// Builds the `redis://` connection URL for the configured server
///
/// The password, when present, rides in the URL userinfo; the logical
/// database selector is the path component.
fn connection_url(host: &str, port: u16, config: &StoreConfig) -> String {
    match &config.password {
        Some(password) => format!(
            "redis://:{}@{}:{}/{}",
            password, host, port, config.database
        ),
        None => format!("redis://{}:{}/{}", host, port, config.database),
    }
}

#[async_trait]
impl KeyValueStore for RedisStore {
    async fn ping(&self) -> StateResult<()> {
        let mut conn = self.conn.clone();
        redis::cmd("PING").query_async::<()>(&mut conn).await?;
        Ok(())
    }

    async fn incr(&self, key: &str) -> StateResult<u64> {
        debug!("Store INCR: {}", key);
        let mut conn = self.conn.clone();
        let count: u64 = conn.incr(key, 1i64).await?;
        Ok(count)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StateResult<()> {
        debug!("Store PEXPIRE: {} ({:?})", key, ttl);
        let mut conn = self.conn.clone();
        // PEXPIRE takes milliseconds as i64; clamp rather than wrap.
        let ttl_ms = i64::try_from(ttl.as_millis()).unwrap_or(i64::MAX);
        let _: bool = conn.pexpire(key, ttl_ms).await?;
        Ok(())
    }

    async fn get(&self, key: &str) -> StateResult<Option<String>> {
        debug!("Store GET: {}", key);
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set(&self, key: &str, value: &str) -> StateResult<()> {
        debug!("Store SET: {}", key);
        let mut conn = self.conn.clone();
        let _: () = conn.set(key, value).await?;
        Ok(())
    }

    async fn sadd(&self, key: &str, member: &[u8]) -> StateResult<()> {
        debug!("Store SADD: {}", key);
        let mut conn = self.conn.clone();
        let _: i64 = conn.sadd(key, member).await?;
        Ok(())
    }

    async fn spop(&self, key: &str) -> StateResult<Option<Vec<u8>>> {
        debug!("Store SPOP: {}", key);
        let mut conn = self.conn.clone();
        let member: Option<Vec<u8>> = conn.spop(key).await?;
        Ok(member)
    }

    async fn scard(&self, key: &str) -> StateResult<u64> {
        debug!("Store SCARD: {}", key);
        let mut conn = self.conn.clone();
        let count: u64 = conn.scard(key).await?;
        Ok(count)
    }

    async fn keys(&self, pattern: &str) -> StateResult<Vec<String>> {
        debug!("Store KEYS: {}", pattern);
        let mut conn = self.conn.clone();
        let keys: Vec<String> = conn.keys(pattern).await?;
        Ok(keys)
    }

    async fn del(&self, keys: &[String]) -> StateResult<()> {
        if keys.is_empty() {
            return Ok(());
        }
        debug!("Store DEL: {} keys", keys.len());
        let mut conn = self.conn.clone();
        let _: i64 = conn.del(keys).await?;
        Ok(())
    }
}
