//! Redis Backend
//!
//! [`CacheBackend`] over a Redis connection manager. A failed connection at
//! startup leaves the backend disconnected: every operation then errors and
//! the cache-aside layer serves straight from the database.

use async_trait::async_trait;
use redis::aio::ConnectionManager;
use tracing::{error, info, warn};

use crate::cache::CacheBackend;
use crate::error::{CacheError, CacheResult};

// == Redis Backend ==
#[derive(Clone)]
pub struct RedisBackend {
    conn: Option<ConnectionManager>,
}

impl RedisBackend {
    /// Connects to `url`. Never fails; an unreachable server is logged and
    /// yields a disconnected backend.
    pub async fn connect(url: &str) -> Self {
        match Self::open(url).await {
            Ok(conn) => {
                info!("Connected to Redis");
                Self { conn: Some(conn) }
            }
            Err(e) => {
                error!(error = %e, "Failed to connect to Redis");
                warn!("Running without Redis cache");
                Self::disconnected()
            }
        }
    }

    /// A backend with no connection. Every operation returns `Unavailable`.
    pub fn disconnected() -> Self {
        Self { conn: None }
    }

    async fn open(url: &str) -> CacheResult<ConnectionManager> {
        let client = redis::Client::open(url)?;
        Ok(client.get_connection_manager().await?)
    }

    fn connection(&self) -> CacheResult<ConnectionManager> {
        self.conn
            .clone()
            .ok_or_else(|| CacheError::Unavailable("not connected to Redis".to_string()))
    }
}

#[async_trait]
impl CacheBackend for RedisBackend {
    fn name(&self) -> &'static str {
        "redis"
    }

    async fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let mut conn = self.connection()?;
        let payload: Option<String> = redis::cmd("GET").arg(key).query_async(&mut conn).await?;
        Ok(payload)
    }

    async fn set_ex(&self, key: &str, payload: String, ttl_secs: u64) -> CacheResult<()> {
        let mut conn = self.connection()?;
        let _: () = redis::cmd("SETEX")
            .arg(key)
            .arg(ttl_secs)
            .arg(payload)
            .query_async(&mut conn)
            .await?;
        Ok(())
    }

    async fn keys(&self, pattern: &str) -> CacheResult<Vec<String>> {
        let mut conn = self.connection()?;
        let keys: Vec<String> = redis::cmd("KEYS").arg(pattern).query_async(&mut conn).await?;
        Ok(keys)
    }

    async fn del(&self, keys: &[String]) -> CacheResult<usize> {
        // DEL with no arguments is a Redis error
        if keys.is_empty() {
            return Ok(0);
        }
        let mut conn = self.connection()?;
        let removed: usize = redis::cmd("DEL").arg(keys).query_async(&mut conn).await?;
        Ok(removed)
    }

    async fn db_size(&self) -> CacheResult<usize> {
        let mut conn = self.connection()?;
        let size: usize = redis::cmd("DBSIZE").query_async(&mut conn).await?;
        Ok(size)
    }

    async fn info(&self) -> CacheResult<String> {
        let mut conn = self.connection()?;
        let info: String = redis::cmd("INFO").arg("stats").query_async(&mut conn).await?;
        Ok(info)
    }

    async fn is_connected(&self) -> bool {
        let Ok(mut conn) = self.connection() else {
            return false;
        };
        let pong: Result<String, _> = redis::cmd("PING").query_async(&mut conn).await;
        pong.is_ok()
    }
}
