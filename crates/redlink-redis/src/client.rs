use std::sync::Arc;

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use tokio::sync::RwLock;

use redlink_core::{KvHandle, RedlinkError, Registry};

use crate::config::RedisConfig;

/// A single open connection to one Redis instance.
///
/// Commands run over a multiplexed connection cloned out per call; pooling and
/// per-connection concurrency are the `redis` crate's business. Closing takes
/// the connection out of its slot, so close is idempotent and later commands
/// fail with [`RedlinkError::Closed`].
#[derive(Debug)]
pub struct RedisHandle {
    config: RedisConfig,
    conn: RwLock<Option<MultiplexedConnection>>,
}

impl RedisHandle {
    /// Connect to the instance described by `config` and verify it with PING.
    ///
    /// No handle is returned when the connection or the liveness check fails.
    pub async fn connect(config: RedisConfig) -> Result<Self, RedlinkError> {
        let client = redis::Client::open(config.url().as_str())
            .map_err(|e| RedlinkError::Config(format!("invalid Redis address: {e}")))?;
        let mut conn = client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| RedlinkError::Store(format!("failed to connect to Redis: {e}")))?;
        let _: String = redis::cmd("PING")
            .query_async(&mut conn)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis PING error: {e}")))?;
        Ok(Self {
            config,
            conn: RwLock::new(Some(conn)),
        })
    }

    /// The configuration this handle was created from.
    pub fn config(&self) -> &RedisConfig {
        &self.config
    }

    async fn connection(&self) -> Result<MultiplexedConnection, RedlinkError> {
        self.conn.read().await.clone().ok_or(RedlinkError::Closed)
    }
}

#[async_trait]
impl KvHandle for RedisHandle {
    async fn set(&self, key: &str, value: &str, expire_secs: u64) -> Result<(), RedlinkError> {
        let mut con = self.connection().await?;
        if expire_secs > 0 {
            con.set_ex::<_, _, ()>(key, value, expire_secs)
                .await
                .map_err(|e| RedlinkError::Store(format!("Redis SETEX error: {e}")))
        } else {
            con.set::<_, _, ()>(key, value)
                .await
                .map_err(|e| RedlinkError::Store(format!("Redis SET error: {e}")))
        }
    }

    async fn get(&self, key: &str) -> Result<String, RedlinkError> {
        let mut con = self.connection().await?;
        let raw: Option<String> = con
            .get(key)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis GET error: {e}")))?;
        raw.ok_or(RedlinkError::Empty)
    }

    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>, RedlinkError> {
        // MGET with no keys is a protocol error; nothing to ask for.
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut con = self.connection().await?;
        redis::cmd("MGET")
            .arg(keys)
            .query_async(&mut con)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis MGET error: {e}")))
    }

    async fn del(&self, key: &str) -> Result<i64, RedlinkError> {
        let mut con = self.connection().await?;
        con.del(key)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis DEL error: {e}")))
    }

    async fn incr(&self, key: &str) -> Result<i64, RedlinkError> {
        let mut con = self.connection().await?;
        con.incr(key, 1)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis INCR error: {e}")))
    }

    async fn decr(&self, key: &str) -> Result<i64, RedlinkError> {
        let mut con = self.connection().await?;
        con.decr(key, 1)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis DECR error: {e}")))
    }

    async fn set_nx(
        &self,
        key: &str,
        value: &str,
        expire_secs: u64,
    ) -> Result<bool, RedlinkError> {
        let mut con = self.connection().await?;
        if expire_secs > 0 {
            // SET .. NX EX in one command so the existence check and the
            // expiry apply atomically.
            redis::cmd("SET")
                .arg(key)
                .arg(value)
                .arg("NX")
                .arg("EX")
                .arg(expire_secs)
                .query_async(&mut con)
                .await
                .map_err(|e| RedlinkError::Store(format!("Redis SET NX error: {e}")))
        } else {
            con.set_nx(key, value)
                .await
                .map_err(|e| RedlinkError::Store(format!("Redis SETNX error: {e}")))
        }
    }

    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<bool, RedlinkError> {
        let mut con = self.connection().await?;
        con.hset(key, field, value)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis HSET error: {e}")))
    }

    async fn hget(&self, key: &str, field: &str) -> Result<String, RedlinkError> {
        let mut con = self.connection().await?;
        let raw: Option<String> = con
            .hget(key, field)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis HGET error: {e}")))?;
        raw.ok_or(RedlinkError::Empty)
    }

    async fn hdel(&self, key: &str, field: &str) -> Result<i64, RedlinkError> {
        let mut con = self.connection().await?;
        con.hdel(key, field)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis HDEL error: {e}")))
    }

    async fn hmget(
        &self,
        key: &str,
        fields: &[&str],
    ) -> Result<Vec<Option<String>>, RedlinkError> {
        if fields.is_empty() {
            return Ok(Vec::new());
        }
        let mut con = self.connection().await?;
        redis::cmd("HMGET")
            .arg(key)
            .arg(fields)
            .query_async(&mut con)
            .await
            .map_err(|e| RedlinkError::Store(format!("Redis HMGET error: {e}")))
    }

    async fn close(&self) {
        drop(self.conn.write().await.take());
    }
}

/// Connect to the instance described by `config` and install the handle in
/// `registry` under `name`, closing any handle previously registered there.
///
/// On connection or liveness-check failure the registry is left untouched and
/// the error is returned.
pub async fn register(
    registry: &Registry,
    name: &str,
    config: RedisConfig,
) -> Result<(), RedlinkError> {
    let handle = RedisHandle::connect(config).await?;
    registry.install(name, Arc::new(handle)).await;
    Ok(())
}

/// Register a batch of named configurations, typically once at process start.
///
/// A failure for one name is logged and does not stop the remaining names.
pub async fn register_all<I>(registry: &Registry, configs: I)
where
    I: IntoIterator<Item = (String, RedisConfig)>,
{
    for (name, config) in configs {
        match register(registry, &name, config).await {
            Ok(()) => tracing::info!("redis registry: registered client '{name}'"),
            Err(e) => tracing::error!("redis registry: failed to register '{name}': {e}"),
        }
    }
}
