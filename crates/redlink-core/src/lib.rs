use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Unified error type for the Redlink crates.
///
/// [`Empty`](RedlinkError::Empty) is the distinguished "key or field does not
/// exist" outcome, so callers can tell absence apart from transport or store
/// failures without matching on message strings.
#[derive(Debug, Error)]
pub enum RedlinkError {
    #[error("no client registered under '{0}'")]
    NotRegistered(String),
    #[error("empty")]
    Empty,
    #[error("client is closed")]
    Closed,
    #[error("config error: {0}")]
    Config(String),
    #[error("store error: {0}")]
    Store(String),
}

// ---------------------------------------------------------------------------
// KvHandle trait
// ---------------------------------------------------------------------------

/// A single open connection to a remote key-value store.
///
/// Implementations own the underlying connection and translate the store's
/// native absence signal into [`RedlinkError::Empty`] for single-value reads;
/// batch reads report absence per position instead. Closing is one-directional
/// and idempotent: commands issued after [`close`](KvHandle::close) fail with
/// [`RedlinkError::Closed`].
#[async_trait]
pub trait KvHandle: Send + Sync + std::fmt::Debug {
    /// Set `key` to `value`. An `expire_secs` of zero means no expiration.
    async fn set(&self, key: &str, value: &str, expire_secs: u64) -> Result<(), RedlinkError>;

    /// Get the value of `key`.
    async fn get(&self, key: &str) -> Result<String, RedlinkError>;

    /// Get several keys in one round trip; missing keys come back as `None`.
    async fn mget(&self, keys: &[&str]) -> Result<Vec<Option<String>>, RedlinkError>;

    /// Delete `key`, returning the number of keys removed.
    async fn del(&self, key: &str) -> Result<i64, RedlinkError>;

    /// Increment the integer value of `key` by one and return the new value.
    /// A missing key counts from zero.
    async fn incr(&self, key: &str) -> Result<i64, RedlinkError>;

    /// Decrement the integer value of `key` by one and return the new value.
    async fn decr(&self, key: &str) -> Result<i64, RedlinkError>;

    /// Set `key` to `value` only if the key does not exist yet. Returns
    /// whether the key was set. An `expire_secs` of zero means no expiration.
    async fn set_nx(
        &self,
        key: &str,
        value: &str,
        expire_secs: u64,
    ) -> Result<bool, RedlinkError>;

    /// Set `field` in the hash at `key`. Returns true when the field was
    /// newly created, false when an existing field was updated.
    async fn hset(&self, key: &str, field: &str, value: &str) -> Result<bool, RedlinkError>;

    /// Get `field` from the hash at `key`.
    async fn hget(&self, key: &str, field: &str) -> Result<String, RedlinkError>;

    /// Delete `field` from the hash at `key`, returning the number of fields
    /// removed.
    async fn hdel(&self, key: &str, field: &str) -> Result<i64, RedlinkError>;

    /// Get several hash fields in one round trip; missing fields come back as
    /// `None`.
    async fn hmget(
        &self,
        key: &str,
        fields: &[&str],
    ) -> Result<Vec<Option<String>>, RedlinkError>;

    /// Close the underlying connection. Idempotent.
    async fn close(&self);
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Name-to-handle mapping held for the process lifetime.
///
/// An explicit value rather than a process-wide global: construct it during
/// startup, share it by reference (or inside an `Arc`), and call
/// [`close_all`](Registry::close_all) at shutdown. The mapping sits behind a
/// reader-writer lock, so lookups run concurrently while installs and
/// close-all serialize against all other access.
pub struct Registry {
    handles: RwLock<HashMap<String, Arc<dyn KvHandle>>>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            handles: RwLock::new(HashMap::new()),
        }
    }

    /// Install `handle` under `name`.
    ///
    /// A handle previously installed under the same name is closed before the
    /// write lock is released, so at most one live handle exists per name and
    /// no connection leaks across a re-registration.
    pub async fn install(&self, name: impl Into<String>, handle: Arc<dyn KvHandle>) {
        let mut handles = self.handles.write().await;
        if let Some(old) = handles.insert(name.into(), handle) {
            old.close().await;
        }
    }

    /// Look up the handle registered under `name`.
    pub async fn lookup(&self, name: &str) -> Result<Arc<dyn KvHandle>, RedlinkError> {
        self.handles
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| RedlinkError::NotRegistered(name.to_string()))
    }

    /// Close every registered handle. A no-op on an empty registry.
    ///
    /// Entries stay in the mapping; callers still holding a handle see
    /// [`RedlinkError::Closed`] from further commands.
    pub async fn close_all(&self) {
        let handles = self.handles.read().await;
        for handle in handles.values() {
            handle.close().await;
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

// ---------------------------------------------------------------------------
// Command forwarders
// ---------------------------------------------------------------------------

// One method per remote operation: resolve the handle registered under `name`
// and forward a single command through it. Lookup failures propagate
// unchanged.
impl Registry {
    /// Set `key` to `value` on the client registered under `name`.
    pub async fn set(
        &self,
        name: &str,
        key: &str,
        value: &str,
        expire_secs: u64,
    ) -> Result<(), RedlinkError> {
        self.lookup(name).await?.set(key, value, expire_secs).await
    }

    /// Get the value of `key` from the client registered under `name`.
    pub async fn get(&self, name: &str, key: &str) -> Result<String, RedlinkError> {
        self.lookup(name).await?.get(key).await
    }

    /// Get several keys at once; missing keys come back as `None`.
    pub async fn mget(
        &self,
        name: &str,
        keys: &[&str],
    ) -> Result<Vec<Option<String>>, RedlinkError> {
        self.lookup(name).await?.mget(keys).await
    }

    /// Delete `key`, returning the number of keys removed.
    pub async fn del(&self, name: &str, key: &str) -> Result<i64, RedlinkError> {
        self.lookup(name).await?.del(key).await
    }

    /// Increment the integer value of `key` by one and return the new value.
    pub async fn incr(&self, name: &str, key: &str) -> Result<i64, RedlinkError> {
        self.lookup(name).await?.incr(key).await
    }

    /// Decrement the integer value of `key` by one and return the new value.
    pub async fn decr(&self, name: &str, key: &str) -> Result<i64, RedlinkError> {
        self.lookup(name).await?.decr(key).await
    }

    /// Set `key` only if it does not exist yet; returns whether it was set.
    pub async fn set_nx(
        &self,
        name: &str,
        key: &str,
        value: &str,
        expire_secs: u64,
    ) -> Result<bool, RedlinkError> {
        self.lookup(name).await?.set_nx(key, value, expire_secs).await
    }

    /// Set `field` in the hash at `key`; returns whether the field is new.
    pub async fn hset(
        &self,
        name: &str,
        key: &str,
        field: &str,
        value: &str,
    ) -> Result<bool, RedlinkError> {
        self.lookup(name).await?.hset(key, field, value).await
    }

    /// Get `field` from the hash at `key`.
    pub async fn hget(&self, name: &str, key: &str, field: &str) -> Result<String, RedlinkError> {
        self.lookup(name).await?.hget(key, field).await
    }

    /// Delete `field` from the hash at `key`, returning the number removed.
    pub async fn hdel(&self, name: &str, key: &str, field: &str) -> Result<i64, RedlinkError> {
        self.lookup(name).await?.hdel(key, field).await
    }

    /// Get several hash fields at once; missing fields come back as `None`.
    pub async fn hmget(
        &self,
        name: &str,
        key: &str,
        fields: &[&str],
    ) -> Result<Vec<Option<String>>, RedlinkError> {
        self.lookup(name).await?.hmget(key, fields).await
    }
}
