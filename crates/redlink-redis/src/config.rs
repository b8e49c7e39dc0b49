use serde::{Deserialize, Serialize};

/// Connection settings for one named Redis client.
///
/// Deserializable so a host application's configuration layer can hand these
/// over as-is; this crate attaches no meaning to the name a configuration is
/// registered under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RedisConfig {
    /// Server address as `host:port`.
    pub addr: String,
    /// Optional AUTH password. Empty or absent means no authentication.
    #[serde(default)]
    pub password: Option<String>,
    /// Database index selected after connecting.
    #[serde(default)]
    pub db: i64,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:6379".to_string(),
            password: None,
            db: 0,
        }
    }
}

impl RedisConfig {
    /// Build the connection URL understood by the `redis` crate.
    pub(crate) fn url(&self) -> String {
        let auth = match &self.password {
            Some(password) if !password.is_empty() => format!(":{password}@"),
            _ => String::new(),
        };
        format!("redis://{auth}{}/{}", self.addr, self.db)
    }
}
