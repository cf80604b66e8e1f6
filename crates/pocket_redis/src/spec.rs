use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

pub const C_REDIS_HOST_DEFAULT: &str = "127.0.0.1:6379";

/// Connection settings, loadable from a service config file.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SpecRedisConfig {
    /// `host:port` address.
    pub host: String,
    /// Password, empty for none.
    pub pwd: String,
    pub db: i64,
    /// Default key expiration in seconds. Zero keeps keys forever.
    pub expire_time: u64,
}

impl Default for SpecRedisConfig {
    fn default() -> Self {
        Self {
            host: C_REDIS_HOST_DEFAULT.to_string(),
            pwd: String::new(),
            db: 0,
            expire_time: 0,
        }
    }
}

impl SpecRedisConfig {
    pub fn expiration(&self) -> Duration {
        Duration::from_secs(self.expire_time)
    }
}

#[derive(Debug, Error)]
pub enum RedisError {
    #[error("Invalid redis config: {0}")]
    InvalidConfig(String),
    #[error("Redis connection already closed")]
    Closed,
    #[error(transparent)]
    Redis(#[from] redis::RedisError),
}
