use std::time::Duration;

use redis::{Commands, FromRedisValue, ToRedisArgs};
use url::Url;

use crate::spec::{RedisError, SpecRedisConfig};

////////////////////////////////////////////////////////////////////////////////
// #region Url

/// Build a `redis://[:pwd@]host/db` url with the password percent-encoded.
pub fn derive_redis_url(config: &SpecRedisConfig) -> Result<String, RedisError> {
    let host = config.host.trim();
    if host.is_empty() {
        return Err(RedisError::InvalidConfig("host is empty".to_string()));
    }
    if config.db < 0 {
        return Err(RedisError::InvalidConfig(format!(
            "db must be >= 0, got {}",
            config.db
        )));
    }

    let mut url = Url::parse(&format!("redis://{host}/{}", config.db))
        .map_err(|e| RedisError::InvalidConfig(format!("host `{host}`: {e}")))?;
    if !config.pwd.is_empty() {
        url.set_password(Some(&config.pwd))
            .map_err(|_| RedisError::InvalidConfig(format!("host `{host}` takes no password")))?;
    }
    Ok(url.to_string())
}

// #endregion
////////////////////////////////////////////////////////////////////////////////
// #region Client

/// Single-connection redis helper with a default expiration.
pub struct RedisUtils {
    config: SpecRedisConfig,
    client: redis::Client,
    conn: Option<redis::Connection>,
}

impl RedisUtils {
    /// Open a connection and verify it with `PING`.
    pub fn connect(config: SpecRedisConfig) -> Result<Self, RedisError> {
        let url = derive_redis_url(&config)?;
        let client = redis::Client::open(url.as_str())?;
        let mut conn = client.get_connection()?;
        let pong: String = redis::cmd("PING").query(&mut conn)?;

        tracing::info!(host = %config.host, db = config.db, reply = %pong, "Redis connected");
        Ok(Self {
            config,
            client,
            conn: Some(conn),
        })
    }

    pub fn config(&self) -> &SpecRedisConfig {
        &self.config
    }

    pub fn client(&self) -> &redis::Client {
        &self.client
    }

    pub fn expiration(&self) -> Duration {
        self.config.expiration()
    }

    pub fn is_closed(&self) -> bool {
        self.conn.is_none()
    }

    /// Live connection, or `RedisError::Closed` after `close`.
    pub fn connection(&mut self) -> Result<&mut redis::Connection, RedisError> {
        self.conn.as_mut().ok_or(RedisError::Closed)
    }

    /// Store `value` under `key` with the default expiration.
    pub fn set_ex<K: ToRedisArgs, V: ToRedisArgs>(
        &mut self,
        key: K,
        value: V,
    ) -> Result<(), RedisError> {
        let n_seconds = self.config.expire_time;
        let conn = self.connection()?;
        if n_seconds == 0 {
            conn.set::<_, _, ()>(key, value)?;
        } else {
            conn.set_ex::<_, _, ()>(key, value, n_seconds)?;
        }
        Ok(())
    }

    pub fn get<K: ToRedisArgs, RV: FromRedisValue>(&mut self, key: K) -> Result<RV, RedisError> {
        Ok(self.connection()?.get(key)?)
    }

    /// Number of keys removed.
    pub fn del<K: ToRedisArgs>(&mut self, key: K) -> Result<usize, RedisError> {
        Ok(self.connection()?.del(key)?)
    }

    /// Drop the connection. Returns `false` when it was already closed.
    pub fn close(&mut self) -> bool {
        match self.conn.take() {
            Some(_) => {
                tracing::debug!(host = %self.config.host, "Redis connection closed");
                true
            }
            None => false,
        }
    }
}

// #endregion
////////////////////////////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_without_password() {
        let config = SpecRedisConfig::default();
        assert_eq!(derive_redis_url(&config).unwrap(), "redis://127.0.0.1:6379/0");
    }

    #[test]
    fn url_with_escaped_password_and_db() {
        let config = SpecRedisConfig {
            host: "cache.local:6380".to_string(),
            pwd: "p@ss".to_string(),
            db: 3,
            expire_time: 60,
        };
        assert_eq!(
            derive_redis_url(&config).unwrap(),
            "redis://:p%40ss@cache.local:6380/3"
        );
    }

    #[test]
    fn url_rejects_bad_config() {
        let config = SpecRedisConfig {
            host: "  ".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            derive_redis_url(&config),
            Err(RedisError::InvalidConfig(_))
        ));

        let config = SpecRedisConfig {
            db: -1,
            ..Default::default()
        };
        assert!(derive_redis_url(&config).is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: SpecRedisConfig =
            serde_json::from_str(r#"{"pwd": "secret", "expire_time": 30}"#).unwrap();
        assert_eq!(config.host, "127.0.0.1:6379");
        assert_eq!(config.db, 0);
        assert_eq!(config.expiration(), Duration::from_secs(30));
    }

    #[test]
    fn connect_to_unreachable_host_fails() {
        let config = SpecRedisConfig {
            host: "127.0.0.1:1".to_string(),
            ..Default::default()
        };
        assert!(matches!(
            RedisUtils::connect(config),
            Err(RedisError::Redis(_))
        ));
    }
}
