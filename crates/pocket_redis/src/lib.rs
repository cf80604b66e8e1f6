//! `pocket_redis`:
//! Thin synchronous redis wrapper with a configured default expiration.

pub mod client;
pub mod spec;

pub use client::{RedisUtils, derive_redis_url};
pub use spec::{C_REDIS_HOST_DEFAULT, RedisError, SpecRedisConfig};
