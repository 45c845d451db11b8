//! # warden-cache
//!
//! Cache layer: Redis connection pooling and the single-use
//! reauthentication-proof store. A reauth proof may admit exactly one
//! action; the store is where "exactly one" is enforced.

pub mod pool;
pub mod reauth;

// Re-export commonly used types
pub use pool::{RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool};
pub use reauth::ReauthProofStore;
