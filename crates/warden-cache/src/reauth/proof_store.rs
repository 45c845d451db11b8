//! Reauthentication proof consumption in Redis.
//!
//! A reauthentication proof (the `jti` of a reauth-type token) admits
//! exactly one action. Consumption is a `SET NX` on the proof ID: the first
//! admission creates the marker, a replay finds it and is rejected. Markers
//! expire with the proof's own freshness window, so the keyspace stays
//! bounded.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use warden_core::Snowflake;

use crate::pool::{RedisPool, RedisResult};

/// Key prefix for consumed proofs
const REAUTH_PROOF_PREFIX: &str = "reauth_proof:";

/// Default marker TTL, matching the default proof freshness window
const DEFAULT_PROOF_TTL: u64 = 300;

/// Marker written when a proof is consumed
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConsumedProof {
    /// Actor the proof belonged to
    pub actor_id: Snowflake,
    /// Consumption timestamp (Unix epoch seconds)
    pub consumed_at: i64,
}

/// Store enforcing single use of reauthentication proofs
#[derive(Clone)]
pub struct ReauthProofStore {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl ReauthProofStore {
    /// Create a new proof store with the default marker TTL
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            ttl_seconds: DEFAULT_PROOF_TTL,
        }
    }

    /// Create with a marker TTL matching the deployment's freshness window
    #[must_use]
    pub fn with_ttl(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }

    /// Generate Redis key for a proof ID
    fn key(proof_id: &str) -> String {
        format!("{REAUTH_PROOF_PREFIX}{proof_id}")
    }

    /// Consume a proof for the given actor
    ///
    /// Returns `true` the first time a proof ID is seen and `false` on
    /// every subsequent attempt.
    pub async fn consume(&self, proof_id: &str, actor_id: Snowflake) -> RedisResult<bool> {
        let marker = ConsumedProof {
            actor_id,
            consumed_at: Utc::now().timestamp(),
        };

        let first_use = self
            .pool
            .set_if_absent(&Self::key(proof_id), &marker, self.ttl_seconds)
            .await?;

        if first_use {
            tracing::debug!(proof_id = %proof_id, actor_id = %actor_id, "Consumed reauth proof");
        } else {
            tracing::warn!(proof_id = %proof_id, actor_id = %actor_id, "Rejected reused reauth proof");
        }

        Ok(first_use)
    }

    /// Check whether a proof has already been consumed
    pub async fn is_consumed(&self, proof_id: &str) -> RedisResult<bool> {
        self.pool.exists(&Self::key(proof_id)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_generation() {
        let key = ReauthProofStore::key("abc123");
        assert_eq!(key, "reauth_proof:abc123");
    }

    #[test]
    fn test_consumed_proof_serialization() {
        let marker = ConsumedProof {
            actor_id: Snowflake::new(42),
            consumed_at: 1_700_000_000,
        };
        let json = serde_json::to_string(&marker).unwrap();
        let parsed: ConsumedProof = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.actor_id, Snowflake::new(42));
        assert_eq!(parsed.consumed_at, 1_700_000_000);
    }
}
