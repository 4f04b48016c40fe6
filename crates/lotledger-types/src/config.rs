//! Configuration types for the settlement engine.

use serde::{Deserialize, Serialize};

use crate::{FeeSchedule, constants};

/// Top-level engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Fee rates and tier thresholds.
    pub fees: FeeSchedule,
    /// Idempotency guard tuning.
    pub idempotency: IdempotencyConfig,
    /// Capacity of the change broadcast channel.
    pub broadcast_capacity: usize,
}

impl EngineConfig {
    /// Default configuration with a usable broadcast capacity.
    #[must_use]
    pub fn new() -> Self {
        Self {
            fees: FeeSchedule::default(),
            idempotency: IdempotencyConfig::default(),
            broadcast_capacity: constants::DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Tuning for the external-reference idempotency guard.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IdempotencyConfig {
    /// How long a record shields against replays, in seconds.
    pub ttl_secs: i64,
    /// Record count that triggers an opportunistic purge of expired
    /// records. Cleanup is threshold-driven, not exact-time-driven.
    pub cleanup_threshold: usize,
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_secs: constants::DEFAULT_IDEMPOTENCY_TTL_SECS,
            cleanup_threshold: constants::DEFAULT_IDEMPOTENCY_CLEANUP_THRESHOLD,
        }
    }
}
