//! External-event idempotency guard.
//!
//! The payment provider delivers webhooks at-least-once; correctness
//! comes from this guard, never from assuming exactly-once delivery.
//! The first sighting of an external reference is recorded and allowed
//! through; repeats within the TTL window are reported as duplicates.
//!
//! Cleanup of expired records is opportunistic: once the record count
//! crosses a threshold, expired records are purged in bulk. This trades
//! minor memory overshoot for not needing a timer.

use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use lotledger_types::{ExternalRef, IdempotencyConfig};

/// TTL-bounded record of externally supplied operation references.
pub struct IdempotencyGuard {
    /// First-seen timestamps per external reference.
    seen: HashMap<ExternalRef, DateTime<Utc>>,
    /// How long a record shields against replays.
    ttl: Duration,
    /// Record count that triggers a purge of expired records.
    cleanup_threshold: usize,
}

impl IdempotencyGuard {
    /// Create a guard from configuration.
    ///
    /// # Panics
    /// Panics if `cleanup_threshold` is zero.
    #[must_use]
    pub fn new(config: &IdempotencyConfig) -> Self {
        assert!(
            config.cleanup_threshold > 0,
            "IdempotencyGuard cleanup_threshold must be > 0"
        );
        Self {
            seen: HashMap::new(),
            ttl: Duration::seconds(config.ttl_secs),
            cleanup_threshold: config.cleanup_threshold,
        }
    }

    /// Decide whether an external event should be applied.
    ///
    /// Returns `true` (and records the reference) on first sight or after
    /// the previous record expired; `false` if the reference was already
    /// seen within the TTL window.
    pub fn should_process(&mut self, external_ref: &str) -> bool {
        let now = Utc::now();

        if self.seen.len() >= self.cleanup_threshold {
            self.purge_expired(now);
        }

        match self.seen.get(external_ref) {
            Some(first_seen) if now - *first_seen < self.ttl => false,
            _ => {
                self.seen.insert(external_ref.to_string(), now);
                true
            }
        }
    }

    /// Whether a reference is currently recorded (expired or not).
    #[must_use]
    pub fn contains(&self, external_ref: &str) -> bool {
        self.seen.contains_key(external_ref)
    }

    /// Number of records currently held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.seen.len()
    }

    /// Whether no records are held.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    fn purge_expired(&mut self, now: DateTime<Utc>) {
        let ttl = self.ttl;
        let before = self.seen.len();
        self.seen.retain(|_, first_seen| now - *first_seen < ttl);
        let dropped = before - self.seen.len();
        if dropped > 0 {
            tracing::debug!(dropped, retained = self.seen.len(), "purged expired idempotency records");
        }
    }
}
