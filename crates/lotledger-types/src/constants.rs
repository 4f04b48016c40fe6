//! System-wide constants for the LotLedger settlement engine.

/// Decimal places money amounts are rounded to (cents).
pub const MONEY_SCALE: u32 = 2;

/// Default time-to-live for idempotency records, in seconds (two hours).
pub const DEFAULT_IDEMPOTENCY_TTL_SECS: i64 = 7_200;

/// Number of idempotency records that triggers an opportunistic purge
/// of expired entries.
pub const DEFAULT_IDEMPOTENCY_CLEANUP_THRESHOLD: usize = 4_096;

/// Default capacity of the balance-change broadcast channel.
pub const DEFAULT_BROADCAST_CAPACITY: usize = 256;

/// Completed-order count at which a seller reaches the Established tier.
pub const ESTABLISHED_TIER_ORDERS: u64 = 25;

/// Completed-order count at which a seller reaches the Premier tier.
pub const PREMIER_TIER_ORDERS: u64 = 100;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "LotLedger";
