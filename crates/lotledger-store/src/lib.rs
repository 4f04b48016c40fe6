//! # lotledger-store
//!
//! The mutable shared state of the LotLedger engine:
//!
//! 1. **BalanceStore**: account id → spendable balance, never negative
//! 2. **EntryLedger**: all money movements, indexed by listing and account
//! 3. **IdempotencyGuard**: TTL-bounded external-reference replay shield
//! 4. **AuditLog**: append-only record of admin adjustments
//!
//! These structures carry no locking of their own; the engine crate wraps
//! them in a single transaction boundary so that one ledger entry write and
//! its balance deltas are always observed together or not at all.

pub mod audit;
pub mod balance_store;
pub mod idempotency;
pub mod ledger;

pub use audit::AuditLog;
pub use balance_store::BalanceStore;
pub use idempotency::IdempotencyGuard;
pub use ledger::EntryLedger;
