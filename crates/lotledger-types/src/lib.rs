//! # lotledger-types
//!
//! Shared types, errors, and configuration for the **LotLedger** wallet and
//! auction-escrow settlement engine.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`AccountId`], [`ListingId`], [`EntryId`], [`WithdrawalId`], [`AuditId`]
//! - **Balance model**: [`AccountBalance`], [`AccountRole`]
//! - **Ledger model**: [`LedgerEntry`], [`EntryKind`], [`EntryStatus`]
//! - **Withdrawal model**: [`WithdrawalRequest`], [`WithdrawalStatus`]
//! - **Audit model**: [`AuditEntry`]
//! - **Fee model**: [`SellerTier`], [`FeeSchedule`]
//! - **Change feed**: [`StateChange`], [`ChangeKey`]
//! - **Configuration**: [`EngineConfig`], [`IdempotencyConfig`]
//! - **Errors**: [`LedgerError`] with `LL_ERR_` prefix codes

pub mod audit;
pub mod balance;
pub mod config;
pub mod constants;
pub mod entry;
pub mod error;
pub mod event;
pub mod ids;
pub mod tier;
pub mod withdrawal;

// Re-export all primary types at crate root for ergonomic imports:
//   use lotledger_types::{LedgerEntry, EntryKind, AccountId, ...};

pub use audit::*;
pub use balance::*;
pub use config::*;
pub use entry::*;
pub use error::*;
pub use event::*;
pub use ids::*;
pub use tier::*;
pub use withdrawal::*;

// Constants are accessed via `lotledger_types::constants::FOO`
// (not re-exported to avoid name collisions).
