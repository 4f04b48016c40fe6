//! # lotledger-engine
//!
//! The settlement engine of LotLedger: every money-moving operation on
//! the wallet ledger flows through here.
//!
//! ## Architecture
//!
//! The engine sits between collaborator features (listing, auction, and
//! admin UIs) and the stores:
//! 1. **EscrowManager**: the hold lifecycle from bid through outbid, win, and cancel
//! 2. **WithdrawalDesk**: balance-checked withdrawal execution
//! 3. **SettlementEngine**: one object owning all mutable state; each
//!    method is one logical transaction
//! 4. **LedgerService**: the concurrency boundary, a mutex around the
//!    engine plus a post-commit change broadcast
//!
//! ## Money Flow
//!
//! ```text
//! deposit ──▶ balance ──▶ hold (bid) ──▶ order + fee (win)
//!                 ▲            │
//!                 └── refund ◀─┘ (outbid / cancel / no winner)
//! balance ──▶ withdrawal (payout handoff)
//! ```
//!
//! Every mutation either fully applies (ledger entry plus balance
//! deltas) or leaves no trace.

pub mod broadcast;
pub mod conservation;
pub mod engine;
pub mod escrow;
pub mod fees;
pub mod reconcile;
pub mod service;
pub mod withdrawal;

pub use broadcast::ChangeBroadcaster;
pub use engine::SettlementEngine;
pub use escrow::EscrowManager;
pub use reconcile::ReconciliationReport;
pub use service::LedgerService;
pub use withdrawal::WithdrawalDesk;
