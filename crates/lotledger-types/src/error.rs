//! Error types for the LotLedger settlement engine.
//!
//! All errors use the `LL_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 1xx: Balance errors
//! - 2xx: Escrow / hold errors
//! - 3xx: Withdrawal errors
//! - 4xx: Idempotency errors
//! - 5xx: Conservation errors
//! - 9xx: General / internal errors

use rust_decimal::Decimal;
use thiserror::Error;

use crate::{AccountId, ExternalRef, ListingId};

/// Central error enum for all LotLedger operations.
#[derive(Debug, Error)]
pub enum LedgerError {
    // =================================================================
    // Balance Errors (1xx)
    // =================================================================
    /// A debit would take the balance below zero. Always recoverable by
    /// the caller (e.g., reject the bid).
    #[error("LL_ERR_100: Insufficient funds: need {needed}, have {available}")]
    InsufficientFunds { needed: Decimal, available: Decimal },

    /// The account has never been opened (no deposit, no sale).
    #[error("LL_ERR_101: Unknown account: {0}")]
    UnknownAccount(AccountId),

    /// A zero or negative amount where a positive one is required.
    #[error("LL_ERR_102: Amount must be positive, got {0}")]
    NegativeAmount(Decimal),

    // =================================================================
    // Escrow / Hold Errors (2xx)
    // =================================================================
    /// No active hold exists for this (listing, bidder) pair.
    #[error("LL_ERR_200: No hold found for bidder {bidder} on {listing}")]
    HoldNotFound {
        listing: ListingId,
        bidder: AccountId,
    },

    /// An auction resolved with a hold in an unexpected state. Fatal to
    /// that resolution attempt; surfaced for manual reconciliation.
    #[error("LL_ERR_201: Inconsistent hold: {reason}")]
    InconsistentHold { reason: String },

    /// The listing was never registered with the engine.
    #[error("LL_ERR_202: Unknown listing: {0}")]
    UnknownListing(ListingId),

    // =================================================================
    // Withdrawal Errors (3xx)
    // =================================================================
    /// Bad withdrawal amount or amount exceeding the current balance.
    #[error("LL_ERR_300: Invalid withdrawal: {reason}")]
    InvalidWithdrawal { reason: String },

    // =================================================================
    // Idempotency Errors (4xx)
    // =================================================================
    /// An external reference was already processed within the TTL window.
    /// Deposits translate this into a success-no-op; it is a typed value
    /// so other call sites can choose differently.
    #[error("LL_ERR_400: Duplicate operation: {0}")]
    DuplicateOperation(ExternalRef),

    // =================================================================
    // Conservation Errors (5xx)
    // =================================================================
    /// The conservation invariant broke: money was created or destroyed.
    /// Critical safety alert.
    #[error("LL_ERR_500: Conservation violation: {reason}")]
    ConservationViolation { reason: String },

    // =================================================================
    // General / Internal (9xx)
    // =================================================================
    /// Unrecoverable internal error.
    #[error("LL_ERR_900: Internal error: {0}")]
    Internal(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, LedgerError>;
