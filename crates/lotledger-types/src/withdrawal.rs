//! Withdrawal request model.
//!
//! A request is validated against the seller's live balance and, on
//! success, completed in the same transaction that debits the balance.
//! There is no pending payout state inside this engine; the external
//! payout collaborator takes over once the request is `Completed`.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, WithdrawalId};

/// Lifecycle of a withdrawal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WithdrawalStatus {
    /// Accepted but not yet debited. Transient within a transaction.
    Requested,
    /// Debited exactly once and handed off to the payout collaborator.
    Completed,
}

impl std::fmt::Display for WithdrawalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Requested => write!(f, "REQUESTED"),
            Self::Completed => write!(f, "COMPLETED"),
        }
    }
}

/// A seller's request to move funds out of the platform.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WithdrawalRequest {
    /// Unique request identifier.
    pub id: WithdrawalId,
    /// The seller withdrawing funds.
    pub seller_id: AccountId,
    /// Amount to withdraw. Must not exceed the balance at request time.
    pub amount: Decimal,
    /// Current status.
    pub status: WithdrawalStatus,
    /// When the request was made.
    pub requested_at: DateTime<Utc>,
}

impl WithdrawalRequest {
    /// Create a new request in `Requested` state.
    #[must_use]
    pub fn new(seller_id: AccountId, amount: Decimal) -> Self {
        Self {
            id: WithdrawalId::new(),
            seller_id,
            amount,
            status: WithdrawalStatus::Requested,
            requested_at: Utc::now(),
        }
    }

    /// Mark the request completed once the debit has been applied.
    pub fn complete(&mut self) {
        self.status = WithdrawalStatus::Completed;
    }
}
