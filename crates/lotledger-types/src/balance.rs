//! Account balance types.
//!
//! A balance is a single non-negative `Decimal`; escrowed funds are not a
//! separate bucket here; placing a hold debits the bidder's balance and
//! the outstanding amount lives in the hold's ledger entry until the
//! auction resolves.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The class of an account. Fee rules and tier classification only apply
/// to sellers; the platform account collects fees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountRole {
    /// Deposits funds and bids on listings.
    Buyer,
    /// Receives sale proceeds net of the platform fee.
    Seller,
    /// The single platform account that accrues fees.
    Platform,
}

impl std::fmt::Display for AccountRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buyer => write!(f, "BUYER"),
            Self::Seller => write!(f, "SELLER"),
            Self::Platform => write!(f, "PLATFORM"),
        }
    }
}

/// One account's spendable balance. Created on first deposit or first sale;
/// never deleted, only zeroed. `amount` never goes negative; debits that
/// would cross zero are rejected before any state changes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccountBalance {
    /// The account class.
    pub role: AccountRole,
    /// Spendable funds.
    pub amount: Decimal,
}

impl AccountBalance {
    /// Create a zero balance for the given role.
    #[must_use]
    pub fn zero(role: AccountRole) -> Self {
        Self {
            role,
            amount: Decimal::ZERO,
        }
    }

    /// Whether this account holds no funds.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.amount.is_zero()
    }
}
