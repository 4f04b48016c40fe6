//! # Ledger entry: one immutable money movement
//!
//! Every movement of funds through the engine produces exactly one
//! [`LedgerEntry`]: deposits, auction holds, refunds, completed orders,
//! withdrawals, fee accruals, and manual admin adjustments.
//!
//! ## Hold State Machine
//!
//! ```text
//!   ┌─────────┐  auction won   ┌───────────┐
//!   │ PENDING ├───────────────▶│ COMPLETED │
//!   └────┬────┘                └───────────┘
//!        │ outbid / cancel / no winner
//!        ▼
//!   ┌──────────┐
//!   │ REFUNDED │
//!   └──────────┘
//! ```
//!
//! Transitions are **monotonic**: a hold that left `Pending` can never be
//! settled or refunded a second time. That single rule is what makes
//! outbid refunds idempotent and double-settlement impossible.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, EntryId, ExternalRef, LedgerError, ListingId};

/// What kind of money movement an entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryKind {
    /// External funds credited to a buyer (webhook-confirmed).
    Deposit,
    /// A finalized sale: gross split into seller net and platform fee.
    Order,
    /// Funds debited from a bidder, reserved against a listing.
    AuctionHold,
    /// A hold returned to its bidder (outbid, cancelled, or no winner).
    Refund,
    /// Funds leaving a seller's balance toward an external payout.
    Withdrawal,
    /// The platform's cut of an order, recorded for the fee trail.
    Fee,
    /// A manual correction by an administrator, always audited.
    AdminAdjustment,
}

impl std::fmt::Display for EntryKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Deposit => write!(f, "DEPOSIT"),
            Self::Order => write!(f, "ORDER"),
            Self::AuctionHold => write!(f, "AUCTION_HOLD"),
            Self::Refund => write!(f, "REFUND"),
            Self::Withdrawal => write!(f, "WITHDRAWAL"),
            Self::Fee => write!(f, "FEE"),
            Self::AdminAdjustment => write!(f, "ADMIN_ADJUSTMENT"),
        }
    }
}

/// Lifecycle state of a ledger entry.
///
/// Only `AuctionHold` entries are ever created in `Pending`; every other
/// kind is born terminal (`Completed`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryStatus {
    /// A hold awaiting auction resolution.
    Pending,
    /// Settled. For holds this means the auction was won and an order
    /// entry exists. **Irreversible.**
    Completed,
    /// Returned to the payer. **Irreversible.**
    Refunded,
    /// Abandoned without money movement. **Irreversible.**
    Cancelled,
}

impl EntryStatus {
    /// Can this entry transition to the given target state?
    #[must_use]
    pub fn can_transition_to(&self, target: Self) -> bool {
        matches!(
            (self, target),
            (
                Self::Pending,
                Self::Completed | Self::Refunded | Self::Cancelled
            )
        )
    }

    /// Whether this state is terminal (no further transitions).
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::Completed => write!(f, "COMPLETED"),
            Self::Refunded => write!(f, "REFUNDED"),
            Self::Cancelled => write!(f, "CANCELLED"),
        }
    }
}

/// One immutable record of a single money movement.
///
/// For `Order` entries the amounts always satisfy
/// `gross_amount == seller_net + platform_fee`; see [`Self::splits_cleanly`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Globally unique entry identifier.
    pub id: EntryId,
    /// The kind of movement recorded.
    pub kind: EntryKind,
    /// The paying side, if any.
    pub buyer: Option<AccountId>,
    /// The receiving seller, if any.
    pub seller: Option<AccountId>,
    /// Total amount moved.
    pub gross_amount: Decimal,
    /// The platform's cut (orders and fee entries only, zero elsewhere).
    pub platform_fee: Decimal,
    /// What the seller actually receives (orders only, zero elsewhere).
    pub seller_net: Decimal,
    /// The listing this movement relates to, if any.
    pub listing_id: Option<ListingId>,
    /// Lifecycle state.
    pub status: EntryStatus,
    /// When the entry was written.
    pub created_at: DateTime<Utc>,
    /// Externally supplied reference (payment provider txn id), if any.
    pub external_ref: Option<ExternalRef>,
}

impl LedgerEntry {
    /// A webhook-confirmed deposit crediting `buyer`.
    #[must_use]
    pub fn deposit(buyer: AccountId, amount: Decimal, external_ref: ExternalRef) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::Deposit,
            buyer: Some(buyer),
            seller: None,
            gross_amount: amount,
            platform_fee: Decimal::ZERO,
            seller_net: Decimal::ZERO,
            listing_id: None,
            status: EntryStatus::Completed,
            created_at: Utc::now(),
            external_ref: Some(external_ref),
        }
    }

    /// A pending escrow hold: `bidder`'s funds reserved against `listing`.
    /// The fee split stays zero until the auction resolves.
    #[must_use]
    pub fn hold(listing: ListingId, bidder: AccountId, seller: AccountId, gross: Decimal) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::AuctionHold,
            buyer: Some(bidder),
            seller: Some(seller),
            gross_amount: gross,
            platform_fee: Decimal::ZERO,
            seller_net: Decimal::ZERO,
            listing_id: Some(listing),
            status: EntryStatus::Pending,
            created_at: Utc::now(),
            external_ref: None,
        }
    }

    /// The terminal refund entry paired with a refunded hold.
    #[must_use]
    pub fn refund_of(hold: &LedgerEntry) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::Refund,
            buyer: hold.buyer,
            seller: hold.seller,
            gross_amount: hold.gross_amount,
            platform_fee: Decimal::ZERO,
            seller_net: Decimal::ZERO,
            listing_id: hold.listing_id,
            status: EntryStatus::Completed,
            created_at: Utc::now(),
            external_ref: None,
        }
    }

    /// The terminal order entry paired with a released hold: the hold's
    /// gross split into seller net and platform fee.
    #[must_use]
    pub fn order_from_hold(hold: &LedgerEntry, platform_fee: Decimal, seller_net: Decimal) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::Order,
            buyer: hold.buyer,
            seller: hold.seller,
            gross_amount: hold.gross_amount,
            platform_fee,
            seller_net,
            listing_id: hold.listing_id,
            status: EntryStatus::Completed,
            created_at: Utc::now(),
            external_ref: None,
        }
    }

    /// The platform's fee accrual for an order.
    #[must_use]
    pub fn fee_for_order(order: &LedgerEntry, platform: AccountId) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::Fee,
            buyer: order.buyer,
            seller: Some(platform),
            gross_amount: order.platform_fee,
            platform_fee: order.platform_fee,
            seller_net: Decimal::ZERO,
            listing_id: order.listing_id,
            status: EntryStatus::Completed,
            created_at: Utc::now(),
            external_ref: None,
        }
    }

    /// A completed withdrawal debiting `seller`.
    #[must_use]
    pub fn withdrawal(seller: AccountId, amount: Decimal) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::Withdrawal,
            buyer: None,
            seller: Some(seller),
            gross_amount: amount,
            platform_fee: Decimal::ZERO,
            seller_net: Decimal::ZERO,
            listing_id: None,
            status: EntryStatus::Completed,
            created_at: Utc::now(),
            external_ref: None,
        }
    }

    /// A manual admin correction. `delta` may be negative; the signed
    /// value is preserved in `gross_amount`.
    #[must_use]
    pub fn admin_adjustment(target: AccountId, delta: Decimal) -> Self {
        Self {
            id: EntryId::new(),
            kind: EntryKind::AdminAdjustment,
            buyer: Some(target),
            seller: None,
            gross_amount: delta,
            platform_fee: Decimal::ZERO,
            seller_net: Decimal::ZERO,
            listing_id: None,
            status: EntryStatus::Completed,
            created_at: Utc::now(),
            external_ref: None,
        }
    }

    /// Whether the fee split adds up: `gross == net + fee`.
    /// Only meaningful for `Order` entries; trivially true elsewhere.
    #[must_use]
    pub fn splits_cleanly(&self) -> bool {
        match self.kind {
            EntryKind::Order => self.gross_amount == self.seller_net + self.platform_fee,
            _ => true,
        }
    }

    /// Whether this is a hold still awaiting resolution.
    #[must_use]
    pub fn is_active_hold(&self) -> bool {
        self.kind == EntryKind::AuctionHold && self.status == EntryStatus::Pending
    }

    /// Attempt to transition to COMPLETED (auction won).
    ///
    /// # Errors
    /// Returns [`LedgerError::InconsistentHold`] if the entry already
    /// left `Pending`.
    pub fn mark_completed(&mut self) -> crate::Result<()> {
        self.transition(EntryStatus::Completed)
    }

    /// Attempt to transition to REFUNDED (outbid / cancelled / no winner).
    ///
    /// # Errors
    /// Returns [`LedgerError::InconsistentHold`] if the entry already
    /// left `Pending`.
    pub fn mark_refunded(&mut self) -> crate::Result<()> {
        self.transition(EntryStatus::Refunded)
    }

    /// Attempt to transition to CANCELLED.
    ///
    /// # Errors
    /// Returns [`LedgerError::InconsistentHold`] if the entry already
    /// left `Pending`.
    pub fn mark_cancelled(&mut self) -> crate::Result<()> {
        self.transition(EntryStatus::Cancelled)
    }

    fn transition(&mut self, target: EntryStatus) -> crate::Result<()> {
        if !self.status.can_transition_to(target) {
            return Err(LedgerError::InconsistentHold {
                reason: format!(
                    "Cannot transition entry {} from {} to {}",
                    self.id, self.status, target
                ),
            });
        }
        self.status = target;
        Ok(())
    }
}
