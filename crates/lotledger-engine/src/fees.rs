//! Fee computation: live tier lookup and the gross split.
//!
//! The tier is recomputed from the ledger at every settlement rather than
//! cached per seller, so a sale that crosses a threshold is priced
//! correctly on the very next settlement.

use lotledger_store::EntryLedger;
use lotledger_types::{AccountId, FeeSchedule, SellerTier, constants};
use rust_decimal::{Decimal, RoundingStrategy};

/// Round a money amount to cents, half away from zero.
#[must_use]
pub fn round_money(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(constants::MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero)
}

/// Classify a seller from their completed-order history in the ledger.
#[must_use]
pub fn seller_tier(ledger: &EntryLedger, seller: AccountId, schedule: &FeeSchedule) -> SellerTier {
    let (orders, revenue) = ledger.seller_order_stats(seller);
    SellerTier::classify(orders, revenue, schedule)
}

/// Split a gross amount into `(platform_fee, seller_net)`.
///
/// The fee is rounded to cents; the net is the exact remainder, so the
/// split always satisfies `gross == net + fee`.
#[must_use]
pub fn split_gross(gross: Decimal, rate: Decimal) -> (Decimal, Decimal) {
    let fee = round_money(gross * rate);
    (fee, gross - fee)
}
