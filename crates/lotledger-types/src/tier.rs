//! Seller tier classification and the fee schedule.
//!
//! A seller's tier is a pure function of their historical completed-order
//! count and revenue, both read from the ledger. The tier determines the
//! platform's fee percentage on that seller's sales. Tiers are recomputed
//! live at settlement time rather than cached, so a sale that crosses a
//! threshold takes effect on the next settlement.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants;

/// Seller classification determining the platform fee rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SellerTier {
    /// New or low-volume sellers. Default fee rate.
    Standard,
    /// Sellers past the first volume threshold.
    Established,
    /// High-volume sellers. Lowest fee rate.
    Premier,
}

impl SellerTier {
    /// Classify a seller from their completed-order history.
    ///
    /// A tier is reached by order count **or** revenue, whichever comes
    /// first.
    #[must_use]
    pub fn classify(completed_orders: u64, revenue: Decimal, schedule: &FeeSchedule) -> Self {
        if completed_orders >= schedule.premier_orders || revenue >= schedule.premier_revenue {
            Self::Premier
        } else if completed_orders >= schedule.established_orders
            || revenue >= schedule.established_revenue
        {
            Self::Established
        } else {
            Self::Standard
        }
    }

    /// The platform fee rate for this tier under the given schedule.
    #[must_use]
    pub fn fee_rate(&self, schedule: &FeeSchedule) -> Decimal {
        match self {
            Self::Standard => schedule.standard_rate,
            Self::Established => schedule.established_rate,
            Self::Premier => schedule.premier_rate,
        }
    }
}

impl std::fmt::Display for SellerTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Standard => write!(f, "STANDARD"),
            Self::Established => write!(f, "ESTABLISHED"),
            Self::Premier => write!(f, "PREMIER"),
        }
    }
}

/// Fee rates and tier thresholds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeeSchedule {
    /// Platform fee rate for Standard sellers (e.g., 0.10 = 10%).
    pub standard_rate: Decimal,
    /// Platform fee rate for Established sellers.
    pub established_rate: Decimal,
    /// Platform fee rate for Premier sellers.
    pub premier_rate: Decimal,
    /// Completed orders to reach Established.
    pub established_orders: u64,
    /// Revenue (seller net, summed) to reach Established.
    pub established_revenue: Decimal,
    /// Completed orders to reach Premier.
    pub premier_orders: u64,
    /// Revenue to reach Premier.
    pub premier_revenue: Decimal,
    /// Markup added on top of a bid when the hold is placed
    /// (0 disables the buyer premium).
    pub buyer_premium_rate: Decimal,
}

impl Default for FeeSchedule {
    fn default() -> Self {
        Self {
            standard_rate: Decimal::new(10, 2),    // 10%
            established_rate: Decimal::new(8, 2),  // 8%
            premier_rate: Decimal::new(5, 2),      // 5%
            established_orders: constants::ESTABLISHED_TIER_ORDERS,
            established_revenue: Decimal::new(10_000, 0),
            premier_orders: constants::PREMIER_TIER_ORDERS,
            premier_revenue: Decimal::new(100_000, 0),
            buyer_premium_rate: Decimal::ZERO,
        }
    }
}
