//! Reconciliation sweep for stale holds.
//!
//! A hold surviving past its auction's close is a defect, not a normal
//! code path: every hold should have been released or refunded during
//! resolution. The periodic sweep reports such holds for manual
//! reconciliation; it never repairs them itself.

use lotledger_store::EntryLedger;
use lotledger_types::{AccountId, EntryId, ListingId};
use rust_decimal::Decimal;

/// One hold left pending after its listing closed.
#[derive(Debug, Clone)]
pub struct StaleHold {
    /// The offending hold entry.
    pub entry_id: EntryId,
    /// The closed listing it belongs to.
    pub listing: ListingId,
    /// The bidder whose money is stuck.
    pub bidder: Option<AccountId>,
    /// The stuck amount.
    pub amount: Decimal,
}

/// Outcome of a reconciliation sweep.
#[derive(Debug, Clone, Default)]
pub struct ReconciliationReport {
    /// Holds found pending on closed listings.
    pub stale_holds: Vec<StaleHold>,
}

impl ReconciliationReport {
    /// Whether the sweep found nothing wrong.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.stale_holds.is_empty()
    }

    /// Total amount stuck in stale holds.
    #[must_use]
    pub fn stuck_total(&self) -> Decimal {
        self.stale_holds.iter().map(|h| h.amount).sum()
    }
}

/// Scan the ledger for holds still pending on listings known to be
/// closed. Each finding is logged; the report is returned for manual
/// follow-up.
#[must_use]
pub fn sweep(ledger: &EntryLedger, closed_listings: &[ListingId]) -> ReconciliationReport {
    let mut report = ReconciliationReport::default();
    for &listing in closed_listings {
        for entry_id in ledger.pending_holds(listing) {
            let Some(entry) = ledger.get(entry_id) else {
                continue;
            };
            tracing::warn!(
                %listing,
                %entry_id,
                amount = %entry.gross_amount,
                "stale hold found on closed listing"
            );
            report.stale_holds.push(StaleHold {
                entry_id,
                listing,
                bidder: entry.buyer,
                amount: entry.gross_amount,
            });
        }
    }
    report
}
