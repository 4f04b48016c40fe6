//! The order/hold ledger: every money movement ever applied.
//!
//! Entries are keyed by [`EntryId`] with secondary indexes by listing id
//! and by account id (both the paying and receiving side). Entries are
//! append-accessed: once written, only an `AuctionHold`'s status ever
//! changes, and only through the engine's settlement paths.

use std::collections::HashMap;

use lotledger_types::{AccountId, EntryId, EntryKind, LedgerEntry, ListingId};
use rust_decimal::Decimal;

/// Append-accessed collection of ledger entries with secondary indexes.
pub struct EntryLedger {
    /// All entries by id.
    entries: HashMap<EntryId, LedgerEntry>,
    /// Entry ids per listing, in insertion order.
    by_listing: HashMap<ListingId, Vec<EntryId>>,
    /// Entry ids per account (buyer or seller side), in insertion order.
    by_account: HashMap<AccountId, Vec<EntryId>>,
}

impl EntryLedger {
    /// Create a new empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            by_listing: HashMap::new(),
            by_account: HashMap::new(),
        }
    }

    /// Insert an entry and index it. Returns the entry id.
    pub fn insert(&mut self, entry: LedgerEntry) -> EntryId {
        let id = entry.id;
        if let Some(listing) = entry.listing_id {
            self.by_listing.entry(listing).or_default().push(id);
        }
        for account in [entry.buyer, entry.seller].into_iter().flatten() {
            let ids = self.by_account.entry(account).or_default();
            // An entry can reference the same account on both sides.
            if ids.last() != Some(&id) {
                ids.push(id);
            }
        }
        self.entries.insert(id, entry);
        id
    }

    /// Look up an entry by id.
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&LedgerEntry> {
        self.entries.get(&id)
    }

    /// Mutable lookup, for the engine's hold status transitions.
    #[must_use]
    pub fn get_mut(&mut self, id: EntryId) -> Option<&mut LedgerEntry> {
        self.entries.get_mut(&id)
    }

    /// All entries touching an account, oldest first.
    #[must_use]
    pub fn entries_for_account(&self, account: AccountId) -> Vec<&LedgerEntry> {
        self.by_account
            .get(&account)
            .map(|ids| ids.iter().filter_map(|id| self.entries.get(id)).collect())
            .unwrap_or_default()
    }

    /// All entries referencing a listing, oldest first.
    #[must_use]
    pub fn entries_for_listing(&self, listing: ListingId) -> Vec<&LedgerEntry> {
        self.by_listing
            .get(&listing)
            .map(|ids| ids.iter().filter_map(|id| self.entries.get(id)).collect())
            .unwrap_or_default()
    }

    /// The bidder's single active hold on a listing, if any.
    ///
    /// The engine maintains at most one `Pending` hold per (listing,
    /// bidder) pair; this scans the listing index and returns the first.
    #[must_use]
    pub fn active_hold(&self, listing: ListingId, bidder: AccountId) -> Option<EntryId> {
        self.entries_for_listing(listing)
            .into_iter()
            .find(|e| e.is_active_hold() && e.buyer == Some(bidder))
            .map(|e| e.id)
    }

    /// Whether the bidder has any hold on the listing that ended up
    /// refunded. Used to keep outbid refunds idempotent.
    #[must_use]
    pub fn has_refunded_hold(&self, listing: ListingId, bidder: AccountId) -> bool {
        self.entries_for_listing(listing).into_iter().any(|e| {
            e.kind == EntryKind::AuctionHold
                && e.buyer == Some(bidder)
                && e.status == lotledger_types::EntryStatus::Refunded
        })
    }

    /// Every hold on a listing still awaiting resolution.
    #[must_use]
    pub fn pending_holds(&self, listing: ListingId) -> Vec<EntryId> {
        self.entries_for_listing(listing)
            .into_iter()
            .filter(|e| e.is_active_hold())
            .map(|e| e.id)
            .collect()
    }

    /// Completed-order count and summed seller-net revenue for a seller,
    /// for live tier classification.
    #[must_use]
    pub fn seller_order_stats(&self, seller: AccountId) -> (u64, Decimal) {
        self.entries_for_account(seller)
            .into_iter()
            .filter(|e| e.kind == EntryKind::Order && e.seller == Some(seller))
            .fold((0u64, Decimal::ZERO), |(count, revenue), e| {
                (count + 1, revenue + e.seller_net)
            })
    }

    /// Sum of all deposit entries, for the conservation check.
    #[must_use]
    pub fn deposited_total(&self) -> Decimal {
        self.sum_kind(EntryKind::Deposit)
    }

    /// Sum of all withdrawal entries, for the conservation check.
    #[must_use]
    pub fn withdrawn_total(&self) -> Decimal {
        self.sum_kind(EntryKind::Withdrawal)
    }

    /// Signed sum of all admin adjustments, for the conservation check.
    #[must_use]
    pub fn adjustment_total(&self) -> Decimal {
        self.sum_kind(EntryKind::AdminAdjustment)
    }

    /// Sum of gross amounts across all holds still pending: money debited
    /// from bidders but not yet settled or returned.
    #[must_use]
    pub fn outstanding_hold_total(&self) -> Decimal {
        self.entries
            .values()
            .filter(|e| e.is_active_hold())
            .map(|e| e.gross_amount)
            .sum()
    }

    /// Number of entries in the ledger.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the ledger is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries (unordered).
    pub fn iter(&self) -> impl Iterator<Item = &LedgerEntry> {
        self.entries.values()
    }

    fn sum_kind(&self, kind: EntryKind) -> Decimal {
        self.entries
            .values()
            .filter(|e| e.kind == kind)
            .map(|e| e.gross_amount)
            .sum()
    }
}

impl Default for EntryLedger {
    fn default() -> Self {
        Self::new()
    }
}
