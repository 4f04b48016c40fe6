//! The shared ledger service.
//!
//! `LedgerService` is the handle the rest of the system clones around: a
//! mutex over the [`SettlementEngine`] plus the change broadcaster. Each
//! call takes the lock, runs one engine transaction, drops the lock, and
//! only then publishes the committed changes. Subscribers therefore never
//! observe a change before the state it describes is readable.

use std::sync::Arc;

use lotledger_types::{
    AccountId, AuditEntry, EngineConfig, LedgerEntry, ListingId, Result, SellerTier, StateChange,
    WithdrawalRequest,
};
use parking_lot::Mutex;
use rust_decimal::Decimal;
use tokio::sync::broadcast;

use crate::broadcast::ChangeBroadcaster;
use crate::engine::{AdjustOutcome, DepositOutcome, SettlementEngine};
use crate::escrow::{HoldOutcome, RefundOutcome, ResolutionOutcome};
use crate::reconcile::ReconciliationReport;
use crate::withdrawal::WithdrawalOutcome;

/// Cloneable handle over the settlement engine.
#[derive(Clone)]
pub struct LedgerService {
    engine: Arc<Mutex<SettlementEngine>>,
    changes: ChangeBroadcaster,
}

impl LedgerService {
    /// Build a service around a fresh engine.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let capacity = config.broadcast_capacity;
        Self {
            engine: Arc::new(Mutex::new(SettlementEngine::new(config))),
            changes: ChangeBroadcaster::new(capacity),
        }
    }

    /// Subscribe to committed state changes.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<StateChange> {
        self.changes.subscribe()
    }

    /// The platform fee account.
    #[must_use]
    pub fn platform_account(&self) -> AccountId {
        self.engine.lock().platform_account()
    }

    fn publish(&self, changes: &[StateChange]) {
        self.changes.publish_all(changes);
    }

    /// Credit a confirmed deposit. See [`SettlementEngine::deposit`].
    pub fn deposit(
        &self,
        account: AccountId,
        amount: Decimal,
        external_ref: &str,
    ) -> Result<DepositOutcome> {
        let outcome = {
            let mut engine = self.engine.lock();
            engine.deposit(account, amount, external_ref)?
        };
        self.publish(&outcome.changes);
        Ok(outcome)
    }

    /// Register a listing's seller.
    pub fn open_listing(&self, listing: ListingId, seller: AccountId) {
        self.engine.lock().open_listing(listing, seller);
    }

    /// Place a bid's escrow hold. See [`SettlementEngine::place_bid`].
    pub fn place_bid(
        &self,
        listing: ListingId,
        bidder: AccountId,
        amount: Decimal,
    ) -> Result<HoldOutcome> {
        let outcome = {
            let mut engine = self.engine.lock();
            engine.place_bid(listing, bidder, amount)?
        };
        self.publish(&outcome.changes);
        Ok(outcome)
    }

    /// Refund an outbid bidder. See [`SettlementEngine::refund_outbid`].
    pub fn refund_outbid(&self, listing: ListingId, bidder: AccountId) -> Result<RefundOutcome> {
        let outcome = {
            let mut engine = self.engine.lock();
            engine.refund_outbid(listing, bidder)?
        };
        self.publish(&outcome.changes);
        Ok(outcome)
    }

    /// Resolve an auction. See [`SettlementEngine::resolve_auction`].
    pub fn resolve_auction(
        &self,
        listing: ListingId,
        winner: Option<AccountId>,
    ) -> Result<ResolutionOutcome> {
        let outcome = {
            let mut engine = self.engine.lock();
            engine.resolve_auction(listing, winner)?
        };
        self.publish(&outcome.changes);
        Ok(outcome)
    }

    /// Execute a seller withdrawal. See
    /// [`SettlementEngine::request_withdrawal`].
    pub fn request_withdrawal(
        &self,
        seller: AccountId,
        amount: Decimal,
    ) -> Result<WithdrawalOutcome> {
        let outcome = {
            let mut engine = self.engine.lock();
            engine.request_withdrawal(seller, amount)?
        };
        self.publish(&outcome.changes);
        Ok(outcome)
    }

    /// Apply an admin balance correction. See
    /// [`SettlementEngine::adjust_balance`].
    pub fn adjust_balance(
        &self,
        account: AccountId,
        delta: Decimal,
        reason: &str,
        acting_admin: AccountId,
    ) -> Result<AdjustOutcome> {
        let outcome = {
            let mut engine = self.engine.lock();
            engine.adjust_balance(account, delta, reason, acting_admin)?
        };
        self.publish(&outcome.changes);
        Ok(outcome)
    }

    /// Current balance for an account.
    #[must_use]
    pub fn balance(&self, account: AccountId) -> Decimal {
        self.engine.lock().balance(account)
    }

    /// All ledger entries touching an account.
    #[must_use]
    pub fn ledger_entries(&self, account: AccountId) -> Vec<LedgerEntry> {
        self.engine.lock().ledger_entries(account)
    }

    /// All audit entries.
    #[must_use]
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.engine.lock().audit_entries()
    }

    /// Completed withdrawal requests.
    #[must_use]
    pub fn withdrawals(&self) -> Vec<WithdrawalRequest> {
        self.engine.lock().withdrawals()
    }

    /// The seller tier a settlement would apply right now.
    #[must_use]
    pub fn seller_tier(&self, seller: AccountId) -> SellerTier {
        self.engine.lock().seller_tier(seller)
    }

    /// Verify the conservation invariant.
    ///
    /// # Errors
    /// Returns [`lotledger_types::LedgerError::ConservationViolation`] if
    /// money was created or destroyed.
    pub fn verify_conservation(&self) -> Result<()> {
        self.engine.lock().verify_conservation()
    }

    /// Sweep for holds left pending on closed listings.
    #[must_use]
    pub fn reconcile(&self, closed_listings: &[ListingId]) -> ReconciliationReport {
        self.engine.lock().reconcile(closed_listings)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lotledger_types::ChangeKey;

    #[test]
    fn deposit_publishes_after_commit() {
        let svc = LedgerService::default();
        let mut rx = svc.subscribe();
        let buyer = AccountId::new();

        svc.deposit(buyer, Decimal::new(100, 0), "dep-1").unwrap();

        // The balance change arrives and the state it describes is
        // already readable.
        let change = rx.try_recv().unwrap();
        assert_eq!(change.key, ChangeKey::Balance(buyer));
        assert_eq!(change.new_balance, Some(Decimal::new(100, 0)));
        assert_eq!(svc.balance(buyer), Decimal::new(100, 0));
    }

    #[test]
    fn duplicate_deposit_publishes_nothing() {
        let svc = LedgerService::default();
        let buyer = AccountId::new();
        svc.deposit(buyer, Decimal::new(100, 0), "dep-1").unwrap();

        let mut rx = svc.subscribe();
        svc.deposit(buyer, Decimal::new(100, 0), "dep-1").unwrap();
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn failed_operation_publishes_nothing() {
        let svc = LedgerService::default();
        let mut rx = svc.subscribe();

        let err = svc
            .request_withdrawal(AccountId::new(), Decimal::new(10, 0))
            .unwrap_err();
        assert!(matches!(
            err,
            lotledger_types::LedgerError::InvalidWithdrawal { .. }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn clones_share_state() {
        let svc = LedgerService::default();
        let clone = svc.clone();
        let buyer = AccountId::new();

        svc.deposit(buyer, Decimal::new(25, 0), "dep-1").unwrap();
        assert_eq!(clone.balance(buyer), Decimal::new(25, 0));
    }

    #[test]
    fn bid_changes_fan_out_to_all_subscribers() {
        let svc = LedgerService::default();
        let buyer = AccountId::new();
        let listing = ListingId::new();
        svc.deposit(buyer, Decimal::new(100, 0), "dep-1").unwrap();
        svc.open_listing(listing, AccountId::new());

        let mut rx1 = svc.subscribe();
        let mut rx2 = svc.subscribe();
        svc.place_bid(listing, buyer, Decimal::new(40, 0)).unwrap();

        assert!(rx1.try_recv().is_ok());
        assert!(rx2.try_recv().is_ok());
    }
}
