//! The settlement engine: one object owning all mutable ledger state.
//!
//! Each public method is one logical transaction: the ledger entry write
//! and its balance deltas either both happen or neither does. External
//! events (deposit webhooks) pass the idempotency guard **before** any
//! money moves. Methods return the committed [`StateChange`]s so the
//! service layer can broadcast them after the transaction boundary.

use lotledger_store::{AuditLog, BalanceStore, EntryLedger, IdempotencyGuard};
use lotledger_types::{
    AccountId, AccountRole, AuditEntry, EngineConfig, EntryStatus, ExternalRef, LedgerEntry,
    LedgerError, ListingId, Result, StateChange, WithdrawalRequest,
};
use rust_decimal::Decimal;

use crate::escrow::{EscrowManager, HoldOutcome, RefundOutcome, ResolutionOutcome};
use crate::reconcile::{self, ReconciliationReport};
use crate::withdrawal::{WithdrawalDesk, WithdrawalOutcome};
use crate::{conservation, fees};

/// Result of a deposit webhook.
#[derive(Debug)]
pub struct DepositOutcome {
    /// False when the idempotency guard classified the event as a
    /// duplicate (success-no-op).
    pub applied: bool,
    /// The account's balance after the operation.
    pub new_balance: Decimal,
    /// Committed mutations, for post-commit broadcast.
    pub changes: Vec<StateChange>,
}

/// Result of an admin adjustment.
#[derive(Debug)]
pub struct AdjustOutcome {
    /// The target's balance after the adjustment.
    pub new_balance: Decimal,
    /// Committed mutations, for post-commit broadcast.
    pub changes: Vec<StateChange>,
}

/// Core settlement engine: balance store, ledger, idempotency guard,
/// audit log, escrow manager, and withdrawal desk behind one `&mut self`
/// surface.
pub struct SettlementEngine {
    balances: BalanceStore,
    ledger: EntryLedger,
    guard: IdempotencyGuard,
    audit: AuditLog,
    escrow: EscrowManager,
    withdrawals: WithdrawalDesk,
    platform: AccountId,
}

impl SettlementEngine {
    /// Create a new engine. The platform fee account is opened
    /// immediately so fee credits always have a destination.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        let platform = AccountId::new();
        let mut balances = BalanceStore::new();
        balances.open(platform, AccountRole::Platform);
        Self {
            balances,
            ledger: EntryLedger::new(),
            guard: IdempotencyGuard::new(&config.idempotency),
            audit: AuditLog::new(),
            escrow: EscrowManager::new(platform, config.fees),
            withdrawals: WithdrawalDesk::new(),
            platform,
        }
    }

    /// The platform fee account.
    #[must_use]
    pub fn platform_account(&self) -> AccountId {
        self.platform
    }

    // =====================================================================
    // External events
    // =====================================================================

    /// Credit a confirmed deposit. The payment provider delivers
    /// webhooks at-least-once; a repeated `external_ref` within the TTL
    /// window is a success-no-op that moves no money.
    ///
    /// # Errors
    /// Returns [`LedgerError::NegativeAmount`] for a non-positive amount.
    pub fn deposit(
        &mut self,
        account: AccountId,
        amount: Decimal,
        external_ref: &str,
    ) -> Result<DepositOutcome> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::NegativeAmount(amount));
        }

        // Idempotency gate before any mutation.
        if !self.guard.should_process(external_ref) {
            tracing::warn!(%account, external_ref, "duplicate deposit webhook, no-op");
            return Ok(DepositOutcome {
                applied: false,
                new_balance: self.balances.balance(account),
                changes: Vec::new(),
            });
        }

        let new_balance = self
            .balances
            .credit(account, AccountRole::Buyer, amount);
        let entry = LedgerEntry::deposit(account, amount, external_ref.to_string());
        let entry_id = entry.id;
        self.ledger.insert(entry);

        tracing::info!(%account, %amount, external_ref, "deposit credited");
        Ok(DepositOutcome {
            applied: true,
            new_balance,
            changes: vec![
                StateChange::balance(account, new_balance),
                StateChange::entry(entry_id, EntryStatus::Completed),
            ],
        })
    }

    // =====================================================================
    // Escrow lifecycle
    // =====================================================================

    /// Register a listing's seller so resolution can attribute proceeds.
    pub fn open_listing(&mut self, listing: ListingId, seller: AccountId) {
        self.escrow.open_listing(listing, seller);
    }

    /// Place a bid's escrow hold. See [`EscrowManager::place_hold`].
    pub fn place_bid(
        &mut self,
        listing: ListingId,
        bidder: AccountId,
        amount: Decimal,
    ) -> Result<HoldOutcome> {
        self.escrow
            .place_hold(&mut self.balances, &mut self.ledger, listing, bidder, amount)
    }

    /// Refund an outbid bidder's hold. See [`EscrowManager::refund_hold`].
    pub fn refund_outbid(&mut self, listing: ListingId, bidder: AccountId) -> Result<RefundOutcome> {
        self.escrow
            .refund_hold(&mut self.balances, &mut self.ledger, listing, bidder)
    }

    /// Resolve an auction. See [`EscrowManager::resolve_auction`].
    pub fn resolve_auction(
        &mut self,
        listing: ListingId,
        winner: Option<AccountId>,
    ) -> Result<ResolutionOutcome> {
        self.escrow
            .resolve_auction(&mut self.balances, &mut self.ledger, listing, winner)
    }

    // =====================================================================
    // Withdrawals
    // =====================================================================

    /// Execute a seller withdrawal. See [`WithdrawalDesk::execute`].
    pub fn request_withdrawal(
        &mut self,
        seller: AccountId,
        amount: Decimal,
    ) -> Result<WithdrawalOutcome> {
        self.withdrawals
            .execute(&mut self.balances, &mut self.ledger, seller, amount)
    }

    // =====================================================================
    // Admin
    // =====================================================================

    /// Apply a manual balance correction. Always writes both an
    /// `AdminAdjustment` ledger entry and an audit entry.
    ///
    /// # Errors
    /// Returns [`LedgerError::InsufficientFunds`] if a negative delta
    /// would take the balance below zero; nothing is recorded then.
    pub fn adjust_balance(
        &mut self,
        account: AccountId,
        delta: Decimal,
        reason: &str,
        acting_admin: AccountId,
    ) -> Result<AdjustOutcome> {
        let role = self.balances.role(account).unwrap_or(AccountRole::Buyer);
        let new_balance = if delta.is_sign_negative() {
            self.balances.debit(account, -delta)?
        } else {
            self.balances.credit(account, role, delta)
        };

        let entry = LedgerEntry::admin_adjustment(account, delta);
        let entry_id = entry.id;
        self.ledger.insert(entry);
        self.audit
            .record(AuditEntry::new(acting_admin, account, delta, reason.to_string()));

        tracing::info!(%account, %delta, %acting_admin, reason, "admin balance adjustment");
        Ok(AdjustOutcome {
            new_balance,
            changes: vec![
                StateChange::balance(account, new_balance),
                StateChange::entry(entry_id, EntryStatus::Completed),
            ],
        })
    }

    // =====================================================================
    // Read-only queries
    // =====================================================================

    /// Current balance for an account.
    #[must_use]
    pub fn balance(&self, account: AccountId) -> Decimal {
        self.balances.balance(account)
    }

    /// All ledger entries touching an account, oldest first.
    #[must_use]
    pub fn ledger_entries(&self, account: AccountId) -> Vec<LedgerEntry> {
        self.ledger
            .entries_for_account(account)
            .into_iter()
            .cloned()
            .collect()
    }

    /// All audit entries, oldest first.
    #[must_use]
    pub fn audit_entries(&self) -> Vec<AuditEntry> {
        self.audit.entries().to_vec()
    }

    /// Completed withdrawal requests, oldest first.
    #[must_use]
    pub fn withdrawals(&self) -> Vec<WithdrawalRequest> {
        self.withdrawals.completed().to_vec()
    }

    /// The seller tier a settlement would apply right now.
    #[must_use]
    pub fn seller_tier(&self, seller: AccountId) -> lotledger_types::SellerTier {
        fees::seller_tier(&self.ledger, seller, self.escrow.fee_schedule())
    }

    /// Verify the conservation invariant over the whole system.
    ///
    /// # Errors
    /// Returns [`LedgerError::ConservationViolation`] if money was
    /// created or destroyed.
    pub fn verify_conservation(&self) -> Result<()> {
        conservation::verify(&self.balances, &self.ledger)
    }

    /// Sweep for holds left pending on closed listings.
    #[must_use]
    pub fn reconcile(&self, closed_listings: &[ListingId]) -> ReconciliationReport {
        reconcile::sweep(&self.ledger, closed_listings)
    }
}
