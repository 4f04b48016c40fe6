//! Withdrawal processing.
//!
//! A withdrawal debits the seller's balance exactly once and records a
//! completed `Withdrawal` ledger entry; the actual payout is handed off
//! to an external collaborator. Withdrawals are not reversible through
//! this engine; reversal requires an admin adjustment.

use lotledger_store::{BalanceStore, EntryLedger};
use lotledger_types::{
    AccountId, EntryStatus, LedgerEntry, LedgerError, Result, StateChange, WithdrawalRequest,
};
use rust_decimal::Decimal;

/// Result of a completed withdrawal.
#[derive(Debug)]
pub struct WithdrawalOutcome {
    /// The completed request, for the payout handoff.
    pub request: WithdrawalRequest,
    /// The seller's balance after the debit.
    pub new_balance: Decimal,
    /// Committed mutations, for post-commit broadcast.
    pub changes: Vec<StateChange>,
}

/// Validates and executes withdrawal requests, keeping the history of
/// completed ones.
pub struct WithdrawalDesk {
    completed: Vec<WithdrawalRequest>,
}

impl WithdrawalDesk {
    /// Create an empty desk.
    #[must_use]
    pub fn new() -> Self {
        Self {
            completed: Vec::new(),
        }
    }

    /// Execute a withdrawal: validate the amount against the live
    /// balance, debit once, and write the ledger entry.
    ///
    /// # Errors
    /// Returns [`LedgerError::InvalidWithdrawal`] for a non-positive
    /// amount or one exceeding the seller's balance; state is untouched
    /// on failure.
    pub fn execute(
        &mut self,
        balances: &mut BalanceStore,
        ledger: &mut EntryLedger,
        seller: AccountId,
        amount: Decimal,
    ) -> Result<WithdrawalOutcome> {
        if amount <= Decimal::ZERO {
            return Err(LedgerError::InvalidWithdrawal {
                reason: format!("amount must be positive, got {amount}"),
            });
        }
        let available = balances.balance(seller);
        if amount > available {
            return Err(LedgerError::InvalidWithdrawal {
                reason: format!("amount {amount} exceeds balance {available}"),
            });
        }

        let mut request = WithdrawalRequest::new(seller, amount);
        let new_balance = balances.debit(seller, amount)?;
        let entry = LedgerEntry::withdrawal(seller, amount);
        let entry_id = entry.id;
        ledger.insert(entry);
        request.complete();

        tracing::info!(%seller, %amount, %new_balance, "withdrawal executed");
        self.completed.push(request.clone());

        Ok(WithdrawalOutcome {
            request,
            new_balance,
            changes: vec![
                StateChange::balance(seller, new_balance),
                StateChange::entry(entry_id, EntryStatus::Completed),
            ],
        })
    }

    /// All completed requests, oldest first.
    #[must_use]
    pub fn completed(&self) -> &[WithdrawalRequest] {
        &self.completed
    }
}

impl Default for WithdrawalDesk {
    fn default() -> Self {
        Self::new()
    }
}
