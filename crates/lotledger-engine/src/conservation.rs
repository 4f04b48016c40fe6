//! Conservation invariant checker.
//!
//! Mathematical invariant enforced across the whole ledger:
//! ```text
//! Σ balances + Σ pending hold gross
//!     == Σ deposits − Σ withdrawals + Σ admin adjustments
//! ```
//!
//! Settlement only moves money between accounts (or parks it in a hold);
//! deposits, withdrawals, and admin adjustments are the only ways money
//! enters or leaves. If this invariant ever breaks, something has gone
//! catastrophically wrong and the violation is surfaced, never repaired
//! silently.

use lotledger_store::{BalanceStore, EntryLedger};
use lotledger_types::{LedgerError, Result};
use rust_decimal::Decimal;

/// The money the system should be holding, derived from boundary flows.
#[must_use]
pub fn expected_total(ledger: &EntryLedger) -> Decimal {
    ledger.deposited_total() - ledger.withdrawn_total() + ledger.adjustment_total()
}

/// The money the system is actually holding: balances plus funds parked
/// in unresolved holds.
#[must_use]
pub fn actual_total(balances: &BalanceStore, ledger: &EntryLedger) -> Decimal {
    balances.total_held() + ledger.outstanding_hold_total()
}

/// Verify the conservation invariant.
///
/// # Errors
/// Returns [`LedgerError::ConservationViolation`] if actual ≠ expected.
pub fn verify(balances: &BalanceStore, ledger: &EntryLedger) -> Result<()> {
    let expected = expected_total(ledger);
    let actual = actual_total(balances, ledger);
    if actual != expected {
        let reason = format!(
            "actual {actual} != expected {expected} \
             (balances={}, outstanding_holds={}, deposits={}, withdrawals={}, adjustments={})",
            balances.total_held(),
            ledger.outstanding_hold_total(),
            ledger.deposited_total(),
            ledger.withdrawn_total(),
            ledger.adjustment_total(),
        );
        tracing::error!(%reason, "conservation invariant violated");
        return Err(LedgerError::ConservationViolation { reason });
    }
    Ok(())
}
