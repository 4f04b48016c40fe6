//! Balance store: the source of truth for spendable balances.
//!
//! One row per account, keyed by [`AccountId`]. All mutations are atomic:
//! either the full operation succeeds or the balance is unchanged. Debits
//! that would take a balance below zero fail with `InsufficientFunds`
//! before any state changes.

use std::collections::HashMap;

use lotledger_types::{AccountBalance, AccountId, AccountRole, LedgerError, Result};
use rust_decimal::Decimal;

/// Persistent map of account id → current balance for buyers, sellers,
/// and the platform account. Accounts are created on first credit and
/// never deleted, only zeroed.
pub struct BalanceStore {
    balances: HashMap<AccountId, AccountBalance>,
}

impl BalanceStore {
    /// Create a new empty balance store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    /// Idempotently open an account with the given role. A no-op if the
    /// account already exists (the original role wins).
    pub fn open(&mut self, account: AccountId, role: AccountRole) {
        self.balances
            .entry(account)
            .or_insert_with(|| AccountBalance::zero(role));
    }

    /// Current balance for an account. Zero for accounts never opened.
    #[must_use]
    pub fn balance(&self, account: AccountId) -> Decimal {
        self.balances
            .get(&account)
            .map_or(Decimal::ZERO, |b| b.amount)
    }

    /// The role an account was opened with, if it exists.
    #[must_use]
    pub fn role(&self, account: AccountId) -> Option<AccountRole> {
        self.balances.get(&account).map(|b| b.role)
    }

    /// Credit an account, opening it with `role` on first contact.
    /// Returns the new balance.
    pub fn credit(&mut self, account: AccountId, role: AccountRole, amount: Decimal) -> Decimal {
        let entry = self
            .balances
            .entry(account)
            .or_insert_with(|| AccountBalance::zero(role));
        entry.amount += amount;
        entry.amount
    }

    /// Debit an account. Fails if the result would go negative, leaving
    /// the balance unchanged. Returns the new balance on success.
    ///
    /// # Errors
    /// Returns [`LedgerError::InsufficientFunds`] if `amount` exceeds the
    /// current balance.
    pub fn debit(&mut self, account: AccountId, amount: Decimal) -> Result<Decimal> {
        let entry =
            self.balances
                .get_mut(&account)
                .ok_or(LedgerError::InsufficientFunds {
                    needed: amount,
                    available: Decimal::ZERO,
                })?;

        if entry.amount < amount {
            return Err(LedgerError::InsufficientFunds {
                needed: amount,
                available: entry.amount,
            });
        }

        entry.amount -= amount;
        Ok(entry.amount)
    }

    /// Sum of all balances across every account, for the conservation
    /// check.
    #[must_use]
    pub fn total_held(&self) -> Decimal {
        self.balances.values().map(|b| b.amount).sum()
    }

    /// Number of accounts ever opened.
    #[must_use]
    pub fn len(&self) -> usize {
        self.balances.len()
    }

    /// Whether no account has been opened yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.balances.is_empty()
    }
}

impl Default for BalanceStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_account_is_zero() {
        let store = BalanceStore::new();
        assert_eq!(store.balance(AccountId::new()), Decimal::ZERO);
        assert!(store.is_empty());
    }

    #[test]
    fn credit_opens_account() {
        let mut store = BalanceStore::new();
        let acct = AccountId::new();
        let new = store.credit(acct, AccountRole::Buyer, Decimal::new(1000, 0));
        assert_eq!(new, Decimal::new(1000, 0));
        assert_eq!(store.balance(acct), Decimal::new(1000, 0));
        assert_eq!(store.role(acct), Some(AccountRole::Buyer));
    }

    #[test]
    fn debit_reduces_balance() {
        let mut store = BalanceStore::new();
        let acct = AccountId::new();
        store.credit(acct, AccountRole::Buyer, Decimal::new(1000, 0));
        let new = store.debit(acct, Decimal::new(400, 0)).unwrap();
        assert_eq!(new, Decimal::new(600, 0));
    }

    #[test]
    fn over_debit_fails_and_preserves_balance() {
        let mut store = BalanceStore::new();
        let acct = AccountId::new();
        store.credit(acct, AccountRole::Buyer, Decimal::new(150, 0));
        let err = store.debit(acct, Decimal::new(200, 0)).unwrap_err();
        assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
        // Balance unchanged
        assert_eq!(store.balance(acct), Decimal::new(150, 0));
    }

    #[test]
    fn debit_unknown_account_fails() {
        let mut store = BalanceStore::new();
        let err = store.debit(AccountId::new(), Decimal::ONE).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::InsufficientFunds { available, .. } if available == Decimal::ZERO
        ));
    }

    #[test]
    fn debit_to_exactly_zero_succeeds() {
        let mut store = BalanceStore::new();
        let acct = AccountId::new();
        store.credit(acct, AccountRole::Seller, Decimal::new(50, 0));
        let new = store.debit(acct, Decimal::new(50, 0)).unwrap();
        assert_eq!(new, Decimal::ZERO);
        // Account still exists, zeroed
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn open_is_idempotent() {
        let mut store = BalanceStore::new();
        let acct = AccountId::new();
        store.open(acct, AccountRole::Seller);
        store.credit(acct, AccountRole::Seller, Decimal::new(25, 0));
        store.open(acct, AccountRole::Buyer);
        // Original role and balance survive
        assert_eq!(store.role(acct), Some(AccountRole::Seller));
        assert_eq!(store.balance(acct), Decimal::new(25, 0));
    }

    #[test]
    fn total_held_sums_all_accounts() {
        let mut store = BalanceStore::new();
        store.credit(AccountId::new(), AccountRole::Buyer, Decimal::new(100, 0));
        store.credit(AccountId::new(), AccountRole::Seller, Decimal::new(250, 0));
        assert_eq!(store.total_held(), Decimal::new(350, 0));
    }
}
