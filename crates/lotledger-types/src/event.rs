//! Change-feed events published after each committed transaction.
//!
//! Every execution context holding a read-cached view of balances or
//! ledger entries subscribes to the broadcast channel and, on receipt,
//! invalidates and reloads the affected key. Events are published only
//! after the underlying transaction has committed, never before.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, EntryId, EntryStatus};

/// Which piece of persisted state changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChangeKey {
    /// An account balance changed.
    Balance(AccountId),
    /// A ledger entry was written or its status moved.
    Entry(EntryId),
}

/// One committed mutation, as seen by observers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateChange {
    /// The key observers should invalidate.
    pub key: ChangeKey,
    /// The committed balance, for `Balance` keys.
    pub new_balance: Option<Decimal>,
    /// The committed status, for `Entry` keys.
    pub new_status: Option<EntryStatus>,
}

impl StateChange {
    /// A committed balance mutation.
    #[must_use]
    pub fn balance(account: AccountId, new_balance: Decimal) -> Self {
        Self {
            key: ChangeKey::Balance(account),
            new_balance: Some(new_balance),
            new_status: None,
        }
    }

    /// A committed entry write or status transition.
    #[must_use]
    pub fn entry(entry: EntryId, new_status: EntryStatus) -> Self {
        Self {
            key: ChangeKey::Entry(entry),
            new_balance: None,
            new_status: Some(new_status),
        }
    }
}
