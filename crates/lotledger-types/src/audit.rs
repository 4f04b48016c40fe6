//! Audit trail types for administrative balance adjustments.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{AccountId, AuditId};

/// One administrative balance adjustment, recorded for after-the-fact
/// reconciliation. Append-only; never mutated after construction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Unique audit entry identifier.
    pub id: AuditId,
    /// The administrator who made the change.
    pub actor: AccountId,
    /// The account whose balance was adjusted.
    pub target: AccountId,
    /// Signed adjustment amount.
    pub delta: Decimal,
    /// Human-readable justification supplied by the admin.
    pub reason: String,
    /// When the adjustment was recorded.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Create a new audit entry stamped with the current time.
    #[must_use]
    pub fn new(actor: AccountId, target: AccountId, delta: Decimal, reason: String) -> Self {
        Self {
            id: AuditId::new(),
            actor,
            target,
            delta,
            reason,
            recorded_at: Utc::now(),
        }
    }
}
