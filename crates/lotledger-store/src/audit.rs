//! Append-only audit log of administrative balance adjustments.

use lotledger_types::{AccountId, AuditEntry};

/// Ordered, append-only record of admin adjustments. Entries are never
/// mutated or removed; the insertion order is the timestamp order.
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append an entry.
    pub fn record(&mut self, entry: AuditEntry) {
        self.entries.push(entry);
    }

    /// All entries, oldest first.
    #[must_use]
    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    /// Entries targeting a specific account, oldest first.
    #[must_use]
    pub fn for_account(&self, target: AccountId) -> Vec<&AuditEntry> {
        self.entries.iter().filter(|e| e.target == target).collect()
    }

    /// Number of recorded adjustments.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}
