// 🧾 Ledger - Ordered dish entries for one session
// Append at the end, remove by position, positions stay contiguous

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

// ============================================================================
// DISH ENTRY
// ============================================================================

/// One purchased item and the people who share it.
///
/// Entries are never edited in place: a correction is a `remove` followed by
/// a fresh `append`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DishEntry {
    /// Display label (not required to be unique)
    pub name: String,

    /// Pre-tax, pre-tip price in the session's currency
    pub price: f64,

    /// People splitting this dish, in the order they were given
    pub participants: Vec<String>,
}

impl DishEntry {
    pub fn new(name: impl Into<String>, price: f64, participants: Vec<String>) -> Self {
        DishEntry {
            name: name.into(),
            price,
            participants,
        }
    }

    /// Number of people the dish is divided between
    pub fn split_count(&self) -> usize {
        self.participants.len()
    }

    /// An entry without participants still counts toward the subtotal,
    /// but nobody owes a share of it.
    pub fn contributes_to_shares(&self) -> bool {
        !self.participants.is_empty()
    }
}

// ============================================================================
// ERRORS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// `index` is not a current position in a ledger of `len` entries
    OutOfRange { index: usize, len: usize },
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::OutOfRange { index, len } => write!(
                f,
                "entry {} is out of range (ledger has {} entries)",
                index, len
            ),
        }
    }
}

impl std::error::Error for LedgerError {}

// ============================================================================
// LEDGER
// ============================================================================

/// Ordered sequence of dish entries, indexed `0..len` by position.
///
/// Removing index `i` shifts every later entry down by one; there are no
/// tombstones, so position is the only identity an entry has.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Ledger {
    entries: Vec<DishEntry>,
}

impl Ledger {
    pub fn new() -> Self {
        Ledger {
            entries: Vec::new(),
        }
    }

    /// Place an entry at the end. Never fails: entries are validated by the
    /// input layer before they get here.
    pub fn append(&mut self, entry: DishEntry) {
        debug!(
            position = self.entries.len(),
            dish = %entry.name,
            price = entry.price,
            participants = entry.participants.len(),
            "appending dish entry"
        );
        self.entries.push(entry);
    }

    /// Delete the entry at `index` and return it.
    pub fn remove(&mut self, index: usize) -> Result<DishEntry, LedgerError> {
        if index >= self.entries.len() {
            return Err(LedgerError::OutOfRange {
                index,
                len: self.entries.len(),
            });
        }

        let removed = self.entries.remove(index);
        debug!(position = index, dish = %removed.name, "removed dish entry");
        Ok(removed)
    }

    /// Read-only snapshot for the calculator and for display
    pub fn entries(&self) -> &[DishEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&DishEntry> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// ============================================================================
// TESTS
// ============================================================================
