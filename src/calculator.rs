// 🧮 Share Calculator - Subtotal, tax, tip and per-person shares
// Pure function of (entries, tax %, tip %); recomputed from scratch every time
//
// Two paths are computed separately:
// - Aggregate: tax on the subtotal, tip on the taxed subtotal
// - Per person: each dish inflated by (1 + tax) * (1 + tip), split evenly
// Both equal subtotal * (1 + tax) * (1 + tip) on paper, but dishes without
// participants are billed and never shared, and rounding differs.
// `BillSummary::discrepancy` reports the gap.

use crate::input::{ValidationError, ValidationResult};
use crate::ledger::DishEntry;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

// ============================================================================
// RATES
// ============================================================================

/// Tax and tip percentages, supplied fresh on every computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rates {
    pub tax_percent: f64,
    pub tip_percent: f64,
}

impl Rates {
    /// Both rates must be finite and non-negative.
    pub fn new(tax_percent: f64, tip_percent: f64) -> ValidationResult<Self> {
        let mut errors = Vec::new();

        for (field, value) in [("tax_percent", tax_percent), ("tip_percent", tip_percent)] {
            if !value.is_finite() {
                errors.push(ValidationError::new(field, "Must be a number"));
            } else if value < 0.0 {
                errors.push(ValidationError::new(
                    field,
                    format!("Must not be negative, got {}", value),
                ));
            }
        }

        if errors.is_empty() {
            Ok(Rates {
                tax_percent,
                tip_percent,
            })
        } else {
            Err(errors)
        }
    }

    pub fn zero() -> Self {
        Rates {
            tax_percent: 0.0,
            tip_percent: 0.0,
        }
    }

    fn tax_fraction(&self) -> f64 {
        self.tax_percent / 100.0
    }

    fn tip_fraction(&self) -> f64 {
        self.tip_percent / 100.0
    }
}

impl Default for Rates {
    fn default() -> Self {
        Self::zero()
    }
}

// ============================================================================
// BILL SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BillSummary {
    /// Sum of raw entry prices
    pub subtotal: f64,

    /// tax % of the subtotal
    pub tax_amount: f64,

    /// tip % of the taxed subtotal
    pub tip_amount: f64,

    /// subtotal + tax + tip (aggregate path)
    pub grand_total: f64,

    /// Amount owed per person, in order of first appearance
    pub shares: IndexMap<String, f64>,
}

impl BillSummary {
    pub fn taxed_subtotal(&self) -> f64 {
        self.subtotal + self.tax_amount
    }

    /// Sum of every per-person share (per-dish path)
    pub fn shares_total(&self) -> f64 {
        self.shares.values().sum()
    }

    pub fn share_of(&self, name: &str) -> Option<f64> {
        self.shares.get(name).copied()
    }

    /// `grand_total - shares_total()`. Non-zero when a dish has no
    /// participants, plus floating-point noise.
    pub fn discrepancy(&self) -> f64 {
        self.grand_total - self.shares_total()
    }
}

// ============================================================================
// SHARE CALCULATOR
// ============================================================================

pub struct ShareCalculator;

impl ShareCalculator {
    /// Compute totals and shares for a ledger snapshot.
    ///
    /// Rates are expected to be non-negative; see [`Rates::new`].
    pub fn compute(entries: &[DishEntry], tax_percent: f64, tip_percent: f64) -> BillSummary {
        Self::compute_with(
            entries,
            &Rates {
                tax_percent,
                tip_percent,
            },
        )
    }

    pub fn compute_with(entries: &[DishEntry], rates: &Rates) -> BillSummary {
        let subtotal: f64 = entries.iter().map(|e| e.price).sum();
        let tax_amount = rates.tax_fraction() * subtotal;
        let taxed_subtotal = subtotal + tax_amount;
        let tip_amount = rates.tip_fraction() * taxed_subtotal;
        let grand_total = subtotal + tax_amount + tip_amount;

        let shares = Self::per_person_shares(entries, rates);

        debug!(
            entries = entries.len(),
            subtotal,
            tax_amount,
            tip_amount,
            grand_total,
            people = shares.len(),
            "computed bill summary"
        );

        BillSummary {
            subtotal,
            tax_amount,
            tip_amount,
            grand_total,
            shares,
        }
    }

    fn per_person_shares(entries: &[DishEntry], rates: &Rates) -> IndexMap<String, f64> {
        let mut shares: IndexMap<String, f64> = IndexMap::new();

        for (position, entry) in entries.iter().enumerate() {
            if !entry.contributes_to_shares() {
                trace!(position, dish = %entry.name, "no participants, skipping share split");
                continue;
            }

            let adjusted_price =
                entry.price * (1.0 + rates.tax_fraction()) * (1.0 + rates.tip_fraction());
            let per_person = adjusted_price / entry.split_count() as f64;

            for name in &entry.participants {
                *shares.entry(name.clone()).or_insert(0.0) += per_person;
            }
        }

        shares
    }
}

// ============================================================================
// TESTS
// ============================================================================
