//! Budget derivation.
//!
//! `media_budget = B - B*F/100 - B*T/100` for budget `B`, agency fee percent
//! `F`, and tax percent `T`. Recomputation goes through
//! `recompute_media_budget`, which reports "no change" when the new value is
//! within `BUDGET_EPSILON` of the stored one. Callers that write back only on
//! `Some` cannot loop on their own update.

#[cfg(test)]
#[path = "budget_test.rs"]
mod budget_test;

use serde::{Deserialize, Serialize};

/// Smallest media-budget change worth storing.
pub const BUDGET_EPSILON: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetInputs {
    pub budget: f64,
    pub agency_fee_percent: f64,
    pub tax_percent: f64,
}

/// Derived amounts shown next to the budget fields.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetBreakdown {
    pub budget: f64,
    pub agency_fee: f64,
    pub tax: f64,
    pub media_budget: f64,
}

#[must_use]
pub fn media_budget(budget: f64, agency_fee_percent: f64, tax_percent: f64) -> f64 {
    budget - budget * agency_fee_percent / 100.0 - budget * tax_percent / 100.0
}

impl BudgetInputs {
    #[must_use]
    pub fn media_budget(&self) -> f64 {
        media_budget(self.budget, self.agency_fee_percent, self.tax_percent)
    }

    #[must_use]
    pub fn breakdown(&self) -> BudgetBreakdown {
        BudgetBreakdown {
            budget: self.budget,
            agency_fee: self.budget * self.agency_fee_percent / 100.0,
            tax: self.budget * self.tax_percent / 100.0,
            media_budget: self.media_budget(),
        }
    }
}

/// New media budget, or `None` if it is within `BUDGET_EPSILON` of `current`.
#[must_use]
pub fn recompute_media_budget(current: f64, inputs: &BudgetInputs) -> Option<f64> {
    let next = inputs.media_budget();
    if (next - current).abs() < BUDGET_EPSILON {
        None
    } else {
        Some(next)
    }
}
