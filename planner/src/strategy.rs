//! A single marketing strategy and the operations the planner applies to it.
//!
//! DESIGN
//! ======
//! `StrategyPlan` keeps the stored `media_budget` next to its inputs. Every
//! mutation that touches budget, fee, or tax goes through `recompute`, which
//! writes only when the derived value moved by at least `BUDGET_EPSILON`.
//! The deliverables cart feeds the budget one way: a positive cart total
//! overwrites `budget`; an empty cart leaves the budget alone.
//!
//! ERROR HANDLING
//! ==============
//! Field checks use `validator` derives; cross-field rules (date range,
//! flyer slots only on `flyers` strategies) are schema functions. All
//! failures surface as `PlanError`.

#[cfg(test)]
#[path = "strategy_test.rs"]
mod strategy_test;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::{Validate, ValidationError, ValidationErrors};

use crate::budget::{BudgetBreakdown, BudgetInputs, recompute_media_budget};
use crate::cart::{CartError, Deliverable, DeliverableCart};
use crate::flyer::FlyerTimeSlot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChannelType {
    Social,
    Influencers,
    Flyers,
    Events,
    PaidAds,
    Outdoor,
}

impl ChannelType {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Social => "social",
            Self::Influencers => "influencers",
            Self::Flyers => "flyers",
            Self::Events => "events",
            Self::PaidAds => "paid_ads",
            Self::Outdoor => "outdoor",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        [Self::Social, Self::Influencers, Self::Flyers, Self::Events, Self::PaidAds, Self::Outdoor]
            .into_iter()
            .find(|channel| channel.as_str() == raw)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyStatus {
    #[default]
    Draft,
    Planned,
    Active,
    Completed,
    Cancelled,
}

impl StrategyStatus {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Planned => "planned",
            Self::Active => "active",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }

    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        [Self::Draft, Self::Planned, Self::Active, Self::Completed, Self::Cancelled]
            .into_iter()
            .find(|status| status.as_str() == raw)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error("invalid strategy: {0}")]
    Invalid(#[from] ValidationErrors),
    #[error(transparent)]
    Cart(#[from] CartError),
    #[error("flyer slots require a flyers strategy, got {0}")]
    FlyerSlotsNotAllowed(&'static str),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[validate(schema(function = "check_plan"))]
pub struct StrategyPlan {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub description: Option<String>,
    pub channel: ChannelType,
    pub status: StrategyStatus,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[validate(range(min = 0.0))]
    pub budget: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub agency_fee_percent: f64,
    #[validate(range(min = 0.0, max = 100.0))]
    pub tax_percent: f64,
    pub media_budget: f64,
    #[serde(default)]
    pub deliverables: DeliverableCart,
    #[serde(default)]
    #[validate(nested)]
    pub flyer_slots: Vec<FlyerTimeSlot>,
}

fn check_plan(plan: &StrategyPlan) -> Result<(), ValidationError> {
    if plan.title.trim().is_empty() {
        return Err(ValidationError::new("title_required"));
    }
    if plan.end_date < plan.start_date {
        return Err(ValidationError::new("end_before_start"));
    }
    if ![plan.budget, plan.agency_fee_percent, plan.tax_percent].iter().all(|v| v.is_finite()) {
        return Err(ValidationError::new("not_a_number"));
    }
    if plan.channel != ChannelType::Flyers && !plan.flyer_slots.is_empty() {
        return Err(ValidationError::new("flyer_slots_require_flyers"));
    }
    Ok(())
}

impl StrategyPlan {
    /// # Errors
    ///
    /// Returns [`PlanError::Invalid`] with per-field details.
    pub fn check(&self) -> Result<(), PlanError> {
        Validate::validate(self)?;
        Ok(())
    }

    #[must_use]
    pub fn budget_inputs(&self) -> BudgetInputs {
        BudgetInputs { budget: self.budget, agency_fee_percent: self.agency_fee_percent, tax_percent: self.tax_percent }
    }

    #[must_use]
    pub fn breakdown(&self) -> BudgetBreakdown {
        self.budget_inputs().breakdown()
    }

    /// Refresh `media_budget` from its inputs. Returns true if it changed.
    pub fn recompute(&mut self) -> bool {
        match recompute_media_budget(self.media_budget, &self.budget_inputs()) {
            Some(next) => {
                self.media_budget = next;
                true
            }
            None => false,
        }
    }

    /// Replace budget, fee, and tax, then recompute.
    ///
    /// # Errors
    ///
    /// Rejects out-of-range inputs and leaves the plan unchanged.
    pub fn set_budget_inputs(&mut self, inputs: BudgetInputs) -> Result<bool, PlanError> {
        let mut next = self.clone();
        next.budget = inputs.budget;
        next.agency_fee_percent = inputs.agency_fee_percent;
        next.tax_percent = inputs.tax_percent;
        next.check()?;
        next.recompute();
        let changed = next != *self;
        *self = next;
        Ok(changed)
    }

    /// Overwrite the budget with a positive cart total, then recompute.
    /// Returns true if anything changed.
    pub fn sync_budget_from_cart(&mut self) -> bool {
        let total = self.deliverables.total();
        let mut changed = false;
        if total > 0.0 && (total - self.budget).abs() > f64::EPSILON {
            self.budget = total;
            changed = true;
        }
        self.recompute() || changed
    }

    /// # Errors
    ///
    /// Propagates cart validation errors.
    pub fn add_deliverable(&mut self, item: Deliverable) -> Result<Uuid, PlanError> {
        let id = self.deliverables.add(item)?;
        self.sync_budget_from_cart();
        Ok(id)
    }

    /// # Errors
    ///
    /// Returns [`PlanError::Cart`] if the item is not in the cart.
    pub fn remove_deliverable(&mut self, id: Uuid) -> Result<Deliverable, PlanError> {
        let removed = self.deliverables.remove(id)?;
        self.sync_budget_from_cart();
        Ok(removed)
    }

    /// # Errors
    ///
    /// Returns [`PlanError::Cart`] if the item is not in the cart.
    pub fn set_deliverable_quantity(&mut self, id: Uuid, quantity: u32) -> Result<(), PlanError> {
        self.deliverables.set_quantity(id, quantity)?;
        self.sync_budget_from_cart();
        Ok(())
    }

    /// Replace all flyer slots, sorted by date then start time.
    ///
    /// # Errors
    ///
    /// Fails on a non-flyers strategy (unless `slots` is empty) or when a
    /// slot is invalid. The plan is unchanged on error.
    pub fn replace_flyer_slots(&mut self, mut slots: Vec<FlyerTimeSlot>) -> Result<(), PlanError> {
        if self.channel != ChannelType::Flyers && !slots.is_empty() {
            return Err(PlanError::FlyerSlotsNotAllowed(self.channel.as_str()));
        }
        for slot in &slots {
            slot.validate()?;
        }
        slots.sort_by_key(|slot| (slot.date, slot.start_time));
        self.flyer_slots = slots;
        Ok(())
    }
}
