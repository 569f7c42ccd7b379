//! Marketing strategy planning: budget arithmetic, the deliverables cart,
//! and flyer scheduling.
//!
//! Pure domain logic. The service loads a `StrategyPlan` from storage,
//! applies one operation, validates, and writes it back.

pub mod budget;
pub mod cart;
pub mod flyer;
pub mod strategy;

pub use budget::{BUDGET_EPSILON, BudgetBreakdown, BudgetInputs, media_budget, recompute_media_budget};
pub use cart::{CartError, ContentFormat, Deliverable, DeliverableCart};
pub use flyer::FlyerTimeSlot;
pub use strategy::{ChannelType, PlanError, StrategyPlan, StrategyStatus};
