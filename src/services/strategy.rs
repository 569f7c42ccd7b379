//! Strategy service: load a plan, apply one planner operation, store it,
//! and notify subscribers.
//!
//! DESIGN
//! ======
//! `marketing_strategies` rows map onto `planner::StrategyPlan`; the cart and
//! flyer slots live in JSONB columns. Every mutation follows the same shape:
//! load -> mutate in memory (validated by the planner) -> write back ->
//! `strategy:changed`. Unchanged plans are neither written nor announced.
//!
//! Creating and deleting strategies is admin CRUD and lives elsewhere.

use chrono::NaiveDate;
use planner::{
    BudgetBreakdown, BudgetInputs, ChannelType, ContentFormat, Deliverable, DeliverableCart, FlyerTimeSlot,
    StrategyPlan, StrategyStatus,
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use sqlx::types::Json;
use tracing::info;
use uuid::Uuid;

use crate::services::realtime;
use crate::state::AppState;

// =============================================================================
// TYPES
// =============================================================================

#[derive(Debug, thiserror::Error)]
pub enum StrategyError {
    #[error("strategy not found: {0}")]
    NotFound(Uuid),
    #[error(transparent)]
    Plan(#[from] planner::PlanError),
    #[error("stored strategy {0} is corrupt: {1}")]
    Corrupt(Uuid, String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl crate::frame::ErrorCode for StrategyError {
    fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "E_STRATEGY_NOT_FOUND",
            Self::Plan(planner::PlanError::Cart(planner::CartError::UnknownItem(_))) => "E_DELIVERABLE_NOT_FOUND",
            Self::Plan(_) => "E_STRATEGY_INVALID",
            Self::Corrupt(..) => "E_STRATEGY_CORRUPT",
            Self::Database(_) => "E_DATABASE",
        }
    }

    fn retryable(&self) -> bool {
        matches!(self, Self::Database(_))
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StrategyRow {
    pub id: Uuid,
    pub company_id: Option<Uuid>,
    pub title: String,
    pub description: Option<String>,
    pub channel: String,
    pub status: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub budget: f64,
    pub agency_fee_percent: f64,
    pub tax_percent: f64,
    pub media_budget: f64,
    pub deliverables: Json<DeliverableCart>,
    pub flyer_slots: Json<Vec<FlyerTimeSlot>>,
}

const STRATEGY_COLUMNS: &str = "id, company_id, title, description, channel, status, start_date, end_date,
    budget, agency_fee_percent, tax_percent, media_budget, deliverables, flyer_slots";

impl StrategyRow {
    /// # Errors
    ///
    /// Returns `Corrupt` for channel or status text the planner does not know.
    pub fn into_plan(self) -> Result<StrategyPlan, StrategyError> {
        let channel = ChannelType::parse(&self.channel)
            .ok_or_else(|| StrategyError::Corrupt(self.id, format!("unknown channel {:?}", self.channel)))?;
        let status = StrategyStatus::parse(&self.status)
            .ok_or_else(|| StrategyError::Corrupt(self.id, format!("unknown status {:?}", self.status)))?;
        Ok(StrategyPlan {
            id: self.id,
            company_id: self.company_id,
            title: self.title,
            description: self.description,
            channel,
            status,
            start_date: self.start_date,
            end_date: self.end_date,
            budget: self.budget,
            agency_fee_percent: self.agency_fee_percent,
            tax_percent: self.tax_percent,
            media_budget: self.media_budget,
            deliverables: self.deliverables.0,
            flyer_slots: self.flyer_slots.0,
        })
    }
}

/// API shape: the plan plus its derived budget breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct StrategyView {
    #[serde(flatten)]
    pub plan: StrategyPlan,
    pub breakdown: BudgetBreakdown,
    pub cart_total: f64,
}

impl From<StrategyPlan> for StrategyView {
    fn from(plan: StrategyPlan) -> Self {
        Self { breakdown: plan.breakdown(), cart_total: plan.deliverables.total(), plan }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, sqlx::FromRow)]
pub struct CompanyRow {
    pub id: Uuid,
    pub name: String,
}

fn default_quantity() -> u32 {
    1
}

/// Cart line as submitted by the planner UI.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDeliverable {
    pub creator_id: Uuid,
    pub creator_name: String,
    pub format: ContentFormat,
    pub unit_price: f64,
    #[serde(default = "default_quantity")]
    pub quantity: u32,
}

impl From<NewDeliverable> for Deliverable {
    fn from(input: NewDeliverable) -> Self {
        Deliverable::new(input.creator_id, input.creator_name, input.format, input.unit_price, input.quantity)
    }
}

// =============================================================================
// QUERIES
// =============================================================================

/// # Errors
///
/// Returns a database error if the query fails.
pub async fn list_companies(pool: &PgPool) -> Result<Vec<CompanyRow>, StrategyError> {
    let rows = sqlx::query_as::<_, CompanyRow>("SELECT id, name FROM companies ORDER BY name")
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// List strategies, optionally for one company, by start date.
///
/// # Errors
///
/// Returns a database error, or `Corrupt` if a row does not map to a plan.
pub async fn list_strategies(pool: &PgPool, company_id: Option<Uuid>) -> Result<Vec<StrategyPlan>, StrategyError> {
    let sql = format!(
        "SELECT {STRATEGY_COLUMNS} FROM marketing_strategies
         WHERE ($1::uuid IS NULL OR company_id = $1)
         ORDER BY start_date, title"
    );
    let rows = sqlx::query_as::<_, StrategyRow>(&sql).bind(company_id).fetch_all(pool).await?;
    rows.into_iter().map(StrategyRow::into_plan).collect()
}

/// # Errors
///
/// Returns `NotFound` if no strategy has this id.
pub async fn get_strategy(pool: &PgPool, id: Uuid) -> Result<StrategyPlan, StrategyError> {
    let sql = format!("SELECT {STRATEGY_COLUMNS} FROM marketing_strategies WHERE id = $1");
    sqlx::query_as::<_, StrategyRow>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?
        .ok_or(StrategyError::NotFound(id))?
        .into_plan()
}

/// Write the mutable parts of a plan back.
///
/// # Errors
///
/// Returns `NotFound` if no row was updated.
pub async fn store_strategy(pool: &PgPool, plan: &StrategyPlan) -> Result<(), StrategyError> {
    let result = sqlx::query(
        "UPDATE marketing_strategies
         SET budget = $2, agency_fee_percent = $3, tax_percent = $4, media_budget = $5,
             deliverables = $6, flyer_slots = $7, updated_at = now()
         WHERE id = $1",
    )
    .bind(plan.id)
    .bind(plan.budget)
    .bind(plan.agency_fee_percent)
    .bind(plan.tax_percent)
    .bind(plan.media_budget)
    .bind(Json(&plan.deliverables))
    .bind(Json(&plan.flyer_slots))
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Err(StrategyError::NotFound(plan.id));
    }
    Ok(())
}

// =============================================================================
// MUTATIONS
// =============================================================================

/// Load, mutate, and (if changed) store + notify.
async fn mutate<T>(
    state: &AppState,
    id: Uuid,
    op: impl FnOnce(&mut StrategyPlan) -> Result<T, planner::PlanError>,
) -> Result<(StrategyPlan, T), StrategyError> {
    let before = get_strategy(&state.pool, id).await?;
    let mut plan = before.clone();
    let out = op(&mut plan)?;
    if plan != before {
        store_strategy(&state.pool, &plan).await?;
        let notified = realtime::notify_strategy_changed(state, id).await;
        info!(strategy_id = %id, budget = plan.budget, media_budget = plan.media_budget, notified, "strategy updated");
    }
    Ok((plan, out))
}

/// Replace budget, agency fee %, and tax %, recomputing the media budget.
///
/// # Errors
///
/// Returns `Plan` for out-of-range inputs (nothing is written).
pub async fn update_budget(state: &AppState, id: Uuid, inputs: BudgetInputs) -> Result<StrategyPlan, StrategyError> {
    let (plan, _) = mutate(state, id, |plan| plan.set_budget_inputs(inputs)).await?;
    Ok(plan)
}

/// Add a cart line and sync the budget from the cart.
///
/// # Errors
///
/// Returns `Plan` for an invalid line.
pub async fn add_deliverable(
    state: &AppState,
    id: Uuid,
    input: NewDeliverable,
) -> Result<(StrategyPlan, Uuid), StrategyError> {
    mutate(state, id, |plan| plan.add_deliverable(input.into())).await
}

/// # Errors
///
/// Returns `Plan` if the line is not in the cart.
pub async fn remove_deliverable(state: &AppState, id: Uuid, item_id: Uuid) -> Result<StrategyPlan, StrategyError> {
    let (plan, _) = mutate(state, id, |plan| plan.remove_deliverable(item_id)).await?;
    Ok(plan)
}

/// Set a line's quantity; zero removes it.
///
/// # Errors
///
/// Returns `Plan` if the line is not in the cart.
pub async fn set_deliverable_quantity(
    state: &AppState,
    id: Uuid,
    item_id: Uuid,
    quantity: u32,
) -> Result<StrategyPlan, StrategyError> {
    let (plan, ()) = mutate(state, id, |plan| plan.set_deliverable_quantity(item_id, quantity)).await?;
    Ok(plan)
}

/// # Errors
///
/// Returns `Plan` for a non-flyers strategy or an invalid slot.
pub async fn replace_flyer_slots(
    state: &AppState,
    id: Uuid,
    slots: Vec<FlyerTimeSlot>,
) -> Result<StrategyPlan, StrategyError> {
    let (plan, ()) = mutate(state, id, |plan| plan.replace_flyer_slots(slots)).await?;
    Ok(plan)
}

#[cfg(test)]
#[path = "strategy_test.rs"]
mod tests;
