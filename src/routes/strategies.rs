//! Strategy planner routes: companies, strategies, budget, cart, flyer slots.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use planner::{BudgetInputs, FlyerTimeSlot};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::routes::ApiError;
use crate::services::strategy::{self, CompanyRow, NewDeliverable, StrategyError, StrategyView};
use crate::state::AppState;

pub(crate) fn strategy_error_to_status(err: &StrategyError) -> StatusCode {
    match err {
        StrategyError::NotFound(_)
        | StrategyError::Plan(planner::PlanError::Cart(planner::CartError::UnknownItem(_))) => StatusCode::NOT_FOUND,
        StrategyError::Plan(_) => StatusCode::UNPROCESSABLE_ENTITY,
        StrategyError::Corrupt(..) | StrategyError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<StrategyError> for ApiError {
    fn from(err: StrategyError) -> Self {
        ApiError::new(strategy_error_to_status(&err), &err)
    }
}

#[derive(Debug, Deserialize)]
pub struct StrategyListQuery {
    pub company_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct QuantityBody {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct DeliverableAdded {
    pub item_id: Uuid,
    pub strategy: StrategyView,
}

/// `GET /api/companies`
pub async fn list_companies(State(state): State<AppState>) -> Result<Json<Vec<CompanyRow>>, ApiError> {
    Ok(Json(strategy::list_companies(&state.pool).await?))
}

/// `GET /api/strategies?company_id=`
pub async fn list_strategies(
    State(state): State<AppState>,
    Query(query): Query<StrategyListQuery>,
) -> Result<Json<Vec<StrategyView>>, ApiError> {
    let plans = strategy::list_strategies(&state.pool, query.company_id).await?;
    Ok(Json(plans.into_iter().map(StrategyView::from).collect()))
}

/// `GET /api/strategies/{id}`
pub async fn get_strategy(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<StrategyView>, ApiError> {
    Ok(Json(strategy::get_strategy(&state.pool, id).await?.into()))
}

/// `PATCH /api/strategies/{id}/budget` — replace budget, fee %, tax %.
pub async fn update_budget(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(inputs): Json<BudgetInputs>,
) -> Result<Json<StrategyView>, ApiError> {
    Ok(Json(strategy::update_budget(&state, id, inputs).await?.into()))
}

/// `POST /api/strategies/{id}/deliverables` — add a cart line.
pub async fn add_deliverable(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<NewDeliverable>,
) -> Result<(StatusCode, Json<DeliverableAdded>), ApiError> {
    let (plan, item_id) = strategy::add_deliverable(&state, id, body).await?;
    Ok((StatusCode::CREATED, Json(DeliverableAdded { item_id, strategy: plan.into() })))
}

/// `PATCH /api/strategies/{id}/deliverables/{item_id}` — set quantity.
pub async fn set_deliverable_quantity(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
    Json(body): Json<QuantityBody>,
) -> Result<Json<StrategyView>, ApiError> {
    Ok(Json(strategy::set_deliverable_quantity(&state, id, item_id, body.quantity).await?.into()))
}

/// `DELETE /api/strategies/{id}/deliverables/{item_id}`
pub async fn remove_deliverable(
    State(state): State<AppState>,
    Path((id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<StrategyView>, ApiError> {
    Ok(Json(strategy::remove_deliverable(&state, id, item_id).await?.into()))
}

/// `PUT /api/strategies/{id}/flyer-slots` — replace all slots.
pub async fn replace_flyer_slots(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(slots): Json<Vec<FlyerTimeSlot>>,
) -> Result<Json<StrategyView>, ApiError> {
    Ok(Json(strategy::replace_flyer_slots(&state, id, slots).await?.into()))
}

#[cfg(test)]
#[path = "strategies_test.rs"]
mod tests;
