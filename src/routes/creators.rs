//! Creator roster, duplicate check, and landing theme routes.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::Json;
use landing::{CreatorProfile, Theme, ThemeAction, ordered_sections};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

use crate::routes::ApiError;
use crate::services::creator::{self, ApprovalStatus, CreatorError, CreatorSummary, DuplicateCandidate, NewCreator};
use crate::services::theme::{self, ThemeError};
use crate::state::AppState;

// =============================================================================
// ERROR MAPPING
// =============================================================================

pub(crate) fn creator_error_to_status(err: &CreatorError) -> StatusCode {
    match err {
        CreatorError::NotFound(_) => StatusCode::NOT_FOUND,
        CreatorError::SlugTaken(_) => StatusCode::CONFLICT,
        CreatorError::Invalid(_) => StatusCode::UNPROCESSABLE_ENTITY,
        CreatorError::InvalidStatus(_) => StatusCode::BAD_REQUEST,
        CreatorError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub(crate) fn theme_error_to_status(err: &ThemeError) -> StatusCode {
    match err {
        ThemeError::NotFound(_) => StatusCode::NOT_FOUND,
        ThemeError::Action(_) => StatusCode::UNPROCESSABLE_ENTITY,
        ThemeError::Encode(_) | ThemeError::Database(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl From<CreatorError> for ApiError {
    fn from(err: CreatorError) -> Self {
        ApiError::new(creator_error_to_status(&err), &err)
    }
}

impl From<ThemeError> for ApiError {
    fn from(err: ThemeError) -> Self {
        ApiError::new(theme_error_to_status(&err), &err)
    }
}

// =============================================================================
// BODIES
// =============================================================================

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct DuplicatesQuery {
    pub instagram_url: String,
    pub exclude_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct CreatorDetail {
    pub id: Uuid,
    pub approval_status: String,
    pub profile: CreatorProfile,
    pub theme: Theme,
}

#[derive(Debug, Serialize)]
pub struct CreatedCreator {
    pub creator: CreatorSummary,
    /// Possible duplicates by Instagram handle. A warning, never a rejection.
    pub duplicates: Vec<DuplicateCandidate>,
}

#[derive(Debug, Serialize)]
pub struct DuplicatesResponse {
    pub handle: Option<String>,
    pub duplicates: Vec<DuplicateCandidate>,
}

pub(crate) fn parse_status(raw: Option<&str>) -> Result<Option<ApprovalStatus>, CreatorError> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => ApprovalStatus::parse(s).map(Some).ok_or_else(|| CreatorError::InvalidStatus(s.to_string())),
    }
}

// =============================================================================
// HANDLERS
// =============================================================================

/// `GET /api/creators` — roster, optionally filtered by `?status=`.
pub async fn list_creators(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CreatorSummary>>, ApiError> {
    let status = parse_status(query.status.as_deref())?;
    let rows = creator::list_creators(&state.pool, status).await?;
    Ok(Json(rows.iter().map(creator::CreatorRow::summary).collect()))
}

/// `GET /api/creators/{id}` — public profile plus resolved theme.
pub async fn get_creator(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<CreatorDetail>, ApiError> {
    let row = creator::get_creator(&state.pool, id).await?;
    let theme = landing::parse_stored_theme(row.landing_theme.as_ref());
    Ok(Json(CreatorDetail { id: row.id, approval_status: row.approval_status.clone(), profile: row.profile(), theme }))
}

/// `POST /api/creators` — signup. Starts in `pending`.
pub async fn create_creator(
    State(state): State<AppState>,
    Json(body): Json<NewCreator>,
) -> Result<(StatusCode, Json<CreatedCreator>), ApiError> {
    let (row, duplicates) = creator::create_creator(&state.pool, body).await?;
    Ok((StatusCode::CREATED, Json(CreatedCreator { creator: row.summary(), duplicates })))
}

/// `GET /api/creators/duplicates?instagram_url=&exclude_id=`
pub async fn check_duplicates(
    State(state): State<AppState>,
    Query(query): Query<DuplicatesQuery>,
) -> Result<Json<DuplicatesResponse>, ApiError> {
    if query.instagram_url.trim().is_empty() {
        return Err(ApiError::bad_request("E_CREATOR_INVALID", "instagram_url is required"));
    }
    let duplicates = creator::check_duplicates(&state.pool, &query.instagram_url, query.exclude_id).await?;
    Ok(Json(DuplicatesResponse { handle: creator::instagram_handle(&query.instagram_url), duplicates }))
}

/// `GET /api/creators/{id}/theme`
pub async fn get_theme(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Theme>, ApiError> {
    Ok(Json(theme::load_theme(&state.pool, id).await?))
}

/// `PUT /api/creators/{id}/theme` — body may be partial; missing or invalid
/// fields take the layout preset's defaults.
pub async fn put_theme(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<Theme>, ApiError> {
    Ok(Json(theme::save_theme(&state.pool, id, &body).await?))
}

/// `POST /api/creators/{id}/theme/actions` — apply one editor action.
pub async fn apply_theme_action(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(action): Json<ThemeAction>,
) -> Result<Json<Theme>, ApiError> {
    Ok(Json(theme::apply_action(&state.pool, id, action).await?))
}

/// `GET /api/creators/{id}/sections` — enabled sections in render order.
pub async fn get_sections(State(state): State<AppState>, Path(id): Path<Uuid>) -> Result<Json<Value>, ApiError> {
    let theme = theme::load_theme(&state.pool, id).await?;
    let sections = serde_json::to_value(ordered_sections(&theme.sections)).map_err(ThemeError::from)?;
    Ok(Json(sections))
}

#[cfg(test)]
#[path = "creators_test.rs"]
mod tests;
