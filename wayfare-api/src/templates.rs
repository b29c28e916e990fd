use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use wayfare_itinerary::InstantiationOutcome;
use wayfare_shared::{TemplateCategory, TripTemplate};

use crate::{error::AppError, middleware::auth::UserClaims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct TemplateQuery {
    pub category: Option<TemplateCategory>,
}

#[derive(Debug, Deserialize)]
pub struct InstantiateRequest {
    pub start_date: NaiveDate,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/templates", get(list_templates))
        .route("/v1/templates/{id}", get(get_template))
        .route("/v1/templates/{id}/instantiate", post(instantiate_template))
}

/// GET /v1/templates
async fn list_templates(
    State(state): State<AppState>,
    Query(query): Query<TemplateQuery>,
) -> Result<Json<Vec<TripTemplate>>, AppError> {
    let templates = state
        .catalog
        .list_templates()
        .await
        .map_err(|e| AppError::InternalServerError(format!("Catalog unavailable: {}", e)))?;

    Ok(Json(
        templates
            .into_iter()
            .filter(|t| query.category.map_or(true, |c| t.category == c))
            .collect(),
    ))
}

/// GET /v1/templates/{id}
async fn get_template(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<TripTemplate>, AppError> {
    let template = find_template(&state, &id).await?;
    Ok(Json(template))
}

/// POST /v1/templates/{id}/instantiate
/// Create a dated trip from a template. Partial failures are reported in
/// `failed` with a 201, since the trip itself exists.
async fn instantiate_template(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(id): Path<String>,
    Json(req): Json<InstantiateRequest>,
) -> Result<(StatusCode, Json<InstantiationOutcome>), AppError> {
    let template = find_template(&state, &id).await?;
    let outcome = state
        .instantiator
        .instantiate(&claims.sub, &template, req.start_date)
        .await?;

    Ok((StatusCode::CREATED, Json(outcome)))
}

async fn find_template(state: &AppState, id: &str) -> Result<TripTemplate, AppError> {
    state
        .catalog
        .get_template(id)
        .await
        .map_err(|e| AppError::InternalServerError(format!("Catalog unavailable: {}", e)))?
        .ok_or_else(|| AppError::NotFoundError(format!("Template {} not found", id)))
}
