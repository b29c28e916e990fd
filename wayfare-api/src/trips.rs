use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use wayfare_core::DateRange;
use wayfare_itinerary::TripView;
use wayfare_shared::{ActivityId, HotelId, ItineraryItem, NewTrip, Stay, Trip, TripPatch};

use crate::{error::AppError, middleware::auth::UserClaims, state::AppState};

// ============================================================================
// Request Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct AddItemRequest {
    pub activity_id: ActivityId,
    pub realized_date: NaiveDate,
}

#[derive(Debug, Deserialize)]
pub struct AddStayRequest {
    pub hotel_id: HotelId,
    pub stay_start: NaiveDate,
    pub stay_end: NaiveDate,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips", post(create_trip).get(list_trips))
        .route("/v1/trips/{id}", get(get_trip).patch(update_trip).delete(delete_trip))
        .route("/v1/trips/{id}/items", post(add_item))
        .route("/v1/trips/{id}/items/{item_id}", delete(remove_item))
        .route("/v1/trips/{id}/stays", post(add_stay))
        .route("/v1/trips/{id}/stays/{stay_id}", delete(remove_stay))
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /v1/trips
async fn create_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Json(req): Json<NewTrip>,
) -> Result<(StatusCode, Json<Trip>), AppError> {
    let trip = state.planner.create_trip(&claims.sub, &req).await?;
    Ok((StatusCode::CREATED, Json(trip)))
}

/// GET /v1/trips
async fn list_trips(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
) -> Result<Json<Vec<Trip>>, AppError> {
    Ok(Json(state.planner.list_trips(&claims.sub).await?))
}

/// GET /v1/trips/{id}
/// The trip plan: numbered days, unscheduled items, stays and stay warnings
async fn get_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<TripView>, AppError> {
    Ok(Json(state.planner.view(&claims.sub, trip_id).await?))
}

/// PATCH /v1/trips/{id}
async fn update_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
    Json(patch): Json<TripPatch>,
) -> Result<Json<Trip>, AppError> {
    Ok(Json(state.planner.update_trip(&claims.sub, trip_id, &patch).await?))
}

/// DELETE /v1/trips/{id}
async fn delete_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.planner.delete_trip(&claims.sub, trip_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/trips/{id}/items
async fn add_item(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<AddItemRequest>,
) -> Result<(StatusCode, Json<ItineraryItem>), AppError> {
    let item = state
        .planner
        .add_item(&claims.sub, trip_id, req.activity_id, req.realized_date)
        .await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// DELETE /v1/trips/{id}/items/{item_id}
async fn remove_item(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path((trip_id, item_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    if !state.planner.remove_item(&claims.sub, trip_id, item_id).await? {
        return Err(AppError::NotFoundError(format!("Item {} not found", item_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// POST /v1/trips/{id}/stays
async fn add_stay(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<AddStayRequest>,
) -> Result<(StatusCode, Json<Stay>), AppError> {
    let window = DateRange::new(req.stay_start, req.stay_end)?;
    let stay = state
        .planner
        .add_stay(&claims.sub, trip_id, req.hotel_id, window)
        .await?;
    Ok((StatusCode::CREATED, Json(stay)))
}

/// DELETE /v1/trips/{id}/stays/{stay_id}
async fn remove_stay(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path((trip_id, stay_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    if !state.planner.remove_stay(&claims.sub, trip_id, stay_id).await? {
        return Err(AppError::NotFoundError(format!("Stay {} not found", stay_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
