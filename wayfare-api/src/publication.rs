use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use wayfare_itinerary::PublicationMachine;
use wayfare_shared::{FeedOrder, PublicationStatus};

use crate::{error::AppError, middleware::auth::UserClaims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct PublishRequest {
    #[serde(default)]
    pub comment: String,
}

#[derive(Debug, Deserialize)]
pub struct FeedQuery {
    #[serde(default)]
    pub order: FeedOrder,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips/{id}/publication", get(get_publication))
        .route("/v1/trips/{id}/publish", post(publish_trip))
        .route("/v1/trips/{id}/unpublish", post(unpublish_trip))
        .route("/v1/publications/{record_id}/like", post(like_publication))
        .route("/v1/publications/{record_id}/unlike", post(unlike_publication))
        .route("/v1/feed", get(feed))
}

/// Publication state of a trip the caller owns
async fn owned_machine(
    state: &AppState,
    claims: &UserClaims,
    trip_id: Uuid,
) -> Result<PublicationMachine, AppError> {
    state.planner.trip(&claims.sub, trip_id).await?;
    Ok(PublicationMachine::load(state.publications.clone(), trip_id, &claims.sub).await?)
}

/// Publication state of any published record, seen by the caller
async fn record_machine(
    state: &AppState,
    claims: &UserClaims,
    record_id: Uuid,
) -> Result<PublicationMachine, AppError> {
    let trip_id = state
        .publications
        .record_trip(record_id)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?
        .ok_or_else(|| AppError::NotFoundError(format!("Publication {} not found", record_id)))?;
    Ok(PublicationMachine::load(state.publications.clone(), trip_id, &claims.sub).await?)
}

/// GET /v1/trips/{id}/publication
async fn get_publication(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<PublicationStatus>, AppError> {
    let machine = owned_machine(&state, &claims, trip_id).await?;
    Ok(Json(machine.into_status()))
}

/// POST /v1/trips/{id}/publish
async fn publish_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<PublishRequest>,
) -> Result<Json<PublicationStatus>, AppError> {
    let mut machine = owned_machine(&state, &claims, trip_id).await?;
    machine.publish(&req.comment).await?;
    Ok(Json(machine.into_status()))
}

/// POST /v1/trips/{id}/unpublish
async fn unpublish_trip(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<PublicationStatus>, AppError> {
    let mut machine = owned_machine(&state, &claims, trip_id).await?;
    machine.unpublish().await?;
    Ok(Json(machine.into_status()))
}

/// POST /v1/publications/{record_id}/like
/// Idempotent: liking twice leaves one like
async fn like_publication(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<PublicationStatus>, AppError> {
    let mut machine = record_machine(&state, &claims, record_id).await?;
    if !machine.status().viewer_has_liked {
        machine.toggle_like().await?;
    }
    Ok(Json(machine.into_status()))
}

/// POST /v1/publications/{record_id}/unlike
async fn unlike_publication(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(record_id): Path<Uuid>,
) -> Result<Json<PublicationStatus>, AppError> {
    let mut machine = record_machine(&state, &claims, record_id).await?;
    if machine.status().viewer_has_liked {
        machine.toggle_like().await?;
    }
    Ok(Json(machine.into_status()))
}

/// GET /v1/feed?order=recent|popular
async fn feed(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Query(query): Query<FeedQuery>,
) -> Result<Json<Vec<PublicationStatus>>, AppError> {
    let feed = state
        .publications
        .list_feed(query.order, &claims.sub, state.planner_config.feed_limit)
        .await
        .map_err(|e| AppError::UpstreamError(e.to_string()))?;
    Ok(Json(feed))
}
