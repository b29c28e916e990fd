use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;
use wayfare_itinerary::{ExpenseSort, ExpenseSummary};
use wayfare_shared::{Expense, NewExpense};

use crate::{error::AppError, middleware::auth::UserClaims, state::AppState};

#[derive(Debug, Deserialize)]
pub struct ExpenseQuery {
    #[serde(default)]
    pub sort: ExpenseSort,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/v1/trips/{id}/expenses", get(list_expenses).post(add_expense))
        .route("/v1/trips/{id}/expenses/summary", get(expense_summary))
        .route("/v1/trips/{id}/expenses/{expense_id}", delete(remove_expense))
}

/// GET /v1/trips/{id}/expenses?sort=date|amount
async fn list_expenses(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
    Query(query): Query<ExpenseQuery>,
) -> Result<Json<Vec<Expense>>, AppError> {
    state.planner.trip(&claims.sub, trip_id).await?;
    let ledger = state.expenses.ledger(trip_id).await?;
    Ok(Json(ledger.sorted_by(query.sort).into_iter().cloned().collect()))
}

/// POST /v1/trips/{id}/expenses
async fn add_expense(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
    Json(req): Json<NewExpense>,
) -> Result<(StatusCode, Json<Expense>), AppError> {
    state.planner.trip(&claims.sub, trip_id).await?;
    let expense = state.expenses.add(trip_id, &req).await?;
    Ok((StatusCode::CREATED, Json(expense)))
}

/// GET /v1/trips/{id}/expenses/summary
async fn expense_summary(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path(trip_id): Path<Uuid>,
) -> Result<Json<ExpenseSummary>, AppError> {
    state.planner.trip(&claims.sub, trip_id).await?;
    let ledger = state.expenses.ledger(trip_id).await?;
    Ok(Json(ledger.summary(&state.planner_config.default_currency)?))
}

/// DELETE /v1/trips/{id}/expenses/{expense_id}
async fn remove_expense(
    State(state): State<AppState>,
    Extension(claims): Extension<UserClaims>,
    Path((trip_id, expense_id)): Path<(Uuid, Uuid)>,
) -> Result<StatusCode, AppError> {
    state.planner.trip(&claims.sub, trip_id).await?;
    if !state.expenses.remove(trip_id, expense_id).await? {
        return Err(AppError::NotFoundError(format!("Expense {} not found", expense_id)));
    }
    Ok(StatusCode::NO_CONTENT)
}
