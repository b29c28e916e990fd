use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use wayfare_core::CoreError;
use wayfare_itinerary::{ExpenseError, InstantiationError, PlannerError, PublicationError};

#[derive(Debug)]
pub enum AppError {
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    UnprocessableError(String),
    UpstreamError(String),
    InternalServerError(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::UnprocessableError(msg) => (StatusCode::UNPROCESSABLE_ENTITY, msg),
            AppError::UpstreamError(msg) => {
                tracing::warn!("Upstream failure: {}", msg);
                (StatusCode::BAD_GATEWAY, msg)
            }
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<CoreError> for AppError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidRange { .. } | CoreError::DateOverflow { .. } => {
                AppError::UnprocessableError(err.to_string())
            }
            CoreError::ValidationError(_) => AppError::ValidationError(err.to_string()),
        }
    }
}

impl From<PlannerError> for AppError {
    fn from(err: PlannerError) -> Self {
        match err {
            PlannerError::Core(e) => e.into(),
            PlannerError::DateOutOfRange { .. } => AppError::UnprocessableError(err.to_string()),
            PlannerError::TripNotFound(_) => AppError::NotFoundError(err.to_string()),
            PlannerError::Remote(_) => AppError::UpstreamError(err.to_string()),
        }
    }
}

impl From<InstantiationError> for AppError {
    fn from(err: InstantiationError) -> Self {
        match err {
            InstantiationError::Calendar(e) => e.into(),
            InstantiationError::TripCreateFailed(_) => AppError::UpstreamError(err.to_string()),
        }
    }
}

impl From<PublicationError> for AppError {
    fn from(err: PublicationError) -> Self {
        match err {
            PublicationError::EmptyComment => AppError::UnprocessableError(err.to_string()),
            PublicationError::AlreadyPublished(_) | PublicationError::NotPublished(_) => {
                AppError::ConflictError(err.to_string())
            }
            PublicationError::Remote(_) => AppError::UpstreamError(err.to_string()),
        }
    }
}

impl From<ExpenseError> for AppError {
    fn from(err: ExpenseError) -> Self {
        match err {
            ExpenseError::EmptyConcept | ExpenseError::NonPositiveAmount(_) => {
                AppError::ValidationError(err.to_string())
            }
            ExpenseError::TotalOverflow => AppError::UnprocessableError(err.to_string()),
            ExpenseError::Remote(_) => AppError::UpstreamError(err.to_string()),
        }
    }
}
