use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Resource not found: {0}")]
    NotFound(String),
    #[error("Unauthorized")]
    Unauthorized,
    #[error("Forbidden: {0}")]
    Forbidden(String),
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("Duplicate booking: {0}")]
    DuplicateBooking(String),
    #[error("Capacity exceeded: {0}")]
    CapacityExceeded(String),
    #[error("Location time conflict: {0}")]
    LocationTimeConflict(String),
    #[error("Cancellation window closed: {0}")]
    CancellationWindowClosed(String),
    #[error("Booking not confirmed: {0}")]
    NotConfirmed(String),
    #[error("Already checked in: {0}")]
    AlreadyCheckedIn(String),
    #[error("Internal server error")]
    Internal,
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::NotFound(_) => "not_found",
            AppError::Unauthorized => "unauthorized",
            AppError::Forbidden(_) => "forbidden",
            AppError::Validation(_) => "validation",
            AppError::DuplicateBooking(_) => "duplicate_booking",
            AppError::CapacityExceeded(_) => "capacity_exceeded",
            AppError::LocationTimeConflict(_) => "location_time_conflict",
            AppError::CancellationWindowClosed(_) => "cancellation_window_closed",
            AppError::NotConfirmed(_) => "not_confirmed",
            AppError::AlreadyCheckedIn(_) => "already_checked_in",
            AppError::Internal => "internal",
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) => {
                if let Some(db_err) = e.as_database_error() {
                    // 2067 = SQLite Unique Constraint
                    if db_err.code().unwrap_or_default() == "2067" {
                        let body = Json(json!({
                            "error": { "kind": "duplicate_booking", "reason": "Resource already exists (duplicate entry)" }
                        }));
                        return (StatusCode::CONFLICT, body).into_response();
                    }
                }

                error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal server error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "Unauthorized".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::DuplicateBooking(msg)
            | AppError::CapacityExceeded(msg)
            | AppError::LocationTimeConflict(msg)
            | AppError::CancellationWindowClosed(msg)
            | AppError::NotConfirmed(msg)
            | AppError::AlreadyCheckedIn(msg) => (StatusCode::CONFLICT, msg.clone()),
            AppError::Internal => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        let body = Json(json!({
            "error": { "kind": self.kind(), "reason": message }
        }));

        (status, body).into_response()
    }
}
