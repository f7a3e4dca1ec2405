use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use crate::api::dtos::requests::CreateLocationRequest;
use crate::api::extractors::actor::StaffActor;
use crate::domain::models::location::Location;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;

pub async fn create_location(
    State(state): State<Arc<AppState>>,
    StaffActor(_actor): StaffActor,
    Json(payload): Json<CreateLocationRequest>,
) -> Result<impl IntoResponse, AppError> {
    let name = payload.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation("Location name must not be empty".into()));
    }
    let created = state.location_repo.create(&Location::new(name)).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

pub async fn list_locations(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.location_repo.list().await?))
}
