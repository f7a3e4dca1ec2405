use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use crate::api::extractors::actor::StaffActor;
use crate::error::AppError;
use crate::state::AppState;
use std::sync::Arc;
use tracing::info;

pub async fn check_in(
    State(state): State<Arc<AppState>>,
    StaffActor(actor): StaffActor,
    Path(code): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let code = code.trim().to_uppercase();
    let booking = state.lifecycle.check_in(&code).await?;
    info!("Check-in by {}: booking {}", actor.user_id, booking.id);
    Ok(Json(booking))
}
