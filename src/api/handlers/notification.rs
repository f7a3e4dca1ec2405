use axum::{extract::State, response::IntoResponse, Json};
use crate::api::dtos::responses::ReminderNotification;
use crate::api::extractors::actor::StaffActor;
use crate::error::AppError;
use crate::state::AppState;
use chrono::{Duration, Utc};
use std::sync::Arc;

/// Confirmed, opted-in bookings whose event starts within the next 24
/// hours. The notification collaborator polls this; delivery is external.
pub async fn upcoming_reminders(
    State(state): State<Arc<AppState>>,
    StaffActor(_actor): StaffActor,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let bookings = state
        .booking_repo
        .list_due_reminders(now, now + Duration::hours(24))
        .await?;

    let mut out = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let event = state
            .event_repo
            .find_by_id(&booking.event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        out.push(ReminderNotification {
            booking_id: booking.id,
            confirmation_code: booking.confirmation_code,
            event_id: event.id,
            event_title: event.title,
            starts_at: event.starts_at,
            guest_count: booking.guest_count,
            recipient: booking.holder,
            reminder_opt_in: booking.reminder_opt_in,
        });
    }
    Ok(Json(out))
}
