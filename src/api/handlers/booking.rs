use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crate::api::dtos::{requests::CreateBookingRequest, responses::BookingWithEvent};
use crate::api::extractors::actor::MaybeActor;
use crate::api::handlers::event::with_spots;
use crate::domain::models::actor::Actor;
use crate::domain::models::booking::Holder;
use crate::domain::services::admission::AdmissionRequest;
use crate::error::AppError;
use crate::state::AppState;
use chrono::Utc;
use std::sync::Arc;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    MaybeActor(actor): MaybeActor,
    Path(event_id): Path<String>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<impl IntoResponse, AppError> {
    let holder = match actor {
        Some(actor) => Holder::User {
            user_id: actor.user_id,
        },
        None => {
            let guest = payload.guest.ok_or(AppError::Validation(
                "Guest contact details are required to book without an account".into(),
            ))?;
            Holder::Guest {
                email: guest.email,
                name: guest.name,
                phone: guest.phone,
            }
        }
    };

    let booking = state
        .admission
        .admit(
            &event_id,
            AdmissionRequest {
                holder,
                guest_count: payload.guest_count,
                attendees: payload.attendees,
                reminder_opt_in: payload.reminder_opt_in,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(booking)))
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state
        .booking_repo
        .list_upcoming_for_user(&actor.user_id, Utc::now())
        .await?;

    let mut out = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let event = state
            .event_repo
            .find_by_id(&booking.event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        out.push(BookingWithEvent {
            booking,
            event: with_spots(&state, event).await?,
        });
    }
    Ok(Json(out))
}

pub async fn booking_history(
    State(state): State<Arc<AppState>>,
    actor: Actor,
) -> Result<impl IntoResponse, AppError> {
    let bookings = state.booking_repo.list_history_for_user(&actor.user_id).await?;

    let mut out = Vec::with_capacity(bookings.len());
    for booking in bookings {
        let event = state
            .event_repo
            .find_by_id(&booking.event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        out.push(BookingWithEvent {
            booking,
            event: with_spots(&state, event).await?,
        });
    }
    Ok(Json(out))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    actor: Actor,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let cancelled = state.lifecycle.cancel(&booking_id, &actor).await?;
    Ok(Json(cancelled))
}
