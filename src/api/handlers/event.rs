use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use crate::api::dtos::{
    requests::{CreateEventRequest, ListEventsQuery, UpdateEventRequest},
    responses::EventResponse,
};
use crate::api::extractors::actor::StaffActor;
use crate::domain::models::event::{Event, EventTemplate};
use crate::domain::services::scheduling::RecurrenceSpec;
use crate::error::AppError;
use crate::state::AppState;
use serde_json::json;
use std::sync::Arc;
use tracing::info;

pub(crate) async fn with_spots(state: &AppState, event: Event) -> Result<EventResponse, AppError> {
    let spots_left = if event.capacity == 0 {
        None
    } else {
        let confirmed = state.booking_repo.confirmed_guest_total(&event.id).await?;
        Some((event.capacity as i64 - confirmed).max(0))
    };
    Ok(EventResponse { event, spots_left })
}

pub async fn create_event(
    State(state): State<Arc<AppState>>,
    StaffActor(actor): StaffActor,
    Json(payload): Json<CreateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    info!("Creating event '{}' (staff: {})", payload.title, actor.user_id);

    let template = EventTemplate {
        title: payload.title,
        description: payload.description,
        location_id: payload.location_id,
        starts_at: payload.starts_at,
        ends_at: payload.ends_at,
        capacity: payload.capacity,
        price: payload.price,
        is_free: payload.is_free,
        category: payload.category,
    };

    let recurrence = payload.recurrence.map(|r| RecurrenceSpec {
        kind: r.kind,
        end_date: r.end_date,
    });

    let created = state
        .scheduling
        .create_series(&template, recurrence.as_ref())
        .await?;

    // Callers surface the first instance; the rest are discoverable
    // through the shared group_id.
    let first = created.into_iter().next().ok_or(AppError::Internal)?;
    Ok((StatusCode::CREATED, Json(first)))
}

pub async fn list_events(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListEventsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let free_only = matches!(query.free.as_deref(), Some("1") | Some("true") | Some("True"));
    let events = state.event_repo.list(free_only).await?;

    let mut out = Vec::with_capacity(events.len());
    for event in events {
        out.push(with_spots(&state, event).await?);
    }
    Ok(Json(out))
}

pub async fn get_event(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;
    Ok(Json(with_spots(&state, event).await?))
}

pub async fn update_event(
    State(state): State<Arc<AppState>>,
    StaffActor(_actor): StaffActor,
    Path(event_id): Path<String>,
    Json(payload): Json<UpdateEventRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut event = state
        .event_repo
        .find_by_id(&event_id)
        .await?
        .ok_or(AppError::NotFound("Event not found".into()))?;

    if let Some(title) = payload.title {
        if title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".into()));
        }
        event.title = title;
    }
    if let Some(description) = payload.description {
        event.description = description;
    }
    if let Some(location_id) = payload.location_id {
        state
            .location_repo
            .find_by_id(&location_id)
            .await?
            .ok_or(AppError::NotFound("Location not found".into()))?;
        event.location_id = Some(location_id);
    }
    if let Some(starts_at) = payload.starts_at {
        event.starts_at = starts_at;
    }
    if let Some(ends_at) = payload.ends_at {
        event.ends_at = ends_at;
    }
    if let Some(capacity) = payload.capacity {
        if capacity < 0 {
            return Err(AppError::Validation("Capacity must not be negative".into()));
        }
        event.capacity = capacity;
    }
    if let Some(price) = payload.price {
        if price < 0.0 {
            return Err(AppError::Validation("Price must not be negative".into()));
        }
        event.price = price;
    }
    if let Some(is_free) = payload.is_free {
        event.is_free = is_free;
    }
    if let Some(category) = payload.category {
        event.category = Some(category);
    }

    if event.starts_at >= event.ends_at {
        return Err(AppError::Validation("Event must end after it starts".into()));
    }

    let updated = state.event_repo.update_checked(&event).await?;
    info!("Event updated: {}", updated.id);
    Ok(Json(updated))
}

pub async fn get_spots(
    State(state): State<Arc<AppState>>,
    Path(event_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let spots_left = state.admission.spots_left(&event_id).await?;
    Ok(Json(json!({ "event_id": event_id, "spots_left": spots_left })))
}
