use axum::{
    body::Body,
    extract::Request,
    routing::{delete, get, post},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::api::handlers::{booking, checkin, event, health, location, notification};
use crate::state::AppState;
use tower_http::{classify::ServerErrorsFailureClass, trace::TraceLayer};
use tracing::{error, info, info_span, Span};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Locations (conflict-checking key only)
        .route("/api/v1/locations", get(location::list_locations).post(location::create_location))

        // Events & series
        .route("/api/v1/events", get(event::list_events).post(event::create_event))
        .route("/api/v1/events/{event_id}", get(event::get_event).put(event::update_event))
        .route("/api/v1/events/{event_id}/spots", get(event::get_spots))

        // Booking admission (user or guest channel)
        .route("/api/v1/events/{event_id}/bookings", post(booking::create_booking))

        // Booker's own views & cancellation
        .route("/api/v1/bookings", get(booking::list_bookings))
        .route("/api/v1/bookings/history", get(booking::booking_history))
        .route("/api/v1/bookings/{booking_id}", delete(booking::cancel_booking))

        // Staff: check-in desk & reminder feed
        .route("/api/v1/check-in/{code}", post(checkin::check_in))
        .route("/api/v1/notifications/upcoming", get(notification::upcoming_reminders))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        actor_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .with_state(state)
}
