use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::models::booking::{Booking, Holder};
use crate::domain::models::event::Event;

#[derive(Serialize)]
pub struct EventResponse {
    #[serde(flatten)]
    pub event: Event,
    /// None for unlimited (capacity 0) events.
    pub spots_left: Option<i64>,
}

#[derive(Serialize)]
pub struct BookingWithEvent {
    #[serde(flatten)]
    pub booking: Booking,
    pub event: EventResponse,
}

/// One entry of the reminder feed handed to the notification collaborator.
/// Delivery is entirely external; this is data only.
#[derive(Serialize)]
pub struct ReminderNotification {
    pub booking_id: String,
    pub confirmation_code: String,
    pub event_id: String,
    pub event_title: String,
    pub starts_at: DateTime<Utc>,
    pub guest_count: i32,
    pub recipient: Holder,
    pub reminder_opt_in: bool,
}
