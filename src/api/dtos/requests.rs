use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

fn default_true() -> bool {
    true
}

fn default_guest_count() -> i32 {
    1
}

#[derive(Deserialize)]
pub struct RecurrenceRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: String,
    pub location_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    #[serde(default)]
    pub capacity: i32,
    #[serde(default)]
    pub price: f64,
    #[serde(default = "default_true")]
    pub is_free: bool,
    pub category: Option<String>,
    pub recurrence: Option<RecurrenceRequest>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location_id: Option<String>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub capacity: Option<i32>,
    pub price: Option<f64>,
    pub is_free: Option<bool>,
    pub category: Option<String>,
}

#[derive(Deserialize)]
pub struct GuestContactRequest {
    pub email: String,
    pub name: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    #[serde(default = "default_guest_count")]
    pub guest_count: i32,
    #[serde(default)]
    pub attendees: Vec<String>,
    /// Required when booking without an authenticated identity.
    pub guest: Option<GuestContactRequest>,
    #[serde(default = "default_true")]
    pub reminder_opt_in: bool,
}

#[derive(Deserialize)]
pub struct CreateLocationRequest {
    pub name: String,
}

#[derive(Deserialize)]
pub struct ListEventsQuery {
    pub free: Option<String>,
}
