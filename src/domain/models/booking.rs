use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use uuid::Uuid;

pub const STATUS_CONFIRMED: &str = "confirmed";
pub const STATUS_CANCELLED: &str = "cancelled";

/// Who holds the booking: a registered user reference, or a self-contained
/// guest contact. Exactly one of the two, by construction.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Holder {
    User {
        user_id: String,
    },
    Guest {
        email: String,
        name: String,
        phone: Option<String>,
    },
}

#[derive(Debug, Serialize, Clone)]
pub struct Booking {
    pub id: String,
    pub event_id: String,
    pub holder: Holder,
    pub guest_count: i32,
    pub attendees: Vec<String>,
    pub status: String,
    pub confirmation_code: String,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub reminder_opt_in: bool,
    pub booked_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

pub struct NewBookingParams {
    pub event_id: String,
    pub holder: Holder,
    pub guest_count: i32,
    pub attendees: Vec<String>,
    pub reminder_opt_in: bool,
    pub confirmation_code: String,
}

impl Booking {
    pub fn new(params: NewBookingParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            event_id: params.event_id,
            holder: params.holder,
            guest_count: params.guest_count,
            attendees: params.attendees,
            status: STATUS_CONFIRMED.to_string(),
            confirmation_code: params.confirmation_code,
            checked_in: false,
            checked_in_at: None,
            reminder_opt_in: params.reminder_opt_in,
            booked_at: Utc::now(),
            cancelled_at: None,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        self.status == STATUS_CONFIRMED
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == STATUS_CANCELLED
    }
}
