use crate::domain::models::{booking::Booking, event::Event, location::Location};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[async_trait]
pub trait LocationRepository: Send + Sync {
    async fn create(&self, location: &Location) -> Result<Location, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Location>, AppError>;
    async fn list(&self) -> Result<Vec<Location>, AppError>;
}

#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Conflict check and insert in one atomic unit.
    async fn create_checked(&self, event: &Event) -> Result<Event, AppError>;
    /// All-or-nothing: either every instance is persisted or none is.
    async fn create_series(&self, instances: &[Event]) -> Result<Vec<Event>, AppError>;
    /// Conflict check (excluding the event itself) and update in one atomic unit.
    async fn update_checked(&self, event: &Event) -> Result<Event, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError>;
    async fn list(&self, free_only: bool) -> Result<Vec<Event>, AppError>;
    async fn find_conflict(
        &self,
        location_id: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<Option<Event>, AppError>;
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// The admission critical section: duplicate-holder check plus a
    /// capacity-guarded insert that must be atomic with respect to
    /// concurrent admissions for the same event.
    async fn admit(&self, booking: &Booking) -> Result<Booking, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError>;
    async fn confirmed_guest_total(&self, event_id: &str) -> Result<i64, AppError>;
    /// Compare-and-set confirmed -> cancelled. None if the booking was no
    /// longer in the confirmed state.
    async fn cancel(&self, id: &str, at: DateTime<Utc>) -> Result<Option<Booking>, AppError>;
    /// Compare-and-set checked_in false -> true, confirmed bookings only.
    async fn check_in(&self, code: &str, at: DateTime<Utc>) -> Result<Option<Booking>, AppError>;
    async fn list_upcoming_for_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError>;
    async fn list_history_for_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError>;
    /// Confirmed, opted-in bookings whose event starts within (now, until].
    async fn list_due_reminders(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError>;
}
