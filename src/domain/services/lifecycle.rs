use crate::domain::models::actor::Actor;
use crate::domain::models::booking::{Booking, Holder};
use crate::domain::ports::{BookingRepository, EventRepository};
use crate::error::AppError;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::info;

pub const CANCELLATION_WINDOW_HOURS: i64 = 24;

/// The booking lifecycle state machine: confirmed -> cancelled, and
/// confirmed -> checked-in. Both transitions happen exactly once; both are
/// compare-and-set at the store so a racing second caller loses cleanly.
pub struct LifecycleService {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl LifecycleService {
    pub fn new(events: Arc<dyn EventRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { events, bookings }
    }

    /// Owner-or-staff. Idempotent when already cancelled. The 24-hour
    /// guard is evaluated against the wall clock at transition time.
    pub async fn cancel(&self, booking_id: &str, actor: &Actor) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .find_by_id(booking_id)
            .await?
            .ok_or(AppError::NotFound("Booking not found".into()))?;

        let owned = matches!(&booking.holder, Holder::User { user_id } if *user_id == actor.user_id);
        if !owned && !actor.is_staff {
            return Err(AppError::Forbidden("Not your booking".into()));
        }

        if booking.is_cancelled() {
            return Ok(booking);
        }

        let event = self
            .events
            .find_by_id(&booking.event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let now = Utc::now();
        if event.starts_at - now <= Duration::hours(CANCELLATION_WINDOW_HOURS) {
            return Err(AppError::CancellationWindowClosed(format!(
                "Bookings can only be cancelled more than {} hours before the event starts",
                CANCELLATION_WINDOW_HOURS
            )));
        }

        match self.bookings.cancel(&booking.id, now).await? {
            Some(cancelled) => {
                info!("Booking cancelled: {}", cancelled.id);
                Ok(cancelled)
            }
            // Lost a race with another cancel; return the settled state.
            None => self
                .bookings
                .find_by_id(&booking.id)
                .await?
                .ok_or(AppError::NotFound("Booking not found".into())),
        }
    }

    /// Staff-only (enforced at the transport seam). No un-check-in exists.
    pub async fn check_in(&self, confirmation_code: &str) -> Result<Booking, AppError> {
        let booking = self
            .bookings
            .find_by_code(confirmation_code)
            .await?
            .ok_or(AppError::NotFound("No booking with that confirmation code".into()))?;

        if !booking.is_confirmed() {
            return Err(AppError::NotConfirmed("Booking is not confirmed".into()));
        }
        if booking.checked_in {
            return Err(AppError::AlreadyCheckedIn("Booking already checked in".into()));
        }

        match self.bookings.check_in(confirmation_code, Utc::now()).await? {
            Some(checked) => {
                info!("Booking checked in: {}", checked.id);
                Ok(checked)
            }
            None => Err(AppError::AlreadyCheckedIn("Booking already checked in".into())),
        }
    }
}
