use crate::domain::models::booking::{Booking, Holder};
use crate::domain::models::event::Event;
use crate::domain::ports::BookingRepository;
use crate::domain::services::confirmation;
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};
use tracing::warn;

/// Flat row shape for sqlx; the nullable holder columns collapse into the
/// tagged `Holder` on conversion.
#[derive(FromRow)]
pub struct BookingRow {
    pub id: String,
    pub event_id: String,
    pub user_id: Option<String>,
    pub guest_email: Option<String>,
    pub guest_name: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_count: i32,
    pub attendees: Option<String>,
    pub status: String,
    pub confirmation_code: String,
    pub checked_in: bool,
    pub checked_in_at: Option<DateTime<Utc>>,
    pub reminder_opt_in: bool,
    pub booked_at: DateTime<Utc>,
    pub cancelled_at: Option<DateTime<Utc>>,
}

impl TryFrom<BookingRow> for Booking {
    type Error = AppError;

    fn try_from(row: BookingRow) -> Result<Self, AppError> {
        let BookingRow {
            id,
            event_id,
            user_id,
            guest_email,
            guest_name,
            guest_phone,
            guest_count,
            attendees,
            status,
            confirmation_code,
            checked_in,
            checked_in_at,
            reminder_opt_in,
            booked_at,
            cancelled_at,
        } = row;

        // The schema CHECK makes anything else unreachable.
        let holder = match (user_id, guest_email) {
            (Some(user_id), None) => Holder::User { user_id },
            (None, Some(email)) => Holder::Guest {
                email,
                name: guest_name.unwrap_or_default(),
                phone: guest_phone,
            },
            _ => return Err(AppError::Internal),
        };

        let attendees = match attendees {
            Some(json) => serde_json::from_str(&json).unwrap_or_default(),
            None => Vec::new(),
        };

        Ok(Booking {
            id,
            event_id,
            holder,
            guest_count,
            attendees,
            status,
            confirmation_code,
            checked_in,
            checked_in_at,
            reminder_opt_in,
            booked_at,
            cancelled_at,
        })
    }
}

fn holder_columns(
    holder: &Holder,
) -> (Option<String>, Option<String>, Option<String>, Option<String>) {
    match holder {
        Holder::User { user_id } => (Some(user_id.clone()), None, None, None),
        Holder::Guest { email, name, phone } => {
            (None, Some(email.clone()), Some(name.clone()), phone.clone())
        }
    }
}

// The capacity guard lives inside the INSERT itself: the confirmed guest
// total is recomputed against capacity in the same statement, which SQLite
// executes under its write lock. Two racing admissions for the last spot
// therefore serialize, and the loser's insert matches zero rows.
const GUARDED_ADMIT: &str = "\
INSERT INTO bookings (id, event_id, user_id, guest_email, guest_name, guest_phone, \
                      guest_count, attendees, status, confirmation_code, \
                      checked_in, checked_in_at, reminder_opt_in, booked_at, cancelled_at) \
SELECT ?, ?, ?, ?, ?, ?, ?, ?, 'confirmed', ?, 0, NULL, ?, ?, NULL \
WHERE (SELECT capacity FROM events WHERE id = ?) = 0 \
   OR (SELECT COALESCE(SUM(guest_count), 0) FROM bookings \
        WHERE event_id = ? AND status = 'confirmed') + ? \
        <= (SELECT capacity FROM events WHERE id = ?) \
RETURNING *";

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn fetch_optional_booking(&self, query: &str, bind: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>(query)
            .bind(bind)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .map(Booking::try_from)
            .transpose()
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    async fn admit(&self, booking: &Booking) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(&booking.event_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)?
            .ok_or(AppError::NotFound("Event not found".into()))?;

        let (user_id, guest_email, guest_name, guest_phone) = holder_columns(&booking.holder);

        // Precheck for a clear error message; the partial unique indexes
        // enforce the rule under races.
        let duplicates = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings \
              WHERE event_id = ? AND status = 'confirmed' \
                AND ((user_id IS NOT NULL AND user_id = ?) \
                  OR (guest_email IS NOT NULL AND guest_email = ?))",
        )
        .bind(&booking.event_id)
        .bind(&user_id)
        .bind(&guest_email)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)?;

        if duplicates > 0 {
            return Err(AppError::DuplicateBooking(
                "A confirmed booking for this event already exists".into(),
            ));
        }

        let attendees_json = if booking.attendees.is_empty() {
            None
        } else {
            Some(serde_json::to_string(&booking.attendees).map_err(|_| AppError::Internal)?)
        };

        let mut code = booking.confirmation_code.clone();
        for attempt in 0..2 {
            let inserted = sqlx::query_as::<_, BookingRow>(GUARDED_ADMIT)
                .bind(&booking.id)
                .bind(&booking.event_id)
                .bind(&user_id)
                .bind(&guest_email)
                .bind(&guest_name)
                .bind(&guest_phone)
                .bind(booking.guest_count)
                .bind(&attendees_json)
                .bind(&code)
                .bind(booking.reminder_opt_in)
                .bind(booking.booked_at)
                .bind(&booking.event_id)
                .bind(&booking.event_id)
                .bind(booking.guest_count)
                .bind(&booking.event_id)
                .fetch_optional(&self.pool)
                .await;

            match inserted {
                Ok(Some(row)) => return row.try_into(),
                Ok(None) => {
                    return Err(AppError::CapacityExceeded(
                        "Not enough spots available".into(),
                    ))
                }
                Err(sqlx::Error::Database(db))
                    if db.message().contains("confirmation_code") && attempt == 0 =>
                {
                    // Unique-constraint collision on the code: regenerate once.
                    warn!("Confirmation code collision, regenerating");
                    code = confirmation::issue_code();
                }
                Err(sqlx::Error::Database(db))
                    if db.message().contains("idx_bookings_user_once")
                        || db.message().contains("idx_bookings_guest_once") =>
                {
                    return Err(AppError::DuplicateBooking(
                        "A confirmed booking for this event already exists".into(),
                    ));
                }
                Err(e) => return Err(AppError::Database(e)),
            }
        }

        Err(AppError::Internal)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        self.fetch_optional_booking("SELECT * FROM bookings WHERE id = ?", id).await
    }

    async fn find_by_code(&self, code: &str) -> Result<Option<Booking>, AppError> {
        self.fetch_optional_booking("SELECT * FROM bookings WHERE confirmation_code = ?", code)
            .await
    }

    async fn confirmed_guest_total(&self, event_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(guest_count), 0) FROM bookings \
              WHERE event_id = ? AND status = 'confirmed'",
        )
        .bind(event_id)
        .fetch_one(&self.pool)
        .await
        .map_err(AppError::Database)
    }

    async fn cancel(&self, id: &str, at: DateTime<Utc>) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings SET status = 'cancelled', cancelled_at = ? \
              WHERE id = ? AND status = 'confirmed' \
              RETURNING *",
        )
        .bind(at)
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .map(Booking::try_from)
        .transpose()
    }

    async fn check_in(&self, code: &str, at: DateTime<Utc>) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, BookingRow>(
            "UPDATE bookings SET checked_in = 1, checked_in_at = ? \
              WHERE confirmation_code = ? AND status = 'confirmed' AND checked_in = 0 \
              RETURNING *",
        )
        .bind(at)
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?
        .map(Booking::try_from)
        .transpose()
    }

    async fn list_upcoming_for_user(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT b.* FROM bookings b \
               JOIN events e ON e.id = b.event_id \
              WHERE b.user_id = ? AND b.status = 'confirmed' AND e.starts_at >= ? \
              ORDER BY e.starts_at ASC",
        )
        .bind(user_id)
        .bind(now)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_history_for_user(&self, user_id: &str) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT * FROM bookings WHERE user_id = ? ORDER BY booked_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;
        rows.into_iter().map(Booking::try_from).collect()
    }

    async fn list_due_reminders(
        &self,
        now: DateTime<Utc>,
        until: DateTime<Utc>,
    ) -> Result<Vec<Booking>, AppError> {
        let rows = sqlx::query_as::<_, BookingRow>(
            "SELECT b.* FROM bookings b \
               JOIN events e ON e.id = b.event_id \
              WHERE b.status = 'confirmed' AND b.reminder_opt_in = 1 \
                AND e.starts_at > ? AND e.starts_at <= ? \
              ORDER BY e.starts_at ASC",
        )
        .bind(now)
        .bind(until)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::Database)?;
        rows.into_iter().map(Booking::try_from).collect()
    }
}
