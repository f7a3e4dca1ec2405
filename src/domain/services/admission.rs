use crate::domain::models::booking::{Booking, Holder, NewBookingParams};
use crate::domain::ports::{BookingRepository, EventRepository};
use crate::domain::services::confirmation;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub const MAX_GUESTS_PER_BOOKING: i32 = 4;

pub struct AdmissionRequest {
    pub holder: Holder,
    pub guest_count: i32,
    pub attendees: Vec<String>,
    pub reminder_opt_in: bool,
}

/// The Capacity Ledger: validates the request, then hands the booking to
/// the repository's atomic admit, which re-derives the confirmed guest
/// total from the booking rows. No cached counter exists, so cancellations
/// free capacity implicitly.
pub struct AdmissionService {
    events: Arc<dyn EventRepository>,
    bookings: Arc<dyn BookingRepository>,
}

impl AdmissionService {
    pub fn new(events: Arc<dyn EventRepository>, bookings: Arc<dyn BookingRepository>) -> Self {
        Self { events, bookings }
    }

    pub async fn admit(&self, event_id: &str, request: AdmissionRequest) -> Result<Booking, AppError> {
        if request.guest_count < 1 || request.guest_count > MAX_GUESTS_PER_BOOKING {
            return Err(AppError::Validation(format!(
                "Guest count must be between 1 and {}",
                MAX_GUESTS_PER_BOOKING
            )));
        }

        let holder = validate_holder(request.holder)?;
        let mut attendees: Vec<String> = request
            .attendees
            .into_iter()
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .collect();
        attendees.truncate(request.guest_count as usize);

        let booking = Booking::new(NewBookingParams {
            event_id: event_id.to_string(),
            holder,
            guest_count: request.guest_count,
            attendees,
            reminder_opt_in: request.reminder_opt_in,
            confirmation_code: confirmation::issue_code(),
        });

        let admitted = self.bookings.admit(&booking).await?;
        info!(
            "Booking admitted: {} for event {} ({} guests)",
            admitted.id, event_id, admitted.guest_count
        );
        Ok(admitted)
    }

    /// `capacity - confirmed guest total`, floored at 0. None for
    /// unlimited (capacity 0) events.
    pub async fn spots_left(&self, event_id: &str) -> Result<Option<i64>, AppError> {
        let event = self
            .events
            .find_by_id(event_id)
            .await?
            .ok_or(AppError::NotFound("Event not found".into()))?;
        if event.capacity == 0 {
            return Ok(None);
        }
        let confirmed = self.bookings.confirmed_guest_total(event_id).await?;
        Ok(Some((event.capacity as i64 - confirmed).max(0)))
    }
}

fn validate_holder(holder: Holder) -> Result<Holder, AppError> {
    match holder {
        Holder::User { user_id } => {
            if user_id.trim().is_empty() {
                return Err(AppError::Validation("User reference must not be empty".into()));
            }
            Ok(Holder::User { user_id })
        }
        Holder::Guest { email, name, phone } => {
            let email = email.trim().to_lowercase();
            if !is_valid_email(&email) {
                return Err(AppError::Validation("Invalid email address".into()));
            }
            let name = name.trim().to_string();
            if name.is_empty() {
                return Err(AppError::Validation("Guest name must not be empty".into()));
            }
            let phone = match phone {
                Some(p) => {
                    let p = p.trim().to_string();
                    if !is_valid_phone(&p) {
                        return Err(AppError::Validation("Invalid phone number".into()));
                    }
                    Some(p)
                }
                None => None,
            };
            Ok(Holder::Guest { email, name, phone })
        }
    }
}

fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    !local.is_empty()
        && !domain.is_empty()
        && domain.contains('.')
        && !domain.starts_with('.')
        && !domain.ends_with('.')
        && !email.chars().any(char::is_whitespace)
        && !domain.contains('@')
}

/// Permissive: 7-20 characters of digits and common phone punctuation.
fn is_valid_phone(phone: &str) -> bool {
    (7..=20).contains(&phone.len())
        && phone
            .chars()
            .all(|c| c.is_ascii_digit() || matches!(c, '+' | '-' | '(' | ')' | '.' | ' '))
        && phone.chars().any(|c| c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_emails() {
        assert!(is_valid_email("alice@example.com"));
        assert!(is_valid_email("a.b+c@mail.example.co.uk"));
    }

    #[test]
    fn rejects_malformed_emails() {
        assert!(!is_valid_email("alice"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("alice@nodot"));
        assert!(!is_valid_email("alice@.com"));
        assert!(!is_valid_email("a lice@example.com"));
    }

    #[test]
    fn phone_pattern_is_permissive_but_bounded() {
        assert!(is_valid_phone("01604123456"));
        assert!(is_valid_phone("+44 (1604) 123-456"));
        assert!(!is_valid_phone("12345"));
        assert!(!is_valid_phone("123456789012345678901"));
        assert!(!is_valid_phone("phone-number"));
    }

    #[test]
    fn guest_email_is_normalized() {
        let holder = validate_holder(Holder::Guest {
            email: " Alice@Example.COM ".into(),
            name: "Alice".into(),
            phone: None,
        })
        .unwrap();
        match holder {
            Holder::Guest { email, .. } => assert_eq!(email, "alice@example.com"),
            _ => panic!("expected guest holder"),
        }
    }
}
