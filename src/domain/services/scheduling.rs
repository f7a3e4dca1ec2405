use crate::domain::models::event::{Event, EventTemplate, RECURRENCE_WEEKLY};
use crate::domain::ports::{EventRepository, LocationRepository};
use crate::error::AppError;
use chrono::{DateTime, Duration, NaiveDate, Utc};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

/// Half-open window overlap: `[s1, e1)` and `[s2, e2)` conflict iff each
/// starts before the other ends. Windows that only touch at an endpoint
/// do not conflict.
pub fn windows_overlap(
    s1: DateTime<Utc>,
    e1: DateTime<Utc>,
    s2: DateTime<Utc>,
    e2: DateTime<Utc>,
) -> bool {
    s1 < e2 && e1 > s2
}

/// Project a weekly series from the template window: shift by 7 days while
/// the shifted start still falls on or before `end_date`. The template
/// instance itself is always included, so the result is never empty even
/// when `end_date` precedes the template start.
pub fn expand_weekly(
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    end_date: NaiveDate,
) -> Vec<(DateTime<Utc>, DateTime<Utc>)> {
    let mut windows = Vec::new();
    let mut start = starts_at;
    let mut end = ends_at;
    loop {
        windows.push((start, end));
        start += Duration::days(7);
        end += Duration::days(7);
        if start.date_naive() > end_date {
            break;
        }
    }
    windows
}

pub struct RecurrenceSpec {
    pub kind: String,
    pub end_date: NaiveDate,
}

pub struct SchedulingService {
    events: Arc<dyn EventRepository>,
    locations: Arc<dyn LocationRepository>,
}

impl SchedulingService {
    pub fn new(events: Arc<dyn EventRepository>, locations: Arc<dyn LocationRepository>) -> Self {
        Self { events, locations }
    }

    async fn validate_template(&self, template: &EventTemplate) -> Result<(), AppError> {
        if template.title.trim().is_empty() {
            return Err(AppError::Validation("Title must not be empty".into()));
        }
        if template.starts_at >= template.ends_at {
            return Err(AppError::Validation("Event must end after it starts".into()));
        }
        if template.capacity < 0 {
            return Err(AppError::Validation("Capacity must not be negative".into()));
        }
        if template.price < 0.0 {
            return Err(AppError::Validation("Price must not be negative".into()));
        }
        if let Some(location_id) = &template.location_id {
            self.locations
                .find_by_id(location_id)
                .await?
                .ok_or(AppError::NotFound("Location not found".into()))?;
        }
        Ok(())
    }

    pub async fn create_event(&self, template: &EventTemplate) -> Result<Event, AppError> {
        self.validate_template(template).await?;
        let created = self.events.create_checked(&Event::from_template(template)).await?;
        info!("Event created: {} ({})", created.id, created.title);
        Ok(created)
    }

    /// Expand the template into weekly instances and persist them
    /// all-or-nothing under one fresh group id. Anything other than a
    /// weekly recurrence descriptor falls back to single-event creation.
    pub async fn create_series(
        &self,
        template: &EventTemplate,
        recurrence: Option<&RecurrenceSpec>,
    ) -> Result<Vec<Event>, AppError> {
        let recurrence = match recurrence {
            Some(r) if r.kind == RECURRENCE_WEEKLY => r,
            _ => return Ok(vec![self.create_event(template).await?]),
        };

        self.validate_template(template).await?;

        let group_id = Uuid::new_v4().to_string();
        let instances: Vec<Event> = expand_weekly(template.starts_at, template.ends_at, recurrence.end_date)
            .into_iter()
            .map(|(starts_at, ends_at)| Event::series_instance(template, &group_id, starts_at, ends_at))
            .collect();

        let created = self.events.create_series(&instances).await?;
        info!(
            "Series created: group {} with {} instances",
            group_id,
            created.len()
        );
        Ok(created)
    }
}
