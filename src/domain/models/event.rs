use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const RECURRENCE_WEEKLY: &str = "weekly";

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Event {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Events without a location skip conflict checking entirely.
    pub location_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    /// 0 means unlimited.
    pub capacity: i32,
    pub price: f64,
    pub is_free: bool,
    pub category: Option<String>,
    /// Shared by all instances of one recurring series.
    pub group_id: Option<String>,
    pub recurrence_kind: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct EventTemplate {
    pub title: String,
    pub description: String,
    pub location_id: Option<String>,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub capacity: i32,
    pub price: f64,
    pub is_free: bool,
    pub category: Option<String>,
}

impl Event {
    pub fn from_template(template: &EventTemplate) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: template.title.clone(),
            description: template.description.clone(),
            location_id: template.location_id.clone(),
            starts_at: template.starts_at,
            ends_at: template.ends_at,
            capacity: template.capacity,
            price: template.price,
            is_free: template.is_free,
            category: template.category.clone(),
            group_id: None,
            recurrence_kind: None,
            created_at: Utc::now(),
        }
    }

    /// One projected instance of a weekly series, shifted from the template window.
    pub fn series_instance(
        template: &EventTemplate,
        group_id: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Self {
        let mut event = Self::from_template(template);
        event.starts_at = starts_at;
        event.ends_at = ends_at;
        event.group_id = Some(group_id.to_string());
        event.recurrence_kind = Some(RECURRENCE_WEEKLY.to_string());
        event
    }
}
