use crate::domain::{models::event::Event, ports::EventRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteEventRepo {
    pool: SqlitePool,
}

impl SqliteEventRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

// Insert guarded by the conflict check in the same statement, so the
// check-then-act runs atomically under SQLite's write lock. Locationless
// events pass the guard unconditionally.
const GUARDED_INSERT: &str = "\
INSERT INTO events (id, title, description, location_id, starts_at, ends_at, \
                    capacity, price, is_free, category, group_id, recurrence_kind, created_at) \
SELECT ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ? \
WHERE ? IS NULL \
   OR NOT EXISTS (SELECT 1 FROM events \
                   WHERE location_id = ? AND starts_at < ? AND ends_at > ?) \
RETURNING *";

async fn insert_checked<'e, E>(executor: E, event: &Event) -> Result<Option<Event>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Event>(GUARDED_INSERT)
        .bind(&event.id)
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location_id)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.capacity)
        .bind(event.price)
        .bind(event.is_free)
        .bind(&event.category)
        .bind(&event.group_id)
        .bind(&event.recurrence_kind)
        .bind(event.created_at)
        .bind(&event.location_id)
        .bind(&event.location_id)
        .bind(event.ends_at)
        .bind(event.starts_at)
        .fetch_optional(executor)
        .await
}

async fn conflict_for<'e, E>(
    executor: E,
    location_id: &str,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    exclude_id: Option<&str>,
) -> Result<Option<Event>, sqlx::Error>
where
    E: sqlx::SqliteExecutor<'e>,
{
    sqlx::query_as::<_, Event>(
        "SELECT * FROM events \
          WHERE location_id = ? AND starts_at < ? AND ends_at > ? \
            AND (? IS NULL OR id <> ?) \
          ORDER BY starts_at ASC LIMIT 1",
    )
    .bind(location_id)
    .bind(ends_at)
    .bind(starts_at)
    .bind(exclude_id)
    .bind(exclude_id)
    .fetch_optional(executor)
    .await
}

fn conflict_error(instance: &Event, existing: &Event) -> AppError {
    AppError::LocationTimeConflict(format!(
        "Window {} - {} overlaps '{}' ({} - {}) at the same location",
        instance.starts_at.to_rfc3339(),
        instance.ends_at.to_rfc3339(),
        existing.title,
        existing.starts_at.to_rfc3339(),
        existing.ends_at.to_rfc3339(),
    ))
}

#[async_trait]
impl EventRepository for SqliteEventRepo {
    async fn create_checked(&self, event: &Event) -> Result<Event, AppError> {
        match insert_checked(&self.pool, event).await.map_err(AppError::Database)? {
            Some(created) => Ok(created),
            None => {
                let location_id = event.location_id.as_deref().ok_or(AppError::Internal)?;
                let existing =
                    conflict_for(&self.pool, location_id, event.starts_at, event.ends_at, None)
                        .await
                        .map_err(AppError::Database)?
                        .ok_or(AppError::Internal)?;
                Err(conflict_error(event, &existing))
            }
        }
    }

    async fn create_series(&self, instances: &[Event]) -> Result<Vec<Event>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let mut created = Vec::with_capacity(instances.len());

        for instance in instances {
            match insert_checked(&mut *tx, instance).await.map_err(AppError::Database)? {
                Some(row) => created.push(row),
                None => {
                    // First conflicting instance aborts the whole series;
                    // dropping the transaction rolls back every insert so far.
                    let location_id = instance.location_id.as_deref().ok_or(AppError::Internal)?;
                    let existing = conflict_for(
                        &mut *tx,
                        location_id,
                        instance.starts_at,
                        instance.ends_at,
                        None,
                    )
                    .await
                    .map_err(AppError::Database)?
                    .ok_or(AppError::Internal)?;
                    return Err(conflict_error(instance, &existing));
                }
            }
        }

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }

    async fn update_checked(&self, event: &Event) -> Result<Event, AppError> {
        let updated = sqlx::query_as::<_, Event>(
            "UPDATE events \
                SET title = ?, description = ?, location_id = ?, starts_at = ?, ends_at = ?, \
                    capacity = ?, price = ?, is_free = ?, category = ? \
              WHERE id = ? \
                AND (? IS NULL \
                     OR NOT EXISTS (SELECT 1 FROM events \
                                     WHERE location_id = ? AND starts_at < ? AND ends_at > ? \
                                       AND id <> ?)) \
              RETURNING *",
        )
        .bind(&event.title)
        .bind(&event.description)
        .bind(&event.location_id)
        .bind(event.starts_at)
        .bind(event.ends_at)
        .bind(event.capacity)
        .bind(event.price)
        .bind(event.is_free)
        .bind(&event.category)
        .bind(&event.id)
        .bind(&event.location_id)
        .bind(&event.location_id)
        .bind(event.ends_at)
        .bind(event.starts_at)
        .bind(&event.id)
        .fetch_optional(&self.pool)
        .await
        .map_err(AppError::Database)?;

        match updated {
            Some(row) => Ok(row),
            None => {
                if self.find_by_id(&event.id).await?.is_none() {
                    return Err(AppError::NotFound("Event not found".into()));
                }
                let location_id = event.location_id.as_deref().ok_or(AppError::Internal)?;
                let existing = conflict_for(
                    &self.pool,
                    location_id,
                    event.starts_at,
                    event.ends_at,
                    Some(&event.id),
                )
                .await
                .map_err(AppError::Database)?
                .ok_or(AppError::Internal)?;
                Err(conflict_error(event, &existing))
            }
        }
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<Event>, AppError> {
        sqlx::query_as::<_, Event>("SELECT * FROM events WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn list(&self, free_only: bool) -> Result<Vec<Event>, AppError> {
        let query = if free_only {
            "SELECT * FROM events WHERE is_free = 1 ORDER BY starts_at ASC"
        } else {
            "SELECT * FROM events ORDER BY starts_at ASC"
        };
        sqlx::query_as::<_, Event>(query)
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_conflict(
        &self,
        location_id: &str,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
        exclude_id: Option<&str>,
    ) -> Result<Option<Event>, AppError> {
        conflict_for(&self.pool, location_id, starts_at, ends_at, exclude_id)
            .await
            .map_err(AppError::Database)
    }
}
