use event_booking_backend::{
    api::router::create_router,
    config::Config,
    infra::factory::{build_state, run_migrations},
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request},
    Router,
};
use chrono::{Duration, Utc};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const STAFF: (&str, bool) = ("staff-1", true);

#[allow(dead_code)]
pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        run_migrations(&pool).await;

        let config = Config {
            database_url: db_url,
            port: 0,
        };

        let state = Arc::new(build_state(config, pool.clone()));
        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    pub async fn request(
        &self,
        method: &str,
        uri: &str,
        actor: Option<(&str, bool)>,
        body: Option<Value>,
    ) -> axum::response::Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some((id, staff)) = actor {
            builder = builder.header("x-actor-id", id);
            if staff {
                builder = builder.header("x-actor-staff", "true");
            }
        }
        let body = match body {
            Some(value) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(value.to_string())
            }
            None => Body::empty(),
        };
        self.router
            .clone()
            .oneshot(builder.body(body).unwrap())
            .await
            .unwrap()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

pub async fn parse_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[allow(dead_code)]
pub async fn error_kind(response: axum::response::Response) -> String {
    let body = parse_body(response).await;
    body["error"]["kind"].as_str().unwrap_or_default().to_string()
}

#[allow(dead_code)]
pub async fn create_location(app: &TestApp, name: &str) -> String {
    let res = app
        .request("POST", "/api/v1/locations", Some(STAFF), Some(json!({ "name": name })))
        .await;
    assert_eq!(res.status(), 201, "location create failed");
    parse_body(res).await["id"].as_str().unwrap().to_string()
}

/// A conflict-free staff-created event starting `starts_in_hours` from
/// now, lasting two hours.
#[allow(dead_code)]
pub async fn create_event(
    app: &TestApp,
    title: &str,
    starts_in_hours: i64,
    capacity: i32,
    location_id: Option<&str>,
) -> Value {
    let starts_at = Utc::now() + Duration::hours(starts_in_hours);
    let payload = json!({
        "title": title,
        "description": "test event",
        "location_id": location_id,
        "starts_at": starts_at.to_rfc3339(),
        "ends_at": (starts_at + Duration::hours(2)).to_rfc3339(),
        "capacity": capacity,
    });
    let res = app.request("POST", "/api/v1/events", Some(STAFF), Some(payload)).await;
    assert_eq!(res.status(), 201, "event create failed");
    parse_body(res).await
}

#[allow(dead_code)]
pub async fn book_as_user(
    app: &TestApp,
    event_id: &str,
    user_id: &str,
    guest_count: i32,
) -> axum::response::Response {
    app.request(
        "POST",
        &format!("/api/v1/events/{}/bookings", event_id),
        Some((user_id, false)),
        Some(json!({ "guest_count": guest_count })),
    )
    .await
}
