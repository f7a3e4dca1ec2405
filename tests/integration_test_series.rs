mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{create_event, create_location, error_kind, parse_body, TestApp, STAFF};
use serde_json::{json, Value};

fn series_payload(
    title: &str,
    location_id: Option<&str>,
    starts_at: chrono::DateTime<Utc>,
    weeks_out: i64,
) -> Value {
    json!({
        "title": title,
        "description": "weekly session",
        "location_id": location_id,
        "starts_at": starts_at.to_rfc3339(),
        "ends_at": (starts_at + Duration::hours(1)).to_rfc3339(),
        "capacity": 10,
        "recurrence": {
            "type": "weekly",
            "end_date": (starts_at + Duration::weeks(weeks_out)).date_naive(),
        },
    })
}

async fn instances_in_group(app: &TestApp, group_id: &str) -> Vec<(String, String)> {
    sqlx::query_as(
        "SELECT id, recurrence_kind FROM events WHERE group_id = ? ORDER BY starts_at",
    )
    .bind(group_id)
    .fetch_all(&app.pool)
    .await
    .unwrap()
}

#[tokio::test]
async fn weekly_series_expands_one_instance_per_week() {
    let app = TestApp::new().await;
    let starts_at = Utc::now() + Duration::hours(48);

    let res = app
        .request(
            "POST",
            "/api/v1/events",
            Some(STAFF),
            Some(series_payload("Yoga", None, starts_at, 3)),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first = parse_body(res).await;

    let group_id = first["group_id"].as_str().expect("series carries a group id");
    let instances = instances_in_group(&app, group_id).await;
    // Template week plus three more inclusive weeks.
    assert_eq!(instances.len(), 4);
    for (_, kind) in &instances {
        assert_eq!(kind, "weekly");
    }
    assert_eq!(first["id"].as_str().unwrap(), instances[0].0);
}

#[tokio::test]
async fn series_conflict_persists_nothing() {
    let app = TestApp::new().await;
    let location_id = create_location(&app, "Studio A").await;
    let starts_at = Utc::now() + Duration::hours(48);

    // Blocker sits in the window of the third weekly instance.
    let blocker_start = starts_at + Duration::weeks(2);
    let blocker = json!({
        "title": "Blocker",
        "description": "holds the room",
        "location_id": location_id,
        "starts_at": blocker_start.to_rfc3339(),
        "ends_at": (blocker_start + Duration::hours(1)).to_rfc3339(),
    });
    let res = app.request("POST", "/api/v1/events", Some(STAFF), Some(blocker)).await;
    assert_eq!(res.status(), StatusCode::CREATED);

    let res = app
        .request(
            "POST",
            "/api/v1/events",
            Some(STAFF),
            Some(series_payload("Yoga", Some(&location_id), starts_at, 3)),
        )
        .await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(error_kind(res).await, "location_time_conflict");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE title = 'Yoga'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 0, "no partial series may survive a conflict");
}

#[tokio::test]
async fn end_date_before_start_still_yields_the_template_instance() {
    let app = TestApp::new().await;
    let starts_at = Utc::now() + Duration::hours(48);

    let mut payload = series_payload("Lonely", None, starts_at, 0);
    payload["recurrence"]["end_date"] = json!((starts_at - Duration::weeks(1)).date_naive());

    let res = app.request("POST", "/api/v1/events", Some(STAFF), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first = parse_body(res).await;

    let instances = instances_in_group(&app, first["group_id"].as_str().unwrap()).await;
    assert_eq!(instances.len(), 1);
}

#[tokio::test]
async fn touching_windows_do_not_conflict() {
    let app = TestApp::new().await;
    let location_id = create_location(&app, "Studio B").await;

    let first = create_event(&app, "Morning", 48, 10, Some(&location_id)).await;
    let ends_at = first["ends_at"].as_str().unwrap();

    // Back-to-back: starts exactly when the previous one ends.
    let next = json!({
        "title": "Midday",
        "description": "back to back",
        "location_id": location_id,
        "starts_at": ends_at,
        "ends_at": (chrono::DateTime::parse_from_rfc3339(ends_at).unwrap() + Duration::hours(2)).to_rfc3339(),
    });
    let res = app.request("POST", "/api/v1/events", Some(STAFF), Some(next)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

#[tokio::test]
async fn overlapping_windows_at_the_same_location_conflict() {
    let app = TestApp::new().await;
    let location_id = create_location(&app, "Studio C").await;

    create_event(&app, "First", 48, 10, Some(&location_id)).await;

    let starts_at = Utc::now() + Duration::hours(49);
    let overlap = json!({
        "title": "Second",
        "description": "overlapping",
        "location_id": location_id,
        "starts_at": starts_at.to_rfc3339(),
        "ends_at": (starts_at + Duration::hours(1)).to_rfc3339(),
    });
    let res = app.request("POST", "/api/v1/events", Some(STAFF), Some(overlap)).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(error_kind(res).await, "location_time_conflict");
}

#[tokio::test]
async fn locationless_events_never_conflict() {
    let app = TestApp::new().await;
    create_event(&app, "Online A", 48, 10, None).await;
    // Same window, no location on either side.
    create_event(&app, "Online B", 48, 10, None).await;
}

#[tokio::test]
async fn unknown_recurrence_kind_falls_back_to_a_single_event() {
    let app = TestApp::new().await;
    let starts_at = Utc::now() + Duration::hours(48);

    let mut payload = series_payload("Oddball", None, starts_at, 3);
    payload["recurrence"]["type"] = json!("fortnightly");

    let res = app.request("POST", "/api/v1/events", Some(STAFF), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    let first = parse_body(res).await;
    assert!(first["group_id"].is_null());

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM events WHERE title = 'Oddball'")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn event_creation_is_staff_only() {
    let app = TestApp::new().await;
    let starts_at = Utc::now() + Duration::hours(48);
    let payload = json!({
        "title": "Nope",
        "description": "unauthorized",
        "starts_at": starts_at.to_rfc3339(),
        "ends_at": (starts_at + Duration::hours(1)).to_rfc3339(),
    });

    let res = app
        .request("POST", "/api/v1/events", Some(("mortal", false)), Some(payload.clone()))
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.request("POST", "/api/v1/events", None, Some(payload)).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn event_must_end_after_it_starts() {
    let app = TestApp::new().await;
    let starts_at = Utc::now() + Duration::hours(48);
    let payload = json!({
        "title": "Backwards",
        "description": "ends before it starts",
        "starts_at": starts_at.to_rfc3339(),
        "ends_at": (starts_at - Duration::hours(1)).to_rfc3339(),
    });

    let res = app.request("POST", "/api/v1/events", Some(STAFF), Some(payload)).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(error_kind(res).await, "validation");
}
