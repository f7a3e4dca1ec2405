mod common;

use axum::http::StatusCode;
use common::{book_as_user, create_event, error_kind, parse_body, TestApp, STAFF};
use serde_json::Value;

async fn booked_event(app: &TestApp, starts_in_hours: i64, user_id: &str) -> Value {
    let event = create_event(app, "Lifecycle", starts_in_hours, 10, None).await;
    let res = book_as_user(app, event["id"].as_str().unwrap(), user_id, 1).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    parse_body(res).await
}

#[tokio::test]
async fn owner_cancels_well_before_the_event() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 48, "u1").await;
    let uri = format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap());

    let res = app.request("DELETE", &uri, Some(("u1", false)), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["status"], "cancelled");
    assert!(body["cancelled_at"].is_string());
}

#[tokio::test]
async fn cancelling_twice_returns_the_settled_state() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 48, "u1").await;
    let uri = format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap());

    let first = parse_body(app.request("DELETE", &uri, Some(("u1", false)), None).await).await;

    let res = app.request("DELETE", &uri, Some(("u1", false)), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let second = parse_body(res).await;
    assert_eq!(second["status"], "cancelled");
    assert_eq!(second["cancelled_at"], first["cancelled_at"]);
}

#[tokio::test]
async fn cancellation_window_closes_24_hours_out() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 23, "u1").await;
    let uri = format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap());

    let res = app.request("DELETE", &uri, Some(("u1", false)), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(error_kind(res).await, "cancellation_window_closed");
}

#[tokio::test]
async fn cancellation_is_allowed_just_outside_the_window() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 26, "u1").await;
    let uri = format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap());

    let res = app.request("DELETE", &uri, Some(("u1", false)), None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn only_the_owner_or_staff_may_cancel() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 48, "u1").await;
    let uri = format!("/api/v1/bookings/{}", booking["id"].as_str().unwrap());

    let res = app.request("DELETE", &uri, Some(("intruder", false)), None).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);

    let res = app.request("DELETE", &uri, None, None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.request("DELETE", &uri, Some(STAFF), None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn check_in_happy_path_then_repeat_is_rejected() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 48, "u1").await;
    let code = booking["confirmation_code"].as_str().unwrap();
    let uri = format!("/api/v1/check-in/{}", code);

    let res = app.request("POST", &uri, Some(STAFF), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["checked_in"], true);
    assert!(body["checked_in_at"].is_string());

    let res = app.request("POST", &uri, Some(STAFF), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(error_kind(res).await, "already_checked_in");
}

#[tokio::test]
async fn cancelled_booking_cannot_check_in() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 48, "u1").await;
    let booking_id = booking["id"].as_str().unwrap();
    let code = booking["confirmation_code"].as_str().unwrap();

    let res = app
        .request("DELETE", &format!("/api/v1/bookings/{}", booking_id), Some(("u1", false)), None)
        .await;
    assert_eq!(res.status(), StatusCode::OK);

    let res = app.request("POST", &format!("/api/v1/check-in/{}", code), Some(STAFF), None).await;
    assert_eq!(res.status(), StatusCode::CONFLICT);
    assert_eq!(error_kind(res).await, "not_confirmed");
}

#[tokio::test]
async fn unknown_code_is_not_found_and_desk_is_staff_only() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 48, "u1").await;
    let code = booking["confirmation_code"].as_str().unwrap();

    let res = app.request("POST", "/api/v1/check-in/ZZZZ9999", Some(STAFF), None).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let res = app
        .request("POST", &format!("/api/v1/check-in/{}", code), Some(("u1", false)), None)
        .await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn check_in_accepts_lowercase_codes() {
    let app = TestApp::new().await;
    let booking = booked_event(&app, 48, "u1").await;
    let code = booking["confirmation_code"].as_str().unwrap().to_lowercase();

    let res = app.request("POST", &format!("/api/v1/check-in/{}", code), Some(STAFF), None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn booking_views_split_upcoming_from_history() {
    let app = TestApp::new().await;
    let upcoming = booked_event(&app, 48, "u1").await;
    let cancelled = booked_event(&app, 72, "u1").await;

    let uri = format!("/api/v1/bookings/{}", cancelled["id"].as_str().unwrap());
    app.request("DELETE", &uri, Some(("u1", false)), None).await;

    let res = app.request("GET", "/api/v1/bookings", Some(("u1", false)), None).await;
    assert_eq!(res.status(), StatusCode::OK);
    let list = parse_body(res).await;
    let ids: Vec<&str> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|b| b["id"].as_str().unwrap())
        .collect();
    assert!(ids.contains(&upcoming["id"].as_str().unwrap()));
    assert!(!ids.contains(&cancelled["id"].as_str().unwrap()));

    let res = app.request("GET", "/api/v1/bookings/history", Some(("u1", false)), None).await;
    let history = parse_body(res).await;
    assert_eq!(history.as_array().unwrap().len(), 2);
}
