use axum::{extract::FromRequestParts, http::request::Parts};
use crate::domain::models::actor::Actor;
use crate::error::AppError;

// Identity is established upstream; the trusted proxy layer forwards the
// authenticated actor as plain headers. The core never sees credentials.
pub const ACTOR_ID_HEADER: &str = "x-actor-id";
pub const ACTOR_STAFF_HEADER: &str = "x-actor-staff";

fn actor_from_parts(parts: &Parts) -> Option<Actor> {
    let user_id = parts
        .headers
        .get(ACTOR_ID_HEADER)?
        .to_str()
        .ok()?
        .trim()
        .to_string();
    if user_id.is_empty() {
        return None;
    }
    let is_staff = parts
        .headers
        .get(ACTOR_STAFF_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
        .unwrap_or(false);
    Some(Actor { user_id, is_staff })
}

impl<S> FromRequestParts<S> for Actor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        actor_from_parts(parts).ok_or(AppError::Unauthorized)
    }
}

pub struct StaffActor(pub Actor);

impl<S> FromRequestParts<S> for StaffActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let actor = actor_from_parts(parts).ok_or(AppError::Unauthorized)?;
        if !actor.is_staff {
            return Err(AppError::Forbidden("Staff only".into()));
        }
        Ok(StaffActor(actor))
    }
}

/// Anonymous callers are allowed on the guest booking channel.
pub struct MaybeActor(pub Option<Actor>);

impl<S> FromRequestParts<S> for MaybeActor
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(MaybeActor(actor_from_parts(parts)))
    }
}
