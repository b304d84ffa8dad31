//! Handlers for the authenticated user's own event views.

use axum::extract::State;
use axum::response::{IntoResponse, Response};

use crate::auth::CurrentUser;
use crate::repositories::{AttendanceRepo, EventRepo};
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::success;

/// GET /users/me/events
pub async fn list_created_events(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Response, AppError> {
    let events = EventRepo::list_created(&state.pool, actor.id).await?;
    Ok(success(events, "Created events retrieved").into_response())
}

/// GET /users/me/joined
pub async fn list_joined_events(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
) -> Result<Response, AppError> {
    let events = AttendanceRepo::list_joined(&state.pool, actor.id).await?;
    Ok(success(events, "Joined events retrieved").into_response())
}
