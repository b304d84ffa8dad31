//! Handlers for the `/events` resource.

use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::auth::CurrentUser;
use crate::models::event::{CreateEventPayload, Event, UpdateEventPayload};
use crate::query::{EventFilter, ListEventsParams, PageParams, Pagination};
use crate::repositories::{AttendanceRepo, EventRepo};
use crate::routes::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, empty_success, success};

#[derive(Serialize)]
struct EventListData {
    events: Vec<Event>,
    pagination: Pagination,
}

/// GET /events
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<ListEventsParams>,
) -> Result<Response, AppError> {
    let filter = EventFilter::from_params(&params, Utc::now())?;
    let page = PageParams::from_params(&params);

    let (events, total) = EventRepo::list(&state.pool, &filter, page).await?;
    let data = EventListData {
        events,
        pagination: Pagination::new(page, total),
    };

    Ok(success(data, "Events retrieved").into_response())
}

/// GET /events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = find_event(&state, id).await?;
    Ok(success(event, "Event retrieved").into_response())
}

/// POST /events
pub async fn create_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Json(payload): Json<CreateEventPayload>,
) -> Result<Response, AppError> {
    let new_event = payload.validate(Utc::now())?;
    let event = EventRepo::create(&state.pool, &actor, &new_event).await?;

    tracing::info!(event_id = %event.id, creator_id = %actor.id, "Event created");
    Ok(created(event, "Event created").into_response())
}

/// PUT /events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEventPayload>,
) -> Result<Response, AppError> {
    let existing = find_event(&state, id).await?;
    require_creator(&existing, actor.id)?;

    let patch = payload.validate(Utc::now())?;
    if patch.is_empty() {
        return Ok(success(existing, "Event updated").into_response());
    }

    let event = EventRepo::update(&state.pool, id, &patch)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))?;

    Ok(success(event, "Event updated").into_response())
}

/// DELETE /events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let existing = find_event(&state, id).await?;
    require_creator(&existing, actor.id)?;

    EventRepo::delete(&state.pool, id).await?;

    tracing::info!(event_id = %id, creator_id = %actor.id, "Event deleted");
    Ok(empty_success("Event deleted").into_response())
}

/// POST /events/{id}/join
pub async fn join_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = AttendanceRepo::join(&state.pool, id, actor.id).await?;

    tracing::info!(event_id = %id, user_id = %actor.id, "User joined event");
    Ok(success(event, "Joined event").into_response())
}

/// POST /events/{id}/leave
pub async fn leave_event(
    State(state): State<AppState>,
    CurrentUser(actor): CurrentUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = AttendanceRepo::leave(&state.pool, id, actor.id).await?;

    tracing::info!(event_id = %id, user_id = %actor.id, "User left event");
    Ok(success(event, "Left event").into_response())
}

async fn find_event(state: &AppState, id: Uuid) -> Result<Event, AppError> {
    EventRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {id} not found")))
}

fn require_creator(event: &Event, actor_id: Uuid) -> Result<(), AppError> {
    if event.creator_id != actor_id {
        return Err(AppError::Forbidden(
            "Only the event creator can modify this event".to_string(),
        ));
    }
    Ok(())
}
