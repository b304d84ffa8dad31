use axum::routing::{get, post};
use axum::Router;
use sqlx::PgPool;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer};
use crate::handlers::{events, health_check, users};

#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

pub fn create_routes(state: AppState) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .route(
            "/events",
            get(events::list_events).post(events::create_event),
        )
        .route(
            "/events/:id",
            get(events::get_event)
                .put(events::update_event)
                .delete(events::delete_event),
        )
        .route("/events/:id/join", post(events::join_event))
        .route("/events/:id/leave", post(events::leave_event))
        .route("/users/me/events", get(users::list_created_events))
        .route("/users/me/joined", get(users::list_joined_events));

    apply_security_headers(router)
        .layer(TraceLayer::new_for_http())
        .layer(create_cors_layer())
        .with_state(state)
}
