//! Authenticated-actor extraction.
//!
//! Credential verification belongs to the external authentication provider;
//! by the time a request reaches this service, the provider has resolved it
//! to a bearer subject (a user id). The extractor turns that subject into an
//! [`Actor`] by loading the account row, rejecting requests with no usable
//! identity.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use uuid::Uuid;

use crate::models::user::{Actor, User};
use crate::routes::AppState;
use crate::utils::error::AppError;

/// The authenticated user behind the current request.
///
/// Use as an extractor parameter in any handler that requires authentication:
///
/// ```ignore
/// async fn my_handler(CurrentUser(actor): CurrentUser) -> Response {
///     tracing::info!(user_id = %actor.id, "handling request");
///     ...
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentUser(pub Actor);

#[axum::async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Missing Authorization header".to_string()))?;

        let subject = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            AppError::AuthError("Invalid Authorization format. Expected: Bearer <token>".to_string())
        })?;

        let user_id: Uuid = subject
            .trim()
            .parse()
            .map_err(|_| AppError::AuthError("Invalid bearer subject".to_string()))?;

        let user = sqlx::query_as::<_, User>(
            "SELECT id, name, email, created_at, updated_at FROM users WHERE id = $1",
        )
        .bind(user_id)
        .fetch_optional(&state.pool)
        .await?
        .ok_or_else(|| AppError::AuthError("Unknown user".to_string()))?;

        Ok(CurrentUser(user.into()))
    }
}
