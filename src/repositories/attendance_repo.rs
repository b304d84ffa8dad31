//! Repository for event membership.
//!
//! The `event_attendees` table is the single source of truth: an event's
//! attendee list and a user's joined-events list are both views over it, so
//! the two can never disagree.

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::event::Event;
use crate::repositories::event_repo::{EventRepo, COLUMNS};
use crate::utils::error::AppError;

pub struct AttendanceRepo;

impl AttendanceRepo {
    /// Join `user_id` to `event_id`, returning the refreshed event.
    ///
    /// The whole check-and-append runs in one transaction holding a row lock
    /// on the event, so concurrent joins serialize on the capacity check:
    /// two requests racing on the last slot resolve to exactly one success.
    pub async fn join(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<Event, AppError> {
        let mut tx = pool.begin().await?;

        // Lock the event row for the duration of the membership mutation.
        let capacity: Option<Option<i32>> =
            sqlx::query_scalar("SELECT max_attendees FROM events WHERE id = $1 FOR UPDATE")
                .bind(event_id)
                .fetch_optional(&mut *tx)
                .await?;
        let Some(max_attendees) = capacity else {
            return Err(AppError::NotFound(format!("Event {event_id} not found")));
        };

        let already_member: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM event_attendees WHERE event_id = $1 AND user_id = $2)",
        )
        .bind(event_id)
        .bind(user_id)
        .fetch_one(&mut *tx)
        .await?;
        if already_member {
            return Err(AppError::AlreadyMember);
        }

        if let Some(cap) = max_attendees {
            let count: i64 =
                sqlx::query_scalar("SELECT COUNT(*) FROM event_attendees WHERE event_id = $1")
                    .bind(event_id)
                    .fetch_one(&mut *tx)
                    .await?;
            if count >= i64::from(cap) {
                return Err(AppError::CapacityExceeded);
            }
        }

        sqlx::query("INSERT INTO event_attendees (event_id, user_id) VALUES ($1, $2)")
            .bind(event_id)
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        refreshed(pool, event_id).await
    }

    /// Remove `user_id` from `event_id`, returning the refreshed event.
    pub async fn leave(pool: &PgPool, event_id: Uuid, user_id: Uuid) -> Result<Event, AppError> {
        let event_exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
                .bind(event_id)
                .fetch_one(pool)
                .await?;
        if !event_exists {
            return Err(AppError::NotFound(format!("Event {event_id} not found")));
        }

        let result =
            sqlx::query("DELETE FROM event_attendees WHERE event_id = $1 AND user_id = $2")
                .bind(event_id)
                .bind(user_id)
                .execute(pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotMember);
        }

        refreshed(pool, event_id).await
    }

    /// Events `user_id` currently attends, newest first.
    pub async fn list_joined(pool: &PgPool, user_id: Uuid) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events \
             JOIN event_attendees ea ON ea.event_id = events.id \
             WHERE ea.user_id = $1 \
             ORDER BY date_time DESC, id DESC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(user_id)
            .fetch_all(pool)
            .await
    }
}

async fn refreshed(pool: &PgPool, event_id: Uuid) -> Result<Event, AppError> {
    EventRepo::find_by_id(pool, event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event {event_id} not found")))
}
