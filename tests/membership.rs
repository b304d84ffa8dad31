//! Database-backed tests for event membership: join/leave state transitions,
//! the capacity ceiling, and cascade behaviour on event deletion.

use chrono::{Duration, Utc};
use eventory_server::models::event::{Event, EventCategory, NewEvent};
use eventory_server::models::user::{Actor, User};
use eventory_server::repositories::{AttendanceRepo, EventRepo};
use eventory_server::utils::error::AppError;
use sqlx::PgPool;
use uuid::Uuid;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Insert a user row directly and return it as an actor.
async fn create_actor(pool: &PgPool, name: &str) -> Actor {
    let user = sqlx::query_as::<_, User>(
        "INSERT INTO users (name, email) VALUES ($1, $2) \
         RETURNING id, name, email, created_at, updated_at",
    )
    .bind(name)
    .bind(format!("{name}@example.com"))
    .fetch_one(pool)
    .await
    .expect("user creation should succeed");
    user.into()
}

/// Create a future-dated event owned by `creator`.
async fn create_event(pool: &PgPool, creator: &Actor, max_attendees: Option<i32>) -> Event {
    let input = NewEvent {
        title: "Monthly community meetup".to_string(),
        description: "An evening of talks and open discussion".to_string(),
        location: "Community Hall".to_string(),
        date_time: Utc::now() + Duration::days(7),
        category: EventCategory::Meetup,
        max_attendees,
    };
    EventRepo::create(pool, creator, &input)
        .await
        .expect("event creation should succeed")
}

/// Ids of the events `user_id` currently attends, from the joined view.
async fn joined_event_ids(pool: &PgPool, user_id: Uuid) -> Vec<Uuid> {
    AttendanceRepo::list_joined(pool, user_id)
        .await
        .expect("joined listing should succeed")
        .into_iter()
        .map(|e| e.id)
        .collect()
}

// ---------------------------------------------------------------------------
// Join
// ---------------------------------------------------------------------------

/// Joining appends the member and the joined view reflects it; the count
/// always equals the size of the attendee set.
#[sqlx::test(migrations = "./migrations")]
async fn join_adds_member_and_updates_joined_view(pool: PgPool) {
    let creator = create_actor(&pool, "creator").await;
    let attendee = create_actor(&pool, "attendee").await;
    let event = create_event(&pool, &creator, None).await;

    let joined = AttendanceRepo::join(&pool, event.id, attendee.id)
        .await
        .expect("first join should succeed");

    assert_eq!(joined.attendee_count, 1);
    assert_eq!(joined_event_ids(&pool, attendee.id).await, vec![event.id]);
}

/// A second join by the same user fails with ALREADY_MEMBER and leaves the
/// membership untouched.
#[sqlx::test(migrations = "./migrations")]
async fn join_twice_fails_with_already_member(pool: PgPool) {
    let creator = create_actor(&pool, "creator").await;
    let attendee = create_actor(&pool, "attendee").await;
    let event = create_event(&pool, &creator, None).await;

    AttendanceRepo::join(&pool, event.id, attendee.id)
        .await
        .expect("first join should succeed");
    let err = AttendanceRepo::join(&pool, event.id, attendee.id)
        .await
        .expect_err("second join must fail");

    assert!(matches!(err, AppError::AlreadyMember));
    let refreshed = EventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.attendee_count, 1);
}

/// Joining an event sitting at its capacity ceiling fails with EVENT_FULL
/// and the attendee set is unchanged.
#[sqlx::test(migrations = "./migrations")]
async fn join_at_capacity_fails_with_event_full(pool: PgPool) {
    let creator = create_actor(&pool, "creator").await;
    let first = create_actor(&pool, "first").await;
    let second = create_actor(&pool, "second").await;
    let event = create_event(&pool, &creator, Some(1)).await;

    AttendanceRepo::join(&pool, event.id, first.id)
        .await
        .expect("join up to capacity should succeed");
    let err = AttendanceRepo::join(&pool, event.id, second.id)
        .await
        .expect_err("join beyond capacity must fail");

    assert!(matches!(err, AppError::CapacityExceeded));
    let refreshed = EventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.attendee_count, 1);
    assert!(joined_event_ids(&pool, second.id).await.is_empty());
}

/// Joining an event that does not exist fails with NOT_FOUND.
#[sqlx::test(migrations = "./migrations")]
async fn join_unknown_event_fails_with_not_found(pool: PgPool) {
    let attendee = create_actor(&pool, "attendee").await;

    let err = AttendanceRepo::join(&pool, Uuid::new_v4(), attendee.id)
        .await
        .expect_err("join must fail");

    assert!(matches!(err, AppError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Leave
// ---------------------------------------------------------------------------

/// Leaving removes the member from both the attendee set and the joined view.
#[sqlx::test(migrations = "./migrations")]
async fn leave_removes_member_from_both_views(pool: PgPool) {
    let creator = create_actor(&pool, "creator").await;
    let attendee = create_actor(&pool, "attendee").await;
    let event = create_event(&pool, &creator, None).await;

    AttendanceRepo::join(&pool, event.id, attendee.id)
        .await
        .expect("join should succeed");
    let left = AttendanceRepo::leave(&pool, event.id, attendee.id)
        .await
        .expect("leave should succeed");

    assert_eq!(left.attendee_count, 0);
    assert!(joined_event_ids(&pool, attendee.id).await.is_empty());
}

/// Leaving an event the user never joined fails with NOT_MEMBER and changes
/// nothing.
#[sqlx::test(migrations = "./migrations")]
async fn leave_as_non_member_fails_with_not_member(pool: PgPool) {
    let creator = create_actor(&pool, "creator").await;
    let attendee = create_actor(&pool, "attendee").await;
    let outsider = create_actor(&pool, "outsider").await;
    let event = create_event(&pool, &creator, None).await;

    AttendanceRepo::join(&pool, event.id, attendee.id)
        .await
        .expect("join should succeed");
    let err = AttendanceRepo::leave(&pool, event.id, outsider.id)
        .await
        .expect_err("leave must fail");

    assert!(matches!(err, AppError::NotMember));
    let refreshed = EventRepo::find_by_id(&pool, event.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.attendee_count, 1);
}

// ---------------------------------------------------------------------------
// Delete cascade
// ---------------------------------------------------------------------------

/// Deleting an event removes it from the creator's created view and from
/// every attendee's joined view.
#[sqlx::test(migrations = "./migrations")]
async fn delete_prunes_created_and_joined_views(pool: PgPool) {
    let creator = create_actor(&pool, "creator").await;
    let first = create_actor(&pool, "first").await;
    let second = create_actor(&pool, "second").await;
    let event = create_event(&pool, &creator, None).await;

    AttendanceRepo::join(&pool, event.id, first.id)
        .await
        .expect("join should succeed");
    AttendanceRepo::join(&pool, event.id, second.id)
        .await
        .expect("join should succeed");

    let deleted = EventRepo::delete(&pool, event.id)
        .await
        .expect("delete should succeed");
    assert!(deleted);

    let created = EventRepo::list_created(&pool, creator.id)
        .await
        .expect("created listing should succeed");
    assert!(created.is_empty());
    assert!(joined_event_ids(&pool, first.id).await.is_empty());
    assert!(joined_event_ids(&pool, second.id).await.is_empty());
}
