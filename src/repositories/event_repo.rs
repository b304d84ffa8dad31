//! Repository for the `events` table.

use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::event::{Event, EventPatch, NewEvent};
use crate::models::user::Actor;
use crate::query::{DateRange, EventFilter, PageParams};

/// Column list shared across queries. `attendee_count` is always derived from
/// the membership table, so it can never drift from the real attendee list.
pub(crate) const COLUMNS: &str = "id, creator_id, creator_name, title, description, location, \
     date_time, category, status, max_attendees, \
     (SELECT COUNT(*) FROM event_attendees a WHERE a.event_id = events.id) AS attendee_count, \
     created_at, updated_at";

/// Provides CRUD and listing operations for events.
pub struct EventRepo;

impl EventRepo {
    /// Insert a new event owned by `actor`, returning the created row.
    ///
    /// The creator's display name is copied in as a frozen snapshot.
    pub async fn create(
        pool: &PgPool,
        actor: &Actor,
        input: &NewEvent,
    ) -> Result<Event, sqlx::Error> {
        let query = format!(
            "INSERT INTO events \
                (creator_id, creator_name, title, description, location, date_time, category, max_attendees)
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(actor.id)
            .bind(&actor.name)
            .bind(&input.title)
            .bind(&input.description)
            .bind(&input.location)
            .bind(input.date_time)
            .bind(input.category)
            .bind(input.max_attendees)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM events WHERE id = $1");
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Run the planned listing: one count against the full predicate, one
    /// paged read ordered by `date_time DESC` with `id DESC` as a stable
    /// tie-break. Returns the page plus the pre-pagination total.
    pub async fn list(
        pool: &PgPool,
        filter: &EventFilter,
        page: PageParams,
    ) -> Result<(Vec<Event>, i64), sqlx::Error> {
        let mut count_query: QueryBuilder<Postgres> =
            QueryBuilder::new("SELECT COUNT(*) FROM events WHERE TRUE");
        push_predicate(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar().fetch_one(pool).await?;

        let mut page_query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {COLUMNS} FROM events WHERE TRUE"));
        push_predicate(&mut page_query, filter);
        page_query
            .push(" ORDER BY date_time DESC, id DESC LIMIT ")
            .push_bind(page.limit)
            .push(" OFFSET ")
            .push_bind(page.offset());
        let events = page_query
            .build_query_as::<Event>()
            .fetch_all(pool)
            .await?;

        Ok((events, total))
    }

    /// Apply a validated patch. Only non-`None` fields are written; the
    /// caller is responsible for the creator check.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: Uuid,
        patch: &EventPatch,
    ) -> Result<Option<Event>, sqlx::Error> {
        let query = format!(
            "UPDATE events SET
                title = COALESCE($2, title),
                description = COALESCE($3, description),
                location = COALESCE($4, location),
                date_time = COALESCE($5, date_time),
                category = COALESCE($6, category),
                updated_at = NOW()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(id)
            .bind(&patch.title)
            .bind(&patch.description)
            .bind(&patch.location)
            .bind(patch.date_time)
            .bind(patch.category)
            .fetch_optional(pool)
            .await
    }

    /// Delete an event. The membership table cascades, which also removes
    /// the event from every attendee's joined view in the same transaction.
    /// Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: Uuid) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Events owned by `creator_id`, newest first.
    pub async fn list_created(pool: &PgPool, creator_id: Uuid) -> Result<Vec<Event>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM events WHERE creator_id = $1 ORDER BY date_time DESC, id DESC"
        );
        sqlx::query_as::<_, Event>(&query)
            .bind(creator_id)
            .fetch_all(pool)
            .await
    }
}

/// Append the filter's WHERE clauses to a builder that already ends in a
/// complete boolean expression.
fn push_predicate(builder: &mut QueryBuilder<Postgres>, filter: &EventFilter) {
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (title ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR description ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    match filter.range {
        DateRange::Unbounded => {}
        DateRange::Window { start, end } => {
            builder
                .push(" AND date_time >= ")
                .push_bind(start)
                .push(" AND date_time < ")
                .push_bind(end);
        }
        DateRange::Explicit { start, end } => {
            builder
                .push(" AND date_time >= ")
                .push_bind(start)
                .push(" AND date_time <= ")
                .push_bind(end);
        }
    }
}

/// Escape `LIKE` metacharacters so search input is matched literally.
fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escape_like_handles_metacharacters() {
        assert_eq!(escape_like("100% rust_lang"), "100\\% rust\\_lang");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
        assert_eq!(escape_like("plain"), "plain");
    }
}
