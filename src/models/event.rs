use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use std::str::FromStr;
use uuid::Uuid;

use crate::utils::error::AppError;

/// Bounds for the required text fields, applied after trimming.
const TITLE_LEN: (usize, usize) = (3, 100);
const DESCRIPTION_LEN: (usize, usize) = (10, 1000);
const LOCATION_LEN: (usize, usize) = (3, 200);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_category", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventCategory {
    Conference,
    Workshop,
    Meetup,
    Webinar,
    Social,
    Other,
}

impl Default for EventCategory {
    fn default() -> Self {
        EventCategory::Other
    }
}

impl FromStr for EventCategory {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "conference" => Ok(EventCategory::Conference),
            "workshop" => Ok(EventCategory::Workshop),
            "meetup" => Ok(EventCategory::Meetup),
            "webinar" => Ok(EventCategory::Webinar),
            "social" => Ok(EventCategory::Social),
            "other" => Ok(EventCategory::Other),
            _ => Err(AppError::ValidationError(format!(
                "Unknown category '{}'",
                s
            ))),
        }
    }
}

/// Descriptive only; no lifecycle driver changes this automatically.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "event_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Upcoming,
    Ongoing,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub creator_id: Uuid,
    /// Display name of the creator, frozen at creation time.
    pub creator_name: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub category: EventCategory,
    pub status: EventStatus,
    pub max_attendees: Option<i32>,
    /// Always computed from the membership table, never stored.
    pub attendee_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreateEventPayload {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub category: Option<String>,
    pub max_attendees: Option<i32>,
}

/// Capacity is fixed at creation; the update path only touches the
/// descriptive fields.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UpdateEventPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub category: Option<String>,
}

/// A fully validated create request: text trimmed, category resolved,
/// date checked against "now".
#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub location: String,
    pub date_time: DateTime<Utc>,
    pub category: EventCategory,
    pub max_attendees: Option<i32>,
}

/// A validated partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub date_time: Option<DateTime<Utc>>,
    pub category: Option<EventCategory>,
}

impl EventPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.location.is_none()
            && self.date_time.is_none()
            && self.category.is_none()
    }
}

fn validate_text(
    field: &str,
    value: &str,
    (min, max): (usize, usize),
) -> Result<String, AppError> {
    let trimmed = value.trim();
    let len = trimmed.chars().count();
    if len < min || len > max {
        return Err(AppError::ValidationError(format!(
            "{} must be between {} and {} characters",
            field, min, max
        )));
    }
    Ok(trimmed.to_string())
}

fn validate_date_time(date_time: DateTime<Utc>, now: DateTime<Utc>) -> Result<(), AppError> {
    if date_time <= now {
        return Err(AppError::ValidationError(
            "date_time must be in the future".to_string(),
        ));
    }
    Ok(())
}

fn validate_max_attendees(max_attendees: i32) -> Result<(), AppError> {
    if max_attendees < 1 {
        return Err(AppError::ValidationError(
            "max_attendees must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

impl CreateEventPayload {
    pub fn validate(self, now: DateTime<Utc>) -> Result<NewEvent, AppError> {
        let title = validate_text("title", &self.title, TITLE_LEN)?;
        let description = validate_text("description", &self.description, DESCRIPTION_LEN)?;
        let location = validate_text("location", &self.location, LOCATION_LEN)?;
        validate_date_time(self.date_time, now)?;
        let category = match self.category.as_deref() {
            Some(raw) => raw.parse()?,
            None => EventCategory::default(),
        };
        if let Some(max) = self.max_attendees {
            validate_max_attendees(max)?;
        }
        Ok(NewEvent {
            title,
            description,
            location,
            date_time: self.date_time,
            category,
            max_attendees: self.max_attendees,
        })
    }
}

impl UpdateEventPayload {
    /// Validates only the fields that are present, with the same constraints
    /// as creation.
    pub fn validate(self, now: DateTime<Utc>) -> Result<EventPatch, AppError> {
        let title = self
            .title
            .map(|t| validate_text("title", &t, TITLE_LEN))
            .transpose()?;
        let description = self
            .description
            .map(|d| validate_text("description", &d, DESCRIPTION_LEN))
            .transpose()?;
        let location = self
            .location
            .map(|l| validate_text("location", &l, LOCATION_LEN))
            .transpose()?;
        if let Some(date_time) = self.date_time {
            validate_date_time(date_time, now)?;
        }
        let category = self
            .category
            .as_deref()
            .map(EventCategory::from_str)
            .transpose()?;
        Ok(EventPatch {
            title,
            description,
            location,
            date_time: self.date_time,
            category,
        })
    }
}
