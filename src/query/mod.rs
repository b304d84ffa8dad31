//! Query planning for event listings.
//!
//! Everything in this module is pure: request parameters plus a caller-supplied
//! "now" map to an immutable [`EventFilter`] and [`PageParams`], which the
//! repository layer translates to SQL. Keeping the planner storage-free is what
//! makes the date-window arithmetic testable without a database.
//!
//! All calendar arithmetic is UTC: "today" is the current UTC calendar day,
//! weeks are Sunday-anchored, months are UTC calendar months.

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;

const DEFAULT_PAGE: i64 = 1;
const DEFAULT_LIMIT: i64 = 10;
const MAX_LIMIT: i64 = 100;

/// A named date bucket from the `date_filter` query parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateWindow {
    Today,
    CurrentWeek,
    LastWeek,
    CurrentMonth,
    LastMonth,
}

impl DateWindow {
    /// Unknown names yield `None`; callers treat that as "no date predicate".
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "today" => Some(DateWindow::Today),
            "current_week" => Some(DateWindow::CurrentWeek),
            "last_week" => Some(DateWindow::LastWeek),
            "current_month" => Some(DateWindow::CurrentMonth),
            "last_month" => Some(DateWindow::LastMonth),
            _ => None,
        }
    }

    /// Resolves the bucket to a half-open UTC interval `[start, end)`
    /// relative to `now`.
    pub fn resolve(self, now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
        let today = now.date_naive();
        let start_of = |date: chrono::NaiveDate| date.and_time(NaiveTime::MIN).and_utc();
        match self {
            DateWindow::Today => {
                let start = start_of(today);
                (start, start + Duration::days(1))
            }
            DateWindow::CurrentWeek => {
                let offset = today.weekday().num_days_from_sunday() as i64;
                let start = start_of(today - Duration::days(offset));
                (start, start + Duration::days(7))
            }
            DateWindow::LastWeek => {
                let offset = today.weekday().num_days_from_sunday() as i64;
                let week_start = start_of(today - Duration::days(offset));
                (week_start - Duration::days(7), week_start)
            }
            DateWindow::CurrentMonth => {
                let first = today.with_day(1).expect("day 1 exists in every month");
                let next = first
                    .checked_add_months(Months::new(1))
                    .expect("representable month");
                (start_of(first), start_of(next))
            }
            DateWindow::LastMonth => {
                let first = today.with_day(1).expect("day 1 exists in every month");
                let prev = first
                    .checked_sub_months(Months::new(1))
                    .expect("representable month");
                (start_of(prev), start_of(first))
            }
        }
    }
}

/// The date predicate of a listing, already resolved to concrete instants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateRange {
    /// No date predicate.
    Unbounded,
    /// Half-open `[start, end)`, from a named bucket.
    Window {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
    /// Inclusive `[start, end]`, from an explicit start/end pair.
    Explicit {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },
}

/// Raw listing parameters as they arrive on the query string.
///
/// `page` and `limit` are strings on purpose: malformed numbers are coerced to
/// defaults rather than rejected.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListEventsParams {
    pub search: Option<String>,
    pub date_filter: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

/// Immutable listing predicate: free-text search plus a date range.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventFilter {
    pub search: Option<String>,
    pub range: DateRange,
}

impl EventFilter {
    /// Builds the predicate from request parameters.
    ///
    /// An explicit `start_date`/`end_date` pair overrides any `date_filter`
    /// bucket; a malformed explicit date is a validation error, while an
    /// unknown bucket name is silently ignored.
    pub fn from_params(params: &ListEventsParams, now: DateTime<Utc>) -> Result<Self, AppError> {
        let search = params
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mut range = match params.date_filter.as_deref().and_then(DateWindow::parse) {
            Some(window) => {
                let (start, end) = window.resolve(now);
                DateRange::Window { start, end }
            }
            None => DateRange::Unbounded,
        };

        if let (Some(raw_start), Some(raw_end)) =
            (params.start_date.as_deref(), params.end_date.as_deref())
        {
            let start = parse_instant("start_date", raw_start)?;
            let end = parse_instant("end_date", raw_end)?;
            range = DateRange::Explicit { start, end };
        }

        Ok(EventFilter { search, range })
    }
}

fn parse_instant(field: &str, raw: &str) -> Result<DateTime<Utc>, AppError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            AppError::ValidationError(format!(
                "{} must be an RFC 3339 date-time, got '{}'",
                field, raw
            ))
        })
}

/// Sanitized pagination inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    pub page: i64,
    pub limit: i64,
}

impl Default for PageParams {
    fn default() -> Self {
        PageParams {
            page: DEFAULT_PAGE,
            limit: DEFAULT_LIMIT,
        }
    }
}

impl PageParams {
    /// Coerces raw query-string values: anything unparseable or non-positive
    /// falls back to the default, and `limit` is capped at [`MAX_LIMIT`].
    pub fn from_raw(page: Option<&str>, limit: Option<&str>) -> Self {
        let page = page
            .and_then(|p| p.trim().parse::<i64>().ok())
            .filter(|p| *p >= 1)
            .unwrap_or(DEFAULT_PAGE);
        let limit = limit
            .and_then(|l| l.trim().parse::<i64>().ok())
            .filter(|l| *l >= 1)
            .unwrap_or(DEFAULT_LIMIT)
            .min(MAX_LIMIT);
        PageParams { page, limit }
    }

    pub fn from_params(params: &ListEventsParams) -> Self {
        Self::from_raw(params.page.as_deref(), params.limit.as_deref())
    }

    /// Rows to skip before the current page.
    pub fn offset(&self) -> i64 {
        (self.page - 1) * self.limit
    }
}

/// Page bookkeeping returned alongside every listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Pagination {
    pub current: i64,
    pub pages: i64,
    pub total: i64,
}

impl Pagination {
    pub fn new(params: PageParams, total: i64) -> Self {
        Pagination {
            current: params.page,
            pages: (total + params.limit - 1) / params.limit,
            total,
        }
    }
}
