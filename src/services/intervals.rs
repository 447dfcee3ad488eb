use chrono::{DateTime, Datelike, NaiveDate};

use crate::error::{EngineError, EngineResult};

fn day_number(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce())
}

pub fn parse_iso_date(value: &str) -> EngineResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| EngineError::BadRequest(format!("Invalid ISO date '{}'.", value.trim())))
}

/// Accepts `YYYY-MM-DD` or an RFC 3339 timestamp (reduced to its date).
pub fn parse_date_or_timestamp(value: &str) -> EngineResult<NaiveDate> {
    let trimmed = value.trim();
    parse_iso_date(trimmed).or_else(|_| {
        DateTime::parse_from_rfc3339(trimmed)
            .map(|timestamp| timestamp.date_naive())
            .map_err(|_| EngineError::BadRequest(format!("Invalid date '{trimmed}'.")))
    })
}

pub fn nights(start: NaiveDate, end: NaiveDate) -> i64 {
    (day_number(end) - day_number(start)).max(0)
}

pub fn hours_between(earlier: NaiveDate, later: NaiveDate) -> i64 {
    (day_number(later) - day_number(earlier)) * 24
}

/// Whole days shared by the half-open intervals `[a_start, a_end)` and
/// `[b_start, b_end)`. The checkout day itself is never occupied.
pub fn overlap_days(
    a_start: NaiveDate,
    a_end: NaiveDate,
    b_start: NaiveDate,
    b_end: NaiveDate,
) -> i64 {
    let start = day_number(a_start).max(day_number(b_start));
    let end = day_number(a_end).min(day_number(b_end));
    (end - start).max(0)
}

/// Distinct days inside the inclusive window covered by at least one of the
/// half-open `[check_in, check_out)` intervals.
pub fn union_occupied_days(
    intervals: &[(NaiveDate, NaiveDate)],
    window_start: NaiveDate,
    window_end: NaiveDate,
) -> i64 {
    let clip_start = day_number(window_start);
    // The window end is inclusive, so the exclusive bound is the day after.
    let clip_end = day_number(window_end) + 1;

    let mut clipped = intervals
        .iter()
        .map(|(start, end)| {
            (
                day_number(*start).max(clip_start),
                day_number(*end).min(clip_end),
            )
        })
        .filter(|(start, end)| end > start)
        .collect::<Vec<_>>();
    clipped.sort_unstable();

    let mut total = 0_i64;
    let mut current: Option<(i64, i64)> = None;
    for (start, end) in clipped {
        current = match current {
            Some((run_start, run_end)) if start <= run_end => Some((run_start, run_end.max(end))),
            Some((run_start, run_end)) => {
                total += run_end - run_start;
                Some((start, end))
            }
            None => Some((start, end)),
        };
    }
    if let Some((run_start, run_end)) = current {
        total += run_end - run_start;
    }
    total
}
