use std::collections::BTreeMap;

use serde::Serialize;

use crate::{
    config::clamp_turnover_hours,
    error::EngineResult,
    models::{validate_bookings, Booking},
    services::intervals::{hours_between, overlap_days},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    Overlap,
    ShortGap,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Conflict {
    pub property_id: String,
    pub kind: ConflictKind,
    pub booking_a: String,
    pub booking_b: String,
    pub detail: String,
    pub overlap_days: Option<i64>,
    pub gap_hours: Option<i64>,
}

/// Scans one property's non-cancelled stays in check-in order and reports
/// overlaps and turnovers shorter than `min_turnover_hours`.
pub fn detect_conflicts(
    property_id: &str,
    bookings: &[Booking],
    min_turnover_hours: i64,
) -> EngineResult<Vec<Conflict>> {
    validate_bookings(bookings)?;
    let min_turnover_hours = clamp_turnover_hours(min_turnover_hours);

    let mut timeline = bookings
        .iter()
        .filter(|booking| booking.property_id == property_id && !booking.is_cancelled())
        .collect::<Vec<_>>();
    timeline.sort_by(|a, b| {
        a.check_in_date
            .cmp(&b.check_in_date)
            .then_with(|| a.check_out_date.cmp(&b.check_out_date))
            .then_with(|| a.id.cmp(&b.id))
    });

    let mut conflicts = Vec::new();
    for pair in timeline.windows(2) {
        let (current, next) = (pair[0], pair[1]);
        if current.check_out_date > next.check_in_date {
            let shared = overlap_days(
                current.check_in_date,
                current.check_out_date,
                next.check_in_date,
                next.check_out_date,
            );
            conflicts.push(Conflict {
                property_id: property_id.to_string(),
                kind: ConflictKind::Overlap,
                booking_a: current.id.clone(),
                booking_b: next.id.clone(),
                detail: format!(
                    "Booking {} ({} to {}) overlaps booking {} ({} to {}) by {shared} night(s).",
                    current.id,
                    current.check_in_date,
                    current.check_out_date,
                    next.id,
                    next.check_in_date,
                    next.check_out_date,
                ),
                overlap_days: Some(shared),
                gap_hours: None,
            });
            continue;
        }

        let gap_hours = hours_between(current.check_out_date, next.check_in_date);
        if gap_hours < min_turnover_hours {
            conflicts.push(Conflict {
                property_id: property_id.to_string(),
                kind: ConflictKind::ShortGap,
                booking_a: current.id.clone(),
                booking_b: next.id.clone(),
                detail: format!(
                    "Only {gap_hours}h between checkout of {} on {} and check-in of {} on {}; at least {min_turnover_hours}h needed for cleaning.",
                    current.id, current.check_out_date, next.id, next.check_in_date,
                ),
                overlap_days: None,
                gap_hours: Some(gap_hours),
            });
        }
    }

    if !conflicts.is_empty() {
        tracing::debug!(
            property_id = %property_id,
            conflicts = conflicts.len(),
            "Detected scheduling conflicts"
        );
    }
    Ok(conflicts)
}

/// Runs the detector for every property present in `bookings`, in property
/// id order.
pub fn detect_all_conflicts(
    bookings: &[Booking],
    min_turnover_hours: i64,
) -> EngineResult<Vec<Conflict>> {
    validate_bookings(bookings)?;

    let mut by_property: BTreeMap<&str, Vec<Booking>> = BTreeMap::new();
    for booking in bookings {
        by_property
            .entry(booking.property_id.as_str())
            .or_default()
            .push(booking.clone());
    }

    let mut conflicts = Vec::new();
    for (property_id, property_bookings) in &by_property {
        conflicts.extend(detect_conflicts(
            property_id,
            property_bookings,
            min_turnover_hours,
        )?);
    }
    Ok(conflicts)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal_macros::dec;

    use super::{detect_all_conflicts, detect_conflicts, ConflictKind};
    use crate::{
        config::DEFAULT_TURNOVER_HOURS,
        models::{Booking, BookingStatus, Platform},
    };

    fn stay(id: &str, property_id: &str, check_in: &str, check_out: &str) -> Booking {
        Booking {
            id: id.to_string(),
            property_id: property_id.to_string(),
            platform: Platform::Direct,
            check_in_date: NaiveDate::parse_from_str(check_in, "%Y-%m-%d").expect("date"),
            check_out_date: NaiveDate::parse_from_str(check_out, "%Y-%m-%d").expect("date"),
            gross_revenue: dec!(100),
            payment_date: None,
            status: BookingStatus::Confirmed,
        }
    }

    #[test]
    fn reports_overlap() {
        let bookings = vec![
            stay("y", "p", "2024-01-04", "2024-01-08"),
            stay("x", "p", "2024-01-01", "2024-01-05"),
        ];
        let conflicts = detect_conflicts("p", &bookings, DEFAULT_TURNOVER_HOURS).expect("scan");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::Overlap);
        assert_eq!(conflicts[0].booking_a, "x");
        assert_eq!(conflicts[0].booking_b, "y");
        assert_eq!(conflicts[0].overlap_days, Some(1));
    }

    #[test]
    fn reports_same_day_turnover_as_short_gap() {
        let bookings = vec![
            stay("a", "p2", "2024-01-01", "2024-01-05"),
            stay("b", "p2", "2024-01-05", "2024-01-06"),
        ];
        let conflicts = detect_conflicts("p2", &bookings, DEFAULT_TURNOVER_HOURS).expect("scan");
        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].kind, ConflictKind::ShortGap);
        assert_eq!(conflicts[0].gap_hours, Some(0));
    }

    #[test]
    fn two_day_gap_is_fine() {
        let bookings = vec![
            stay("a", "p3", "2024-01-01", "2024-01-05"),
            stay("b", "p3", "2024-01-07", "2024-01-10"),
        ];
        let conflicts = detect_conflicts("p3", &bookings, DEFAULT_TURNOVER_HOURS).expect("scan");
        assert!(conflicts.is_empty());
    }

    #[test]
    fn longer_turnover_threshold_flags_one_day_gap() {
        let bookings = vec![
            stay("a", "p", "2024-01-01", "2024-01-05"),
            stay("b", "p", "2024-01-06", "2024-01-10"),
        ];
        assert!(detect_conflicts("p", &bookings, 24).expect("scan").is_empty());
        let strict = detect_conflicts("p", &bookings, 48).expect("scan");
        assert_eq!(strict.len(), 1);
        assert_eq!(strict[0].gap_hours, Some(24));
    }

    #[test]
    fn three_way_overlap_surfaces_every_stay() {
        let bookings = vec![
            stay("a", "p", "2024-01-01", "2024-01-10"),
            stay("b", "p", "2024-01-03", "2024-01-05"),
            stay("c", "p", "2024-01-04", "2024-01-12"),
        ];
        let conflicts = detect_conflicts("p", &bookings, DEFAULT_TURNOVER_HOURS).expect("scan");
        assert!(conflicts
            .iter()
            .all(|conflict| conflict.kind == ConflictKind::Overlap));
        let mut involved = conflicts
            .iter()
            .flat_map(|conflict| [conflict.booking_a.as_str(), conflict.booking_b.as_str()])
            .collect::<Vec<_>>();
        involved.sort_unstable();
        involved.dedup();
        assert_eq!(involved, vec!["a", "b", "c"]);
    }

    #[test]
    fn ignores_cancelled_and_other_properties() {
        let mut cancelled = stay("c", "p", "2024-01-03", "2024-01-06");
        cancelled.status = BookingStatus::Cancelled;
        let bookings = vec![
            stay("a", "p", "2024-01-01", "2024-01-05"),
            cancelled,
            stay("other", "q", "2024-01-02", "2024-01-04"),
        ];
        let conflicts = detect_conflicts("p", &bookings, DEFAULT_TURNOVER_HOURS).expect("scan");
        assert!(conflicts.is_empty());
    }

    #[test]
    fn scans_every_property_in_id_order() {
        let bookings = vec![
            stay("p2-a", "p2", "2024-01-01", "2024-01-05"),
            stay("p2-b", "p2", "2024-01-05", "2024-01-06"),
            stay("p1-x", "p1", "2024-01-01", "2024-01-05"),
            stay("p1-y", "p1", "2024-01-04", "2024-01-08"),
            stay("p3-a", "p3", "2024-01-01", "2024-01-05"),
            stay("p3-b", "p3", "2024-01-07", "2024-01-10"),
        ];
        let conflicts = detect_all_conflicts(&bookings, DEFAULT_TURNOVER_HOURS).expect("scan");
        let summary = conflicts
            .iter()
            .map(|conflict| (conflict.property_id.as_str(), conflict.kind))
            .collect::<Vec<_>>();
        assert_eq!(
            summary,
            vec![("p1", ConflictKind::Overlap), ("p2", ConflictKind::ShortGap)]
        );
    }

    #[test]
    fn rejects_invalid_stay() {
        let bookings = vec![stay("bad", "p", "2024-01-05", "2024-01-01")];
        let error = detect_conflicts("p", &bookings, DEFAULT_TURNOVER_HOURS).expect_err("invalid");
        assert_eq!(error.record_id(), Some("bad"));
    }
}
