use serde::Serialize;

use crate::{
    error::EngineResult,
    models::{validate_bookings, Booking, Window},
    services::{intervals::union_occupied_days, money::percentage},
};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccupancyResult {
    pub property_id: String,
    pub occupied_days: i64,
    pub total_days: i64,
    /// Days of the window not covered by any stay.
    pub vacant_days: i64,
    pub booking_count: usize,
    pub occupancy_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateOccupancy {
    pub property_count: usize,
    pub occupied_days: i64,
    /// Window days summed over every property, the occupancy denominator.
    pub available_days: i64,
    pub occupancy_rate: f64,
}

/// Per-property occupancy over the window, cancelled stays excluded and
/// overlapping stays counted once.
pub fn compute_occupancy(
    property_ids: &[String],
    bookings: &[Booking],
    window: &Window,
) -> EngineResult<Vec<OccupancyResult>> {
    window.validate()?;
    validate_bookings(bookings)?;

    let total_days = window.total_days();
    let results = property_ids
        .iter()
        .map(|property_id| {
            let intervals = bookings
                .iter()
                .filter(|booking| booking.property_id == *property_id && !booking.is_cancelled())
                .filter(|booking| {
                    booking.check_out_date > window.start && booking.check_in_date <= window.end
                })
                .map(|booking| (booking.check_in_date, booking.check_out_date))
                .collect::<Vec<_>>();
            let occupied_days = union_occupied_days(&intervals, window.start, window.end);

            OccupancyResult {
                property_id: property_id.clone(),
                occupied_days,
                total_days,
                vacant_days: total_days - occupied_days,
                booking_count: intervals.len(),
                occupancy_rate: percentage(occupied_days, total_days),
            }
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        properties = results.len(),
        window_start = %window.start,
        window_end = %window.end,
        "Computed occupancy"
    );
    Ok(results)
}

/// `sum(occupied) / (total_days * property_count)`, 0 with no properties.
pub fn aggregate_occupancy(results: &[OccupancyResult]) -> AggregateOccupancy {
    let occupied_days = results.iter().map(|result| result.occupied_days).sum::<i64>();
    let available_days = results.iter().map(|result| result.total_days).sum::<i64>();
    AggregateOccupancy {
        property_count: results.len(),
        occupied_days,
        available_days,
        occupancy_rate: percentage(occupied_days, available_days),
    }
}
