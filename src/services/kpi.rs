use rust_decimal::Decimal;
use serde::Serialize;

use crate::services::{
    money::per_unit,
    occupancy::{aggregate_occupancy, OccupancyResult},
    recognition::RecognitionReport,
};

/// Headline figures for one window: occupancy, operational revenue, ADR and
/// RevPAR. ADR and RevPAR always use the operational view, whatever
/// `with_future` folded into the composed view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct KpiSummary {
    pub property_count: usize,
    pub occupancy_rate: f64,
    pub occupied_days: i64,
    pub available_days: i64,
    pub operational_gross: Decimal,
    pub operational_net: Decimal,
    pub deferred_net: Decimal,
    pub composed_net: Decimal,
    pub cash_net: Decimal,
    /// Average daily rate: operational gross per occupied day.
    pub average_daily_rate: Decimal,
    /// Operational gross per available day.
    pub revenue_per_available_day: Decimal,
}

pub fn summarize(report: &RecognitionReport, occupancy: &[OccupancyResult]) -> KpiSummary {
    let aggregate = aggregate_occupancy(occupancy);
    let operational_gross = report.operational.total.gross_revenue;

    KpiSummary {
        property_count: aggregate.property_count,
        occupancy_rate: aggregate.occupancy_rate,
        occupied_days: aggregate.occupied_days,
        available_days: aggregate.available_days,
        operational_gross,
        operational_net: report.operational.total.net_revenue,
        deferred_net: report.deferred.view.total.net_revenue,
        composed_net: report.composed.total.net_revenue,
        cash_net: report.cash.total.net_revenue,
        average_daily_rate: per_unit(operational_gross, aggregate.occupied_days),
        revenue_per_available_day: per_unit(operational_gross, aggregate.available_days),
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    use super::summarize;
    use crate::{
        models::{Booking, BookingStatus, Platform, Property, Window},
        services::{
            occupancy::compute_occupancy,
            recognition::{recognize, RecognitionQuery},
        },
    };

    fn date(raw: &str) -> NaiveDate {
        NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("valid date")
    }

    fn stay(
        id: &str,
        platform: Platform,
        check_in: &str,
        check_out: &str,
        gross: Decimal,
    ) -> Booking {
        Booking {
            id: id.to_string(),
            property_id: "p-1".to_string(),
            platform,
            check_in_date: date(check_in),
            check_out_date: date(check_out),
            gross_revenue: gross,
            payment_date: None,
            status: BookingStatus::Confirmed,
        }
    }

    fn catalog() -> Vec<Property> {
        vec![Property {
            id: "p-1".to_string(),
            name: None,
            cleaning_fee: dec!(0),
            commission_rate: dec!(0.1),
        }]
    }

    #[test]
    fn computes_adr_and_revpar() {
        let window = Window::new(date("2024-06-01"), date("2024-06-10")).expect("window");
        let mut paid = stay("bk-1", Platform::Airbnb, "2024-06-01", "2024-06-06", dec!(1000));
        paid.payment_date = Some(date("2024-06-02"));
        paid.status = BookingStatus::Finished;
        let bookings = vec![paid];

        let report =
            recognize(&bookings, &catalog(), &RecognitionQuery::new(window)).expect("report");
        let occupancy =
            compute_occupancy(&["p-1".to_string()], &bookings, &window).expect("occupancy");
        let kpi = summarize(&report, &occupancy);

        assert_eq!(kpi.occupied_days, 5);
        assert_eq!(kpi.available_days, 10);
        assert_eq!(kpi.occupancy_rate, 50.0);
        assert_eq!(kpi.average_daily_rate, dec!(200));
        assert_eq!(kpi.revenue_per_available_day, dec!(100));
        assert_eq!(kpi.operational_net, dec!(900));
        assert_eq!(kpi.cash_net, dec!(900));
    }

    #[test]
    fn folded_deferred_revenue_stays_out_of_operational_figures() {
        let window = Window::new(date("2024-06-01"), date("2024-06-10")).expect("window");
        let bookings = vec![
            stay("ab-1", Platform::Airbnb, "2024-06-01", "2024-06-06", dec!(1000)),
            // Checks out inside the window with no payout yet: deferred.
            stay("bc-1", Platform::BookingCom, "2024-06-06", "2024-06-08", dec!(500)),
        ];
        let query = RecognitionQuery::new(window).with_future(true);
        let report = recognize(&bookings, &catalog(), &query).expect("report");
        let occupancy =
            compute_occupancy(&["p-1".to_string()], &bookings, &window).expect("occupancy");
        let kpi = summarize(&report, &occupancy);

        assert_eq!(kpi.operational_gross, dec!(1000));
        assert_eq!(kpi.operational_net, dec!(900));
        assert_eq!(kpi.deferred_net, dec!(450));
        assert_eq!(kpi.composed_net, dec!(1350));
        assert_eq!(kpi.occupied_days, 7);
        assert_eq!(kpi.revenue_per_available_day, dec!(100));
    }

    #[test]
    fn empty_inputs_are_zero_safe() {
        let window = Window::month(2024, 6).expect("window");
        let report = recognize(&[], &[], &RecognitionQuery::new(window)).expect("report");
        let kpi = summarize(&report, &[]);
        assert_eq!(kpi.occupancy_rate, 0.0);
        assert_eq!(kpi.average_daily_rate, Decimal::ZERO);
        assert_eq!(kpi.revenue_per_available_day, Decimal::ZERO);
    }
}
