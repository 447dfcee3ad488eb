use std::collections::{BTreeSet, HashMap};

use chrono::{Datelike, NaiveDate};
use serde::Serialize;

use crate::{
    config::EngineConfig,
    error::EngineResult,
    models::{validate_bookings, validate_properties, Booking, Platform, Property, Window},
    services::{
        platform_rules::{allows_prepayment, anchor_date, deferral_rule, platforms},
        waterfall::{compute_breakdown, RevenueBreakdown, WaterfallTotals},
    },
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionQuery {
    pub window: Window,
    pub property_ids: Option<BTreeSet<String>>,
    pub platform: Option<Platform>,
    /// Lets cancelled bookings with a payment date into the cash view.
    pub include_cancelled_cash: bool,
    /// Fold deferred revenue of deferring platforms into the composed view.
    pub with_future: bool,
}

impl RecognitionQuery {
    pub fn new(window: Window) -> Self {
        Self {
            window,
            property_ids: None,
            platform: None,
            include_cancelled_cash: false,
            with_future: false,
        }
    }

    pub fn from_config(window: Window, config: &EngineConfig) -> Self {
        Self {
            include_cancelled_cash: config.cash_view_includes_cancelled,
            with_future: config.fold_deferred_into_operational,
            ..Self::new(window)
        }
    }

    pub fn properties<I, S>(mut self, property_ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.property_ids = Some(property_ids.into_iter().map(Into::into).collect());
        self
    }

    pub fn platform(mut self, platform: Platform) -> Self {
        self.platform = Some(platform);
        self
    }

    pub fn include_cancelled_cash(mut self, include: bool) -> Self {
        self.include_cancelled_cash = include;
        self
    }

    pub fn with_future(mut self, with_future: bool) -> Self {
        self.with_future = with_future;
        self
    }

    fn in_property_scope(&self, booking: &Booking) -> bool {
        self.property_ids
            .as_ref()
            .map_or(true, |ids| ids.contains(&booking.property_id))
    }

    fn in_platform_scope(&self, platform: Platform) -> bool {
        self.platform.map_or(true, |selected| selected == platform)
    }

    fn scoped_platforms(&self) -> Vec<Platform> {
        platforms()
            .filter(|platform| self.in_platform_scope(*platform))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecognitionBucket {
    Operational,
    Deferred,
    Excluded,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Classification {
    pub booking_id: String,
    pub platform: Platform,
    pub bucket: RecognitionBucket,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognizedLine {
    pub booking_id: String,
    pub property_id: String,
    pub platform: Platform,
    /// Anchor date for operational and deferred lines, payment date for cash.
    pub recognized_on: NaiveDate,
    pub payment_date: Option<NaiveDate>,
    pub breakdown: RevenueBreakdown,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlatformTotals {
    pub platform: Platform,
    pub totals: WaterfallTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueView {
    pub per_platform: Vec<PlatformTotals>,
    pub total: WaterfallTotals,
    pub lines: Vec<RecognizedLine>,
}

impl RevenueView {
    fn build(scoped_platforms: &[Platform], mut lines: Vec<RecognizedLine>) -> Self {
        lines.sort_by(|a, b| {
            a.recognized_on
                .cmp(&b.recognized_on)
                .then_with(|| a.booking_id.cmp(&b.booking_id))
        });

        let per_platform = scoped_platforms
            .iter()
            .map(|platform| PlatformTotals {
                platform: *platform,
                totals: lines
                    .iter()
                    .filter(|line| line.platform == *platform)
                    .map(|line| &line.breakdown)
                    .collect(),
            })
            .collect::<Vec<_>>();
        let total: WaterfallTotals = lines.iter().map(|line| &line.breakdown).collect();

        Self {
            per_platform,
            total,
            lines,
        }
    }

    pub fn totals_for(&self, platform: Platform) -> Option<&WaterfallTotals> {
        self.per_platform
            .iter()
            .find(|entry| entry.platform == platform)
            .map(|entry| &entry.totals)
    }

    pub fn contains(&self, booking_id: &str) -> bool {
        self.lines.iter().any(|line| line.booking_id == booking_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeferredView {
    #[serde(flatten)]
    pub view: RevenueView,
    pub next_expected_payment: Option<NaiveDate>,
    pub next_payment_period: Option<String>,
    pub awaiting_payment_date: usize,
}

/// Operational totals, optionally with deferred revenue folded in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComposedView {
    pub with_future: bool,
    pub folded_platforms: Vec<Platform>,
    pub per_platform: Vec<PlatformTotals>,
    pub total: WaterfallTotals,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecognitionReport {
    pub window: Window,
    pub platform_filter: Option<Platform>,
    pub operational: RevenueView,
    pub deferred: DeferredView,
    pub cash: RevenueView,
    pub composed: ComposedView,
    pub classifications: Vec<Classification>,
    pub missing_property_ids: Vec<String>,
    pub suspicious_prepayment_ids: Vec<String>,
}

impl RecognitionReport {
    pub fn bucket_of(&self, booking_id: &str) -> Option<RecognitionBucket> {
        self.classifications
            .iter()
            .find(|item| item.booking_id == booking_id)
            .map(|item| item.bucket)
    }
}

/// Whether deferred revenue of `platform` may be folded into the composed
/// view for a query narrowed to `filter`.
pub fn folds_deferred(platform: Platform, filter: Option<Platform>) -> bool {
    deferral_rule(platform) && filter != Some(platform)
}

pub fn recognize(
    bookings: &[Booking],
    properties: &[Property],
    query: &RecognitionQuery,
) -> EngineResult<RecognitionReport> {
    query.window.validate()?;
    validate_bookings(bookings)?;
    validate_properties(properties)?;

    let window = query.window;
    let catalog = properties
        .iter()
        .map(|property| (property.id.as_str(), property))
        .collect::<HashMap<_, _>>();
    let scoped_platforms = query.scoped_platforms();

    let mut buckets = vec![RecognitionBucket::Excluded; bookings.len()];
    let mut operational_lines = Vec::new();
    let mut deferred_lines = Vec::new();
    let mut missing_property_ids = BTreeSet::new();

    // One pass per platform: anchors differ, so a single date predicate
    // cannot select every platform's bookings at once.
    for platform in &scoped_platforms {
        let defers = deferral_rule(*platform);
        for (index, booking) in bookings.iter().enumerate() {
            if booking.platform != *platform
                || booking.is_cancelled()
                || !query.in_property_scope(booking)
            {
                continue;
            }
            let anchored_on = anchor_date(booking);
            if !window.contains(anchored_on) {
                continue;
            }

            let property = catalog.get(booking.property_id.as_str()).copied();
            if property.is_none() {
                missing_property_ids.insert(booking.property_id.clone());
            }
            let line = RecognizedLine {
                booking_id: booking.id.clone(),
                property_id: booking.property_id.clone(),
                platform: *platform,
                recognized_on: anchored_on,
                payment_date: booking.payment_date,
                breakdown: compute_breakdown(booking, property),
            };

            let paid_after_window = booking
                .payment_date
                .map_or(true, |paid_on| paid_on > window.end);
            if defers && paid_after_window {
                buckets[index] = RecognitionBucket::Deferred;
                deferred_lines.push(line);
            } else {
                buckets[index] = RecognitionBucket::Operational;
                operational_lines.push(line);
            }
        }
    }

    let mut cash_lines = Vec::new();
    for booking in bookings {
        if !query.in_property_scope(booking) || !query.in_platform_scope(booking.platform) {
            continue;
        }
        if booking.is_cancelled() && !query.include_cancelled_cash {
            continue;
        }
        let Some(paid_on) = booking.payment_date.filter(|paid_on| window.contains(*paid_on))
        else {
            continue;
        };
        let property = catalog.get(booking.property_id.as_str()).copied();
        if property.is_none() {
            missing_property_ids.insert(booking.property_id.clone());
        }
        cash_lines.push(RecognizedLine {
            booking_id: booking.id.clone(),
            property_id: booking.property_id.clone(),
            platform: booking.platform,
            recognized_on: paid_on,
            payment_date: booking.payment_date,
            breakdown: compute_breakdown(booking, property),
        });
    }

    let suspicious_prepayment_ids = bookings
        .iter()
        .filter(|booking| query.in_property_scope(booking))
        .filter(|booking| query.in_platform_scope(booking.platform))
        .filter(|booking| !allows_prepayment(booking.platform))
        .filter(|booking| {
            booking
                .payment_date
                .is_some_and(|paid_on| paid_on < booking.check_in_date)
        })
        .map(|booking| {
            tracing::warn!(
                booking_id = %booking.id,
                platform = %booking.platform,
                "Payment date precedes check-in on a platform without prepayment"
            );
            booking.id.clone()
        })
        .collect::<Vec<_>>();

    for property_id in &missing_property_ids {
        tracing::warn!(
            property_id = %property_id,
            "Booking references a property missing from the catalog; no cleaning fee or commission applied"
        );
    }

    let operational = RevenueView::build(&scoped_platforms, operational_lines);
    let deferred = deferred_view(RevenueView::build(&scoped_platforms, deferred_lines));
    let cash = RevenueView::build(&scoped_platforms, cash_lines);
    let composed = compose(&operational, &deferred.view, query);

    let classifications = bookings
        .iter()
        .zip(buckets)
        .map(|(booking, bucket)| Classification {
            booking_id: booking.id.clone(),
            platform: booking.platform,
            bucket,
        })
        .collect::<Vec<_>>();

    tracing::debug!(
        window_start = %window.start,
        window_end = %window.end,
        operational = operational.total.booking_count,
        deferred = deferred.view.total.booking_count,
        cash = cash.total.booking_count,
        "Recognized revenue"
    );

    Ok(RecognitionReport {
        window,
        platform_filter: query.platform,
        operational,
        deferred,
        cash,
        composed,
        classifications,
        missing_property_ids: missing_property_ids.into_iter().collect(),
        suspicious_prepayment_ids,
    })
}

pub fn recognize_from_config(
    bookings: &[Booking],
    properties: &[Property],
    window: Window,
    config: &EngineConfig,
) -> EngineResult<RecognitionReport> {
    recognize(
        bookings,
        properties,
        &RecognitionQuery::from_config(window, config),
    )
}

fn deferred_view(view: RevenueView) -> DeferredView {
    let next_expected_payment = view.lines.iter().filter_map(|line| line.payment_date).min();
    let awaiting_payment_date = view
        .lines
        .iter()
        .filter(|line| line.payment_date.is_none())
        .count();
    DeferredView {
        next_payment_period: next_expected_payment.map(payment_period_label),
        next_expected_payment,
        awaiting_payment_date,
        view,
    }
}

fn compose(
    operational: &RevenueView,
    deferred: &RevenueView,
    query: &RecognitionQuery,
) -> ComposedView {
    let mut per_platform = operational.per_platform.clone();
    let mut folded_platforms = Vec::new();

    if query.with_future {
        for entry in &mut per_platform {
            if !folds_deferred(entry.platform, query.platform) {
                continue;
            }
            if let Some(extra) = deferred.totals_for(entry.platform) {
                entry.totals.merge(extra);
                folded_platforms.push(entry.platform);
            }
        }
    }

    let mut total = WaterfallTotals::default();
    for entry in &per_platform {
        total.merge(&entry.totals);
    }

    ComposedView {
        with_future: query.with_future,
        folded_platforms,
        per_platform,
        total,
    }
}

fn payment_period_label(date: NaiveDate) -> String {
    format!("{} {}", month_name(date.month()), date.year())
}

fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        12 => "December",
        _ => "Unknown",
    }
}
