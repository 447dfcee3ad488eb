use rust_decimal::Decimal;
use serde::Serialize;

use crate::models::{Booking, Property};

/// gross -> base -> commission -> net for a single booking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RevenueBreakdown {
    pub gross_revenue: Decimal,
    pub cleaning_fee: Decimal,
    pub base_revenue: Decimal,
    pub commission_rate: Decimal,
    pub commission_amount: Decimal,
    /// Raw net, negative when the cleaning fee exceeds the gross.
    pub net_revenue: Decimal,
    pub property_missing: bool,
}

impl RevenueBreakdown {
    pub fn net_revenue_display(&self) -> Decimal {
        self.net_revenue.max(Decimal::ZERO)
    }

    pub fn is_net_negative(&self) -> bool {
        self.net_revenue < Decimal::ZERO
    }

    pub fn reconciles(&self) -> bool {
        self.gross_revenue == self.base_revenue + self.cleaning_fee
            && self.base_revenue == self.commission_amount + self.net_revenue
    }
}

/// A missing property contributes no cleaning fee and no commission.
pub fn compute_breakdown(booking: &Booking, property: Option<&Property>) -> RevenueBreakdown {
    let (cleaning_fee, commission_rate) = property
        .map(|property| (property.cleaning_fee, property.commission_rate))
        .unwrap_or((Decimal::ZERO, Decimal::ZERO));

    let gross_revenue = booking.gross_revenue;
    let base_revenue = gross_revenue - cleaning_fee;
    let commission_amount = base_revenue * commission_rate;
    let net_revenue = base_revenue - commission_amount;

    RevenueBreakdown {
        gross_revenue,
        cleaning_fee,
        base_revenue,
        commission_rate,
        commission_amount,
        net_revenue,
        property_missing: property.is_none(),
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WaterfallTotals {
    pub booking_count: usize,
    pub gross_revenue: Decimal,
    pub cleaning_fees: Decimal,
    pub base_revenue: Decimal,
    pub commission_amount: Decimal,
    pub net_revenue: Decimal,
    /// Bookings whose raw net is below zero.
    pub negative_net_count: usize,
}

impl WaterfallTotals {
    pub fn add(&mut self, breakdown: &RevenueBreakdown) {
        self.booking_count += 1;
        self.gross_revenue += breakdown.gross_revenue;
        self.cleaning_fees += breakdown.cleaning_fee;
        self.base_revenue += breakdown.base_revenue;
        self.commission_amount += breakdown.commission_amount;
        self.net_revenue += breakdown.net_revenue;
        if breakdown.is_net_negative() {
            self.negative_net_count += 1;
        }
    }

    pub fn merge(&mut self, other: &WaterfallTotals) {
        self.booking_count += other.booking_count;
        self.gross_revenue += other.gross_revenue;
        self.cleaning_fees += other.cleaning_fees;
        self.base_revenue += other.base_revenue;
        self.commission_amount += other.commission_amount;
        self.net_revenue += other.net_revenue;
        self.negative_net_count += other.negative_net_count;
    }

    pub fn reconciles(&self) -> bool {
        self.gross_revenue == self.base_revenue + self.cleaning_fees
            && self.base_revenue == self.commission_amount + self.net_revenue
    }

    pub fn is_empty(&self) -> bool {
        self.booking_count == 0
    }
}

impl<'a> FromIterator<&'a RevenueBreakdown> for WaterfallTotals {
    fn from_iter<I: IntoIterator<Item = &'a RevenueBreakdown>>(iter: I) -> Self {
        let mut totals = Self::default();
        for breakdown in iter {
            totals.add(breakdown);
        }
        totals
    }
}
