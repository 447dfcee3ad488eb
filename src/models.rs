use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{
    error::{EngineError, EngineResult},
    services::money::require_amount_in_range,
};

/// Sales channel a booking came through. Behaviour per channel lives in
/// `services::platform_rules`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Airbnb,
    BookingCom,
    Direct,
    Vrbo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BookingStatus {
    Confirmed,
    InProgress,
    Finished,
    Cancelled,
}

impl BookingStatus {
    pub fn parse(raw: &str) -> EngineResult<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "confirmed" => Ok(Self::Confirmed),
            "in_progress" | "checked_in" => Ok(Self::InProgress),
            "finished" | "checked_out" => Ok(Self::Finished),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            other => Err(EngineError::BadRequest(format!(
                "Unsupported booking status '{other}'."
            ))),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Confirmed => "confirmed",
            Self::InProgress => "in_progress",
            Self::Finished => "finished",
            Self::Cancelled => "cancelled",
        }
    }

    pub fn is_cancelled(self) -> bool {
        self == Self::Cancelled
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Booking {
    pub id: String,
    pub property_id: String,
    pub platform: Platform,
    pub check_in_date: NaiveDate,
    pub check_out_date: NaiveDate,
    pub gross_revenue: Decimal,
    pub payment_date: Option<NaiveDate>,
    pub status: BookingStatus,
}

impl Booking {
    /// Rejects stays that end on or before they start, negative amounts and
    /// amounts beyond `money::MAX_AMOUNT`.
    pub fn validate(&self) -> EngineResult<()> {
        if self.check_out_date <= self.check_in_date {
            return Err(EngineError::InvalidStay {
                booking_id: self.id.clone(),
                check_in: self.check_in_date,
                check_out: self.check_out_date,
            });
        }
        if self.gross_revenue < Decimal::ZERO {
            return Err(EngineError::BadRequest(format!(
                "Booking {} has negative gross_revenue {}.",
                self.id, self.gross_revenue
            )));
        }
        require_amount_in_range(self.gross_revenue, "gross_revenue", &self.id)
    }

    pub fn is_cancelled(&self) -> bool {
        self.status.is_cancelled()
    }
}

/// Validates every booking before any computation starts.
pub fn validate_bookings(bookings: &[Booking]) -> EngineResult<()> {
    bookings.iter().try_for_each(Booking::validate)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Property {
    pub id: String,
    pub name: Option<String>,
    pub cleaning_fee: Decimal,
    pub commission_rate: Decimal,
}

impl Property {
    /// Cleaning fee must be non-negative and bounded, commission in [0, 1].
    pub fn validate(&self) -> EngineResult<()> {
        if self.cleaning_fee < Decimal::ZERO {
            return Err(EngineError::BadRequest(format!(
                "Property {} has negative cleaning_fee {}.",
                self.id, self.cleaning_fee
            )));
        }
        require_amount_in_range(self.cleaning_fee, "cleaning_fee", &self.id)?;
        if self.commission_rate < Decimal::ZERO || self.commission_rate > Decimal::ONE {
            return Err(EngineError::BadRequest(format!(
                "Property {} has commission_rate {} outside [0, 1].",
                self.id, self.commission_rate
            )));
        }
        Ok(())
    }
}

pub fn validate_properties(properties: &[Property]) -> EngineResult<()> {
    properties.iter().try_for_each(Property::validate)
}

/// Inclusive date range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> EngineResult<Self> {
        let window = Self { start, end };
        window.validate()?;
        Ok(window)
    }

    /// Calendar month containing the given year/month.
    pub fn month(year: i32, month: u32) -> EngineResult<Self> {
        let start = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
            EngineError::BadRequest(format!("Invalid month {year:04}-{month:02}."))
        })?;
        let next_start = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        };
        let end = next_start
            .and_then(|date| date.pred_opt())
            .ok_or_else(|| {
                EngineError::BadRequest(format!("Invalid month {year:04}-{month:02}."))
            })?;
        Self::new(start, end)
    }

    /// The "general" window covering every representable date.
    pub fn unbounded() -> Self {
        Self {
            start: NaiveDate::MIN,
            end: NaiveDate::MAX,
        }
    }

    pub fn validate(&self) -> EngineResult<()> {
        if self.end < self.start {
            return Err(EngineError::InvalidWindow {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    pub fn total_days(&self) -> i64 {
        i64::from(self.end.num_days_from_ce()) - i64::from(self.start.num_days_from_ce()) + 1
    }
}
