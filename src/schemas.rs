use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::{
    error::{EngineError, EngineResult},
    models::{Booking, BookingStatus, Property},
    services::{
        intervals::{parse_date_or_timestamp, parse_iso_date},
        money::to_decimal,
        platform_rules::parse_platform,
    },
};

pub fn validate_input<T: Validate>(input: &T) -> EngineResult<()> {
    input
        .validate()
        .map_err(|errors| EngineError::UnprocessableEntity(format!("Validation failed: {errors}")))
}

fn default_status() -> String {
    "confirmed".to_string()
}

/// Booking row as handed over by the booking store.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct BookingRecord {
    #[validate(length(min = 1, max = 255))]
    pub id: String,
    #[serde(alias = "propertyId")]
    #[validate(length(min = 1, max = 255))]
    pub property_id: String,
    pub platform: String,
    #[serde(alias = "checkInDate")]
    pub check_in_date: String,
    #[serde(alias = "checkOutDate")]
    pub check_out_date: String,
    #[serde(alias = "grossRevenue", default)]
    #[validate(range(min = 0.0))]
    pub gross_revenue: f64,
    #[serde(alias = "paymentDate", default)]
    pub payment_date: Option<String>,
    #[serde(default = "default_status")]
    pub status: String,
}

/// Property row as handed over by the property catalog.
#[derive(Debug, Clone, Deserialize, Serialize, Validate)]
pub struct PropertyRecord {
    #[validate(length(min = 1, max = 255))]
    pub id: String,
    pub name: Option<String>,
    #[serde(alias = "cleaningFee", default)]
    #[validate(range(min = 0.0))]
    pub cleaning_fee: f64,
    #[serde(alias = "commissionRate", default)]
    #[validate(range(min = 0.0, max = 1.0))]
    pub commission_rate: f64,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SnapshotPayload {
    #[serde(default)]
    pub bookings: Vec<BookingRecord>,
    #[serde(default)]
    pub properties: Vec<PropertyRecord>,
}

impl TryFrom<BookingRecord> for Booking {
    type Error = EngineError;

    fn try_from(record: BookingRecord) -> Result<Self, Self::Error> {
        validate_input(&record).map_err(|error| with_record_id(error, "Booking", &record.id))?;

        let payment_date = record
            .payment_date
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(parse_date_or_timestamp)
            .transpose()
            .map_err(|error| with_record_id(error, "Booking", &record.id))?;

        let booking = Booking {
            platform: parse_platform(&record.platform)
                .map_err(|error| with_record_id(error, "Booking", &record.id))?,
            check_in_date: parse_iso_date(&record.check_in_date)
                .map_err(|error| with_record_id(error, "Booking", &record.id))?,
            check_out_date: parse_iso_date(&record.check_out_date)
                .map_err(|error| with_record_id(error, "Booking", &record.id))?,
            gross_revenue: to_decimal(record.gross_revenue, "gross_revenue", &record.id)?,
            payment_date,
            status: BookingStatus::parse(&record.status)
                .map_err(|error| with_record_id(error, "Booking", &record.id))?,
            property_id: record.property_id,
            id: record.id,
        };
        booking.validate()?;
        Ok(booking)
    }
}

impl TryFrom<PropertyRecord> for Property {
    type Error = EngineError;

    fn try_from(record: PropertyRecord) -> Result<Self, Self::Error> {
        validate_input(&record).map_err(|error| with_record_id(error, "Property", &record.id))?;
        Ok(Property {
            cleaning_fee: to_decimal(record.cleaning_fee, "cleaning_fee", &record.id)?,
            commission_rate: to_decimal(record.commission_rate, "commission_rate", &record.id)?,
            name: record
                .name
                .map(|name| name.trim().to_string())
                .filter(|name| !name.is_empty()),
            id: record.id,
        })
    }
}

fn with_record_id(error: EngineError, kind: &str, record_id: &str) -> EngineError {
    match error {
        EngineError::BadRequest(message) => {
            EngineError::BadRequest(format!("{kind} {record_id}: {message}"))
        }
        EngineError::UnprocessableEntity(message) => {
            EngineError::UnprocessableEntity(format!("{kind} {record_id}: {message}"))
        }
        other => other,
    }
}
