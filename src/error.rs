use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    BadRequest(String),
    #[error("Invalid window: end {end} is before start {start}.")]
    InvalidWindow { start: NaiveDate, end: NaiveDate },
    #[error(
        "Booking {booking_id} has check_out_date {check_out} on or before check_in_date {check_in}."
    )]
    InvalidStay {
        booking_id: String,
        check_in: NaiveDate,
        check_out: NaiveDate,
    },
    #[error("{0}")]
    UnprocessableEntity(String),
    #[error("Snapshot payload could not be decoded: {0}")]
    Json(#[from] serde_json::Error),
}

pub type EngineResult<T> = Result<T, EngineError>;

impl EngineError {
    /// Id of the record that caused the failure, when one is known.
    pub fn record_id(&self) -> Option<&str> {
        match self {
            Self::InvalidStay { booking_id, .. } => Some(booking_id.as_str()),
            _ => None,
        }
    }
}
