pub mod calendar;
pub mod repository;

pub use calendar::DateRange;

use chrono::NaiveDate;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Invalid date range: end {end} is before start {start}")]
    InvalidRange { start: NaiveDate, end: NaiveDate },
    #[error("Date arithmetic overflow: {start} + {days} days")]
    DateOverflow { start: NaiveDate, days: u64 },
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
