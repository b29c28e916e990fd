//! Calendar-day arithmetic over date-only values.
//!
//! Everything here works on [`NaiveDate`], which has no time-of-day and no
//! zone, so stepping a day can never skip or repeat across a DST change.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::{CoreError, CoreResult};

/// Inclusive range of calendar days, `end >= start`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RangeBounds")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> CoreResult<Self> {
        if end < start {
            return Err(CoreError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn single(day: NaiveDate) -> Self {
        Self { start: day, end: day }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    /// Number of days in the range, `end - start + 1`
    pub fn len_days(&self) -> usize {
        (self.end - self.start).num_days() as usize + 1
    }

    pub fn contains(&self, day: NaiveDate) -> bool {
        self.start <= day && day <= self.end
    }

    /// Whether `other` lies entirely within this range
    pub fn covers(&self, other: &DateRange) -> bool {
        self.contains(other.start) && self.contains(other.end)
    }

    /// Zero-based position of `day` in the range
    pub fn index_of(&self, day: NaiveDate) -> Option<usize> {
        self.contains(day)
            .then(|| (day - self.start).num_days() as usize)
    }

    pub fn days(&self) -> DayIter {
        DayIter {
            next: Some(self.start),
            end: self.end,
        }
    }
}

#[derive(Deserialize)]
struct RangeBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<RangeBounds> for DateRange {
    type Error = CoreError;

    fn try_from(bounds: RangeBounds) -> Result<Self, Self::Error> {
        DateRange::new(bounds.start, bounds.end)
    }
}

/// Iterator over the days of a [`DateRange`], stepping one calendar day
#[derive(Debug, Clone)]
pub struct DayIter {
    next: Option<NaiveDate>,
    end: NaiveDate,
}

impl Iterator for DayIter {
    type Item = NaiveDate;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = if current < self.end {
            current.succ_opt()
        } else {
            None
        };
        Some(current)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self
            .next
            .map(|d| (self.end - d).num_days() as usize + 1)
            .unwrap_or(0);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for DayIter {}

/// Expand `[start, end]` into its ordered calendar days
pub fn expand(start: NaiveDate, end: NaiveDate) -> CoreResult<Vec<NaiveDate>> {
    Ok(DateRange::new(start, end)?.days().collect())
}

/// `start + days` in calendar days
pub fn add_days(start: NaiveDate, days: u32) -> CoreResult<NaiveDate> {
    start
        .checked_add_days(Days::new(u64::from(days)))
        .ok_or(CoreError::DateOverflow {
            start,
            days: u64::from(days),
        })
}
