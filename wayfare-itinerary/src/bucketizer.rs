//! Groups itinerary items into the calendar days of a trip.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;
use wayfare_core::DateRange;
use wayfare_shared::{HotelId, ItineraryItem, Stay};

/// One calendar day of a trip and the items realized on it, in input order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayBucket {
    /// 1-based, "Day 1" is the trip's start date
    pub day_number: usize,
    pub date: NaiveDate,
    pub items: Vec<ItineraryItem>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItineraryInconsistency {
    #[error("Item {} on {} falls outside {}..={}", .item.id, .item.realized_date, .range.start(), .range.end())]
    DateOutOfRange { item: ItineraryItem, range: DateRange },
}

impl ItineraryInconsistency {
    pub fn item(&self) -> &ItineraryItem {
        match self {
            ItineraryInconsistency::DateOutOfRange { item, .. } => item,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    pub range: DateRange,
    /// Exactly one bucket per day of `range`, empty days included
    pub days: Vec<DayBucket>,
    pub inconsistencies: Vec<ItineraryInconsistency>,
}

impl Itinerary {
    pub fn day(&self, date: NaiveDate) -> Option<&DayBucket> {
        self.range.index_of(date).and_then(|idx| self.days.get(idx))
    }

    pub fn scheduled_count(&self) -> usize {
        self.days.iter().map(|d| d.items.len()).sum()
    }

    pub fn is_consistent(&self) -> bool {
        self.inconsistencies.is_empty()
    }
}

/// Stable partition of `items` by realized date. Items outside `range` are
/// reported, never dropped.
pub fn bucketize<I>(range: &DateRange, items: I) -> Itinerary
where
    I: IntoIterator<Item = ItineraryItem>,
{
    let mut days: Vec<DayBucket> = range
        .days()
        .enumerate()
        .map(|(idx, date)| DayBucket {
            day_number: idx + 1,
            date,
            items: Vec::new(),
        })
        .collect();
    let mut inconsistencies = Vec::new();

    for item in items {
        match range.index_of(item.realized_date).and_then(|idx| days.get_mut(idx)) {
            Some(bucket) => bucket.items.push(item),
            None => {
                warn!(
                    "Item {} of trip {} is dated {} outside {}..={}",
                    item.id,
                    item.trip_id,
                    item.realized_date,
                    range.start(),
                    range.end()
                );
                inconsistencies.push(ItineraryInconsistency::DateOutOfRange {
                    item,
                    range: *range,
                });
            }
        }
    }

    Itinerary {
        range: *range,
        days,
        inconsistencies,
    }
}

/// A stay whose window is not contained in the trip. Data-quality only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StayWarning {
    pub stay_id: Uuid,
    pub hotel_id: HotelId,
    pub stay_start: NaiveDate,
    pub stay_end: NaiveDate,
    pub message: String,
}

pub fn stay_warnings(range: &DateRange, stays: &[Stay]) -> Vec<StayWarning> {
    stays
        .iter()
        .filter(|s| !(range.contains(s.stay_start) && range.contains(s.stay_end)))
        .map(|s| {
            let message = format!(
                "stay {}..={} exceeds trip {}..={}",
                s.stay_start,
                s.stay_end,
                range.start(),
                range.end()
            );
            warn!("Stay {} (hotel {}): {}", s.id, s.hotel_id, message);
            StayWarning {
                stay_id: s.id,
                hotel_id: s.hotel_id,
                stay_start: s.stay_start,
                stay_end: s.stay_end,
                message,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use wayfare_shared::NewStay;

    fn d(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, day).unwrap()
    }

    fn item(trip_id: Uuid, activity_id: i64, day: u32) -> ItineraryItem {
        ItineraryItem {
            id: Uuid::new_v4(),
            trip_id,
            activity_id,
            realized_date: d(day),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_every_day_gets_a_bucket() {
        let range = DateRange::new(d(1), d(3)).unwrap();
        let itinerary = bucketize(&range, Vec::new());

        let dates: Vec<_> = itinerary.days.iter().map(|b| b.date).collect();
        assert_eq!(dates, vec![d(1), d(2), d(3)]);
        assert_eq!(itinerary.days[2].day_number, 3);
        assert!(itinerary.days.iter().all(|b| b.items.is_empty()));
        assert!(itinerary.is_consistent());
    }

    #[test]
    fn test_same_day_items_keep_input_order() {
        let trip = Uuid::new_v4();
        let range = DateRange::new(d(1), d(3)).unwrap();
        let items = vec![item(trip, 30, 2), item(trip, 10, 1), item(trip, 20, 2), item(trip, 40, 2)];

        let itinerary = bucketize(&range, items);
        let day2: Vec<_> = itinerary.days[1].items.iter().map(|i| i.activity_id).collect();
        assert_eq!(day2, vec![30, 20, 40]);
        assert_eq!(itinerary.day(d(1)).unwrap().items[0].activity_id, 10);
    }

    #[test]
    fn test_items_are_partitioned_exactly() {
        let trip = Uuid::new_v4();
        let range = DateRange::new(d(2), d(4)).unwrap();
        let items = vec![
            item(trip, 1, 1),
            item(trip, 2, 2),
            item(trip, 3, 4),
            item(trip, 4, 5),
            item(trip, 5, 3),
        ];
        let mut input_ids: Vec<_> = items.iter().map(|i| i.id).collect();

        let itinerary = bucketize(&range, items);
        let mut seen: Vec<_> = itinerary
            .days
            .iter()
            .flat_map(|b| b.items.iter().map(|i| i.id))
            .chain(itinerary.inconsistencies.iter().map(|x| x.item().id))
            .collect();

        input_ids.sort();
        seen.sort();
        assert_eq!(seen, input_ids);
        assert_eq!(itinerary.scheduled_count(), 3);
        assert_eq!(itinerary.inconsistencies.len(), 2);
    }

    #[test]
    fn test_out_of_range_item_is_reported() {
        let trip = Uuid::new_v4();
        let range = DateRange::new(d(1), d(2)).unwrap();
        let stray = item(trip, 7, 9);

        let itinerary = bucketize(&range, vec![stray.clone()]);
        assert_eq!(
            itinerary.inconsistencies,
            vec![ItineraryInconsistency::DateOutOfRange { item: stray, range }]
        );
        assert_eq!(itinerary.scheduled_count(), 0);
    }

    #[test]
    fn test_stay_warnings_only_for_overflowing_windows() {
        let trip = Uuid::new_v4();
        let range = DateRange::new(d(1), d(3)).unwrap();
        let inside = Stay::new(&NewStay { trip_id: trip, hotel_id: 6, stay_start: d(1), stay_end: d(3) });
        let outside = Stay::new(&NewStay { trip_id: trip, hotel_id: 7, stay_start: d(2), stay_end: d(5) });

        let warnings = stay_warnings(&range, &[inside, outside.clone()]);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].stay_id, outside.id);
        assert_eq!(warnings[0].hotel_id, 7);
    }
}
