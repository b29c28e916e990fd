use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference into the activity definitions owned by the backend
pub type ActivityId = i64;
/// Reference into the hotel definitions owned by the backend
pub type HotelId = i64;

/// An activity scheduled into a trip on a concrete day
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ItineraryItem {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub activity_id: ActivityId,
    pub realized_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl ItineraryItem {
    pub fn new(request: &NewItineraryItem) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id: request.trip_id,
            activity_id: request.activity_id,
            realized_date: request.realized_date,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewItineraryItem {
    pub trip_id: Uuid,
    pub activity_id: ActivityId,
    pub realized_date: NaiveDate,
}

/// A hotel booked into a trip for its own inclusive window
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Stay {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub hotel_id: HotelId,
    pub stay_start: NaiveDate,
    pub stay_end: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Stay {
    pub fn new(request: &NewStay) -> Self {
        Self {
            id: Uuid::new_v4(),
            trip_id: request.trip_id,
            hotel_id: request.hotel_id,
            stay_start: request.stay_start,
            stay_end: request.stay_end,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewStay {
    pub trip_id: Uuid,
    pub hotel_id: HotelId,
    pub stay_start: NaiveDate,
    pub stay_end: NaiveDate,
}
