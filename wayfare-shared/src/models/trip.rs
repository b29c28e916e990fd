use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user's trip. The date range is inclusive on both ends.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Trip {
    pub id: Uuid,
    pub owner_id: String,
    pub name: String,
    pub city: String,
    pub cover_image: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Trip {
    pub fn new(owner_id: impl Into<String>, draft: NewTrip) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            name: draft.name,
            city: draft.city,
            cover_image: draft.cover_image,
            start_date: draft.start_date,
            end_date: draft.end_date,
            notes: draft.notes,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update. Range validation is the caller's job.
    pub fn apply(&mut self, patch: &TripPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(city) = &patch.city {
            self.city = city.clone();
        }
        if let Some(cover) = &patch.cover_image {
            self.cover_image = Some(cover.clone());
        }
        if let Some(start) = patch.start_date {
            self.start_date = start;
        }
        if let Some(end) = patch.end_date {
            self.end_date = end;
        }
        if let Some(notes) = &patch.notes {
            self.notes = Some(notes.clone());
        }
        self.updated_at = Utc::now();
    }
}

/// Fields needed to create a trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NewTrip {
    pub name: String,
    pub city: String,
    #[serde(default)]
    pub cover_image: Option<String>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripPatch {
    pub name: Option<String>,
    pub city: Option<String>,
    pub cover_image: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub notes: Option<String>,
}
