use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PublicationState {
    Private,
    Published,
}

/// The social-feed record of a published trip. At most one per trip.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicationRecord {
    pub id: Uuid,
    pub trip_id: Uuid,
    pub publisher_id: String,
    pub comment: String,
    pub like_count: u32,
    pub published_at: DateTime<Utc>,
}

/// Server view of a trip's publication, as seen by one viewer
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublicationStatus {
    pub trip_id: Uuid,
    pub record: Option<PublicationRecord>,
    pub viewer_has_liked: bool,
}

impl PublicationStatus {
    pub fn private(trip_id: Uuid) -> Self {
        Self {
            trip_id,
            record: None,
            viewer_has_liked: false,
        }
    }

    pub fn state(&self) -> PublicationState {
        match self.record {
            Some(_) => PublicationState::Published,
            None => PublicationState::Private,
        }
    }

    pub fn is_published(&self) -> bool {
        self.record.is_some()
    }

    pub fn like_count(&self) -> u32 {
        self.record.as_ref().map(|r| r.like_count).unwrap_or(0)
    }
}

/// Ordering of the public feed
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FeedOrder {
    #[default]
    Recent,
    Popular,
}
