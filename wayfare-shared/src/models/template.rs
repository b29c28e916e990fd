use serde::{Deserialize, Serialize};

use super::itinerary::{ActivityId, HotelId};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TemplateCategory {
    Popular,
    Beach,
    Culture,
}

/// An activity placed `day_offset` days after the chosen start date
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateActivity {
    pub activity_id: ActivityId,
    pub day_offset: u32,
}

/// Stay window relative to the chosen start date, both ends inclusive
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateStayWindow {
    pub start_offset: u32,
    pub end_offset: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TemplateHotel {
    pub hotel_id: HotelId,
    #[serde(default)]
    pub window: Option<TemplateStayWindow>,
}

/// Immutable seed data for a recommended trip
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TripTemplate {
    pub id: String,
    pub name: String,
    pub city: String,
    pub cover_image: Option<String>,
    pub category: TemplateCategory,
    pub activities: Vec<TemplateActivity>,
    #[serde(default)]
    pub hotels: Vec<TemplateHotel>,
}

impl TripTemplate {
    /// Largest activity offset, zero for a template without activities
    pub fn max_activity_offset(&self) -> u32 {
        self.activities
            .iter()
            .map(|a| a.day_offset)
            .max()
            .unwrap_or(0)
    }

    /// Offset of the last day the template touches, stay windows included
    pub fn last_offset(&self) -> u32 {
        let stay_end = self
            .hotels
            .iter()
            .filter_map(|h| h.window.map(|w| w.end_offset))
            .max()
            .unwrap_or(0);
        self.max_activity_offset().max(stay_end)
    }

    pub fn duration_days(&self) -> u32 {
        self.last_offset() + 1
    }
}
