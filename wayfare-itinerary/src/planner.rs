use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;
use wayfare_core::repository::{ItineraryRepository, TripRepository};
use wayfare_core::{CoreError, DateRange};
use wayfare_shared::{
    ActivityId, HotelId, ItineraryItem, NewItineraryItem, NewStay, NewTrip, Stay, Trip, TripPatch,
};

use crate::bucketizer::{bucketize, stay_warnings, Itinerary, StayWarning};

#[derive(Debug, thiserror::Error)]
pub enum PlannerError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Date {date} is outside the trip ({}..={})", .range.start(), .range.end())]
    DateOutOfRange { date: NaiveDate, range: DateRange },

    #[error("Trip {0} not found")]
    TripNotFound(Uuid),

    #[error("Repository error: {0}")]
    Remote(String),
}

fn remote(e: wayfare_core::repository::RepoError) -> PlannerError {
    PlannerError::Remote(e.to_string())
}

/// Everything needed to render a trip's plan
#[derive(Debug, Clone, Serialize)]
pub struct TripView {
    pub trip: Trip,
    pub itinerary: Itinerary,
    pub stays: Vec<Stay>,
    pub stay_warnings: Vec<StayWarning>,
}

/// Owner-scoped trip editing and the trip plan read model
pub struct TripPlanner {
    trips: Arc<dyn TripRepository>,
    itinerary: Arc<dyn ItineraryRepository>,
}

impl TripPlanner {
    pub fn new(trips: Arc<dyn TripRepository>, itinerary: Arc<dyn ItineraryRepository>) -> Self {
        Self { trips, itinerary }
    }

    pub async fn create_trip(&self, owner_id: &str, draft: &NewTrip) -> Result<Trip, PlannerError> {
        validate_trip(&draft.name, &draft.city)?;
        DateRange::new(draft.start_date, draft.end_date)?;

        let trip = self.trips.create_trip(owner_id, draft).await.map_err(remote)?;
        info!("Trip {} created by {}", trip.id, owner_id);
        Ok(trip)
    }

    pub async fn list_trips(&self, owner_id: &str) -> Result<Vec<Trip>, PlannerError> {
        self.trips.list_trips(owner_id).await.map_err(remote)
    }

    pub async fn trip(&self, owner_id: &str, trip_id: Uuid) -> Result<Trip, PlannerError> {
        self.trips
            .get_trip(owner_id, trip_id)
            .await
            .map_err(remote)?
            .ok_or(PlannerError::TripNotFound(trip_id))
    }

    /// Validates the patched trip before anything is written
    pub async fn update_trip(
        &self,
        owner_id: &str,
        trip_id: Uuid,
        patch: &TripPatch,
    ) -> Result<Trip, PlannerError> {
        let mut preview = self.trip(owner_id, trip_id).await?;
        preview.apply(patch);
        validate_trip(&preview.name, &preview.city)?;
        let range = DateRange::new(preview.start_date, preview.end_date)?;

        let trip = self
            .trips
            .update_trip(owner_id, trip_id, patch)
            .await
            .map_err(remote)?
            .ok_or(PlannerError::TripNotFound(trip_id))?;

        let stranded = self
            .itinerary
            .list_items(trip_id)
            .await
            .map_err(remote)?
            .iter()
            .filter(|i| !range.contains(i.realized_date))
            .count();
        if stranded > 0 {
            warn!("Trip {} now has {} items outside its dates", trip_id, stranded);
        }
        Ok(trip)
    }

    pub async fn delete_trip(&self, owner_id: &str, trip_id: Uuid) -> Result<(), PlannerError> {
        if !self.trips.delete_trip(owner_id, trip_id).await.map_err(remote)? {
            return Err(PlannerError::TripNotFound(trip_id));
        }
        info!("Trip {} deleted by {}", trip_id, owner_id);
        Ok(())
    }

    pub async fn view(&self, owner_id: &str, trip_id: Uuid) -> Result<TripView, PlannerError> {
        let trip = self.trip(owner_id, trip_id).await?;
        let range = DateRange::new(trip.start_date, trip.end_date)?;

        let items = self.itinerary.list_items(trip_id).await.map_err(remote)?;
        let stays = self.itinerary.list_stays(trip_id).await.map_err(remote)?;

        Ok(TripView {
            itinerary: bucketize(&range, items),
            stay_warnings: stay_warnings(&range, &stays),
            stays,
            trip,
        })
    }

    pub async fn add_item(
        &self,
        owner_id: &str,
        trip_id: Uuid,
        activity_id: ActivityId,
        realized_date: NaiveDate,
    ) -> Result<ItineraryItem, PlannerError> {
        let trip = self.trip(owner_id, trip_id).await?;
        let range = DateRange::new(trip.start_date, trip.end_date)?;
        if !range.contains(realized_date) {
            return Err(PlannerError::DateOutOfRange { date: realized_date, range });
        }

        let item = self
            .itinerary
            .create_item(&NewItineraryItem { trip_id, activity_id, realized_date })
            .await
            .map_err(remote)?;
        info!("Activity {} scheduled on {} in trip {}", activity_id, realized_date, trip_id);
        Ok(item)
    }

    pub async fn remove_item(&self, owner_id: &str, trip_id: Uuid, item_id: Uuid) -> Result<bool, PlannerError> {
        self.trip(owner_id, trip_id).await?;
        self.itinerary.delete_item(trip_id, item_id).await.map_err(remote)
    }

    /// A window exceeding the trip is stored anyway and only logged
    pub async fn add_stay(
        &self,
        owner_id: &str,
        trip_id: Uuid,
        hotel_id: HotelId,
        window: DateRange,
    ) -> Result<Stay, PlannerError> {
        let trip = self.trip(owner_id, trip_id).await?;
        let range = DateRange::new(trip.start_date, trip.end_date)?;

        let stay = self
            .itinerary
            .create_stay(&NewStay {
                trip_id,
                hotel_id,
                stay_start: window.start(),
                stay_end: window.end(),
            })
            .await
            .map_err(remote)?;
        if !range.covers(&window) {
            warn!(
                "Stay {} (hotel {}) {}..={} exceeds trip {}",
                stay.id,
                hotel_id,
                window.start(),
                window.end(),
                trip_id
            );
        }
        Ok(stay)
    }

    pub async fn remove_stay(&self, owner_id: &str, trip_id: Uuid, stay_id: Uuid) -> Result<bool, PlannerError> {
        self.trip(owner_id, trip_id).await?;
        self.itinerary.delete_stay(trip_id, stay_id).await.map_err(remote)
    }
}

fn validate_trip(name: &str, city: &str) -> Result<(), CoreError> {
    if name.trim().is_empty() {
        return Err(CoreError::ValidationError("trip name is required".into()));
    }
    if city.trim().is_empty() {
        return Err(CoreError::ValidationError("trip city is required".into()));
    }
    Ok(())
}
