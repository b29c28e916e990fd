//! Turns a relative-offset [`TripTemplate`] into a dated trip.
//!
//! The trip is created first and is the only hard prerequisite. Item and stay
//! creations then fan out with bounded concurrency; each one may fail on its
//! own without touching the others, and failures come back as data so the
//! caller can [`TemplateInstantiator::retry`] just those.

use chrono::NaiveDate;
use futures_util::stream::{self, StreamExt};
use serde::Serialize;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use uuid::Uuid;
use wayfare_core::calendar::add_days;
use wayfare_core::repository::{ItineraryRepository, RepoError, TripRepository};
use wayfare_core::{CoreError, DateRange};
use wayfare_shared::{
    ActivityId, HotelId, ItineraryItem, NewItineraryItem, NewStay, NewTrip, Stay, Trip,
    TripTemplate,
};

#[derive(Debug, thiserror::Error)]
pub enum InstantiationError {
    #[error(transparent)]
    Calendar(#[from] CoreError),

    #[error("Trip creation failed: {0}")]
    TripCreateFailed(String),
}

/// A single item or stay that could not be created. Carries the exact request
/// so it can be re-sent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EntryError {
    #[error("Item #{index} (activity {}) failed: {reason}", .request.activity_id)]
    ItemCreateFailed {
        index: usize,
        request: NewItineraryItem,
        reason: String,
    },

    #[error("Stay #{index} (hotel {}) failed: {reason}", .request.hotel_id)]
    StayCreateFailed {
        index: usize,
        request: NewStay,
        reason: String,
    },
}

#[derive(Debug, Clone)]
pub struct InstantiationSettings {
    pub max_concurrent_requests: usize,
    pub request_timeout: Duration,
}

impl Default for InstantiationSettings {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 4,
            request_timeout: Duration::from_secs(10),
        }
    }
}

/// Dates computed from a template before anything is sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplatePlan {
    pub range: DateRange,
    pub items: Vec<(ActivityId, NaiveDate)>,
    pub stays: Vec<(HotelId, DateRange)>,
}

impl TemplatePlan {
    /// End date is `start + last_offset`, the later of the furthest activity
    /// and the furthest templated stay window.
    pub fn build(template: &TripTemplate, start: NaiveDate) -> Result<Self, CoreError> {
        let end = add_days(start, template.last_offset())?;
        let range = DateRange::new(start, end)?;

        let items = template
            .activities
            .iter()
            .map(|a| Ok((a.activity_id, add_days(start, a.day_offset)?)))
            .collect::<Result<Vec<_>, CoreError>>()?;

        let stays = template
            .hotels
            .iter()
            .map(|h| {
                let window = match h.window {
                    Some(w) => DateRange::new(add_days(start, w.start_offset)?, add_days(start, w.end_offset)?)?,
                    None => range,
                };
                Ok((h.hotel_id, window))
            })
            .collect::<Result<Vec<_>, CoreError>>()?;

        Ok(Self { range, items, stays })
    }

    pub fn trip_draft(&self, template: &TripTemplate) -> NewTrip {
        NewTrip {
            name: template.name.clone(),
            city: template.city.clone(),
            cover_image: template.cover_image.clone(),
            start_date: self.range.start(),
            end_date: self.range.end(),
            notes: None,
        }
    }

    pub fn item_requests(&self, trip_id: Uuid) -> Vec<NewItineraryItem> {
        self.items
            .iter()
            .map(|&(activity_id, realized_date)| NewItineraryItem { trip_id, activity_id, realized_date })
            .collect()
    }

    pub fn stay_requests(&self, trip_id: Uuid) -> Vec<NewStay> {
        self.stays
            .iter()
            .map(|&(hotel_id, window)| NewStay {
                trip_id,
                hotel_id,
                stay_start: window.start(),
                stay_end: window.end(),
            })
            .collect()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchOutcome {
    pub created_items: Vec<ItineraryItem>,
    pub created_stays: Vec<Stay>,
    pub failed: Vec<EntryError>,
}

impl BatchOutcome {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InstantiationOutcome {
    pub trip: Trip,
    #[serde(flatten)]
    pub batch: BatchOutcome,
}

enum Entry {
    Item(usize, NewItineraryItem),
    Stay(usize, NewStay),
}

enum Created {
    Item(ItineraryItem),
    Stay(Stay),
}

impl From<EntryError> for Entry {
    fn from(failure: EntryError) -> Self {
        match failure {
            EntryError::ItemCreateFailed { index, request, .. } => Entry::Item(index, request),
            EntryError::StayCreateFailed { index, request, .. } => Entry::Stay(index, request),
        }
    }
}

pub struct TemplateInstantiator {
    trips: Arc<dyn TripRepository>,
    itinerary: Arc<dyn ItineraryRepository>,
    settings: InstantiationSettings,
}

impl TemplateInstantiator {
    pub fn new(
        trips: Arc<dyn TripRepository>,
        itinerary: Arc<dyn ItineraryRepository>,
        settings: InstantiationSettings,
    ) -> Self {
        Self { trips, itinerary, settings }
    }

    pub async fn instantiate(
        &self,
        owner_id: &str,
        template: &TripTemplate,
        start: NaiveDate,
    ) -> Result<InstantiationOutcome, InstantiationError> {
        let plan = TemplatePlan::build(template, start)?;
        let draft = plan.trip_draft(template);

        let trip = self
            .call(self.trips.create_trip(owner_id, &draft))
            .await
            .map_err(|reason| {
                error!("Creating trip from template {} failed: {}", template.id, reason);
                InstantiationError::TripCreateFailed(reason)
            })?;
        info!(
            "Created trip {} from template {} ({}..={})",
            trip.id,
            template.id,
            plan.range.start(),
            plan.range.end()
        );

        let entries = plan
            .item_requests(trip.id)
            .into_iter()
            .enumerate()
            .map(|(idx, req)| Entry::Item(idx, req))
            .chain(
                plan.stay_requests(trip.id)
                    .into_iter()
                    .enumerate()
                    .map(|(idx, req)| Entry::Stay(idx, req)),
            )
            .collect();

        let batch = self.dispatch(entries).await;
        if !batch.is_complete() {
            warn!(
                "Trip {} instantiated partially: {} of {} entries failed",
                trip.id,
                batch.failed.len(),
                batch.failed.len() + batch.created_items.len() + batch.created_stays.len()
            );
        }

        Ok(InstantiationOutcome { trip, batch })
    }

    /// Re-send exactly the entries that failed in an earlier outcome
    pub async fn retry(&self, failed: Vec<EntryError>) -> BatchOutcome {
        info!("Retrying {} failed entries", failed.len());
        self.dispatch(failed.into_iter().map(Entry::from).collect()).await
    }

    // Results come back in dispatch order even though calls overlap
    async fn dispatch(&self, entries: Vec<Entry>) -> BatchOutcome {
        let results: Vec<Result<Created, EntryError>> = stream::iter(entries)
            .map(|entry| self.create_entry(entry))
            .buffered(self.settings.max_concurrent_requests.max(1))
            .collect()
            .await;

        let mut batch = BatchOutcome::default();
        for result in results {
            match result {
                Ok(Created::Item(item)) => batch.created_items.push(item),
                Ok(Created::Stay(stay)) => batch.created_stays.push(stay),
                Err(failure) => {
                    warn!("{}", failure);
                    batch.failed.push(failure);
                }
            }
        }
        batch
    }

    async fn create_entry(&self, entry: Entry) -> Result<Created, EntryError> {
        match entry {
            Entry::Item(index, request) => match self.call(self.itinerary.create_item(&request)).await {
                Ok(item) => Ok(Created::Item(item)),
                Err(reason) => Err(EntryError::ItemCreateFailed { index, request, reason }),
            },
            Entry::Stay(index, request) => match self.call(self.itinerary.create_stay(&request)).await {
                Ok(stay) => Ok(Created::Stay(stay)),
                Err(reason) => Err(EntryError::StayCreateFailed { index, request, reason }),
            },
        }
    }

    async fn call<T>(&self, fut: impl Future<Output = Result<T, RepoError>>) -> Result<T, String> {
        match tokio::time::timeout(self.settings.request_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) => Err(e.to_string()),
            Err(_) => Err(format!(
                "timed out after {}ms",
                self.settings.request_timeout.as_millis()
            )),
        }
    }
}
