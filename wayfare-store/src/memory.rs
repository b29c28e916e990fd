use async_trait::async_trait;
use chrono::Utc;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;
use uuid::Uuid;
use wayfare_core::repository::{
    ExpenseRepository, ItineraryRepository, PublicationRepository, RepoError, TripRepository,
};
use wayfare_shared::{
    Expense, FeedOrder, ItineraryItem, NewExpense, NewItineraryItem, NewStay, NewTrip,
    PublicationRecord, PublicationStatus, Stay, Trip, TripPatch,
};

struct PublicationEntry {
    record: PublicationRecord,
    likes: HashSet<String>,
}

impl PublicationEntry {
    fn status(&self, viewer_id: &str) -> PublicationStatus {
        let mut record = self.record.clone();
        record.like_count = u32::try_from(self.likes.len()).unwrap_or(u32::MAX);
        PublicationStatus {
            trip_id: record.trip_id,
            viewer_has_liked: self.likes.contains(viewer_id),
            record: Some(record),
        }
    }
}

#[derive(Default)]
struct MemoryState {
    trips: HashMap<Uuid, Trip>,
    // Vecs keep creation order
    items: Vec<ItineraryItem>,
    stays: Vec<Stay>,
    expenses: Vec<Expense>,
    publications: HashMap<Uuid, PublicationEntry>,
}

/// Non-persistent implementation of every repository, used for `database.url = "memory"` and in tests
#[derive(Default)]
pub struct InMemoryStore {
    state: RwLock<MemoryState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn check_range(start: chrono::NaiveDate, end: chrono::NaiveDate) -> Result<(), RepoError> {
    if end < start {
        return Err(format!("end date {end} is before start date {start}").into());
    }
    Ok(())
}

#[async_trait]
impl TripRepository for InMemoryStore {
    async fn create_trip(&self, owner_id: &str, trip: &NewTrip) -> Result<Trip, RepoError> {
        check_range(trip.start_date, trip.end_date)?;
        let trip = Trip::new(owner_id, trip.clone());
        self.state.write().await.trips.insert(trip.id, trip.clone());
        Ok(trip)
    }

    async fn get_trip(&self, owner_id: &str, id: Uuid) -> Result<Option<Trip>, RepoError> {
        let state = self.state.read().await;
        Ok(state.trips.get(&id).filter(|t| t.owner_id == owner_id).cloned())
    }

    async fn list_trips(&self, owner_id: &str) -> Result<Vec<Trip>, RepoError> {
        let state = self.state.read().await;
        let mut trips: Vec<Trip> = state
            .trips
            .values()
            .filter(|t| t.owner_id == owner_id)
            .cloned()
            .collect();
        trips.sort_by(|a, b| {
            b.start_date
                .cmp(&a.start_date)
                .then_with(|| b.created_at.cmp(&a.created_at))
        });
        Ok(trips)
    }

    async fn update_trip(
        &self,
        owner_id: &str,
        id: Uuid,
        patch: &TripPatch,
    ) -> Result<Option<Trip>, RepoError> {
        let mut state = self.state.write().await;
        let Some(stored) = state.trips.get_mut(&id).filter(|t| t.owner_id == owner_id) else {
            return Ok(None);
        };
        let mut updated = stored.clone();
        updated.apply(patch);
        check_range(updated.start_date, updated.end_date)?;
        *stored = updated.clone();
        Ok(Some(updated))
    }

    async fn delete_trip(&self, owner_id: &str, id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let owned = state.trips.get(&id).is_some_and(|t| t.owner_id == owner_id);
        if !owned {
            return Ok(false);
        }
        state.trips.remove(&id);
        state.items.retain(|i| i.trip_id != id);
        state.stays.retain(|s| s.trip_id != id);
        state.expenses.retain(|e| e.trip_id != id);
        state.publications.remove(&id);
        Ok(true)
    }
}

#[async_trait]
impl ItineraryRepository for InMemoryStore {
    async fn create_item(&self, item: &NewItineraryItem) -> Result<ItineraryItem, RepoError> {
        let mut state = self.state.write().await;
        if !state.trips.contains_key(&item.trip_id) {
            return Err(format!("trip {} not found", item.trip_id).into());
        }
        let item = ItineraryItem::new(item);
        state.items.push(item.clone());
        Ok(item)
    }

    async fn delete_item(&self, trip_id: Uuid, item_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let before = state.items.len();
        state.items.retain(|i| !(i.id == item_id && i.trip_id == trip_id));
        Ok(state.items.len() != before)
    }

    async fn list_items(&self, trip_id: Uuid) -> Result<Vec<ItineraryItem>, RepoError> {
        let state = self.state.read().await;
        Ok(state.items.iter().filter(|i| i.trip_id == trip_id).cloned().collect())
    }

    async fn create_stay(&self, stay: &NewStay) -> Result<Stay, RepoError> {
        check_range(stay.stay_start, stay.stay_end)?;
        let mut state = self.state.write().await;
        if !state.trips.contains_key(&stay.trip_id) {
            return Err(format!("trip {} not found", stay.trip_id).into());
        }
        let stay = Stay::new(stay);
        state.stays.push(stay.clone());
        Ok(stay)
    }

    async fn delete_stay(&self, trip_id: Uuid, stay_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let before = state.stays.len();
        state.stays.retain(|s| !(s.id == stay_id && s.trip_id == trip_id));
        Ok(state.stays.len() != before)
    }

    async fn list_stays(&self, trip_id: Uuid) -> Result<Vec<Stay>, RepoError> {
        let state = self.state.read().await;
        Ok(state.stays.iter().filter(|s| s.trip_id == trip_id).cloned().collect())
    }
}

#[async_trait]
impl PublicationRepository for InMemoryStore {
    async fn publish(
        &self,
        trip_id: Uuid,
        publisher_id: &str,
        comment: &str,
    ) -> Result<PublicationRecord, RepoError> {
        let mut state = self.state.write().await;
        if !state.trips.contains_key(&trip_id) {
            return Err(format!("trip {trip_id} not found").into());
        }
        if state.publications.contains_key(&trip_id) {
            return Err(format!("trip {trip_id} is already published").into());
        }
        let record = PublicationRecord {
            id: Uuid::new_v4(),
            trip_id,
            publisher_id: publisher_id.to_string(),
            comment: comment.to_string(),
            like_count: 0,
            published_at: Utc::now(),
        };
        state.publications.insert(
            trip_id,
            PublicationEntry { record: record.clone(), likes: HashSet::new() },
        );
        Ok(record)
    }

    async fn unpublish(&self, trip_id: Uuid) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        match state.publications.remove(&trip_id) {
            Some(_) => Ok(()),
            None => Err(format!("trip {trip_id} is not published").into()),
        }
    }

    async fn get_status(
        &self,
        trip_id: Uuid,
        viewer_id: &str,
    ) -> Result<PublicationStatus, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .publications
            .get(&trip_id)
            .map(|entry| entry.status(viewer_id))
            .unwrap_or_else(|| PublicationStatus::private(trip_id)))
    }

    async fn like(&self, record_id: Uuid, viewer_id: &str) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let entry = state
            .publications
            .values_mut()
            .find(|e| e.record.id == record_id)
            .ok_or_else(|| format!("publication {record_id} not found"))?;
        entry.likes.insert(viewer_id.to_string());
        Ok(())
    }

    async fn unlike(&self, record_id: Uuid, viewer_id: &str) -> Result<(), RepoError> {
        let mut state = self.state.write().await;
        let entry = state
            .publications
            .values_mut()
            .find(|e| e.record.id == record_id)
            .ok_or_else(|| format!("publication {record_id} not found"))?;
        entry.likes.remove(viewer_id);
        Ok(())
    }

    async fn record_trip(&self, record_id: Uuid) -> Result<Option<Uuid>, RepoError> {
        let state = self.state.read().await;
        Ok(state
            .publications
            .values()
            .find(|e| e.record.id == record_id)
            .map(|e| e.record.trip_id))
    }

    async fn list_feed(
        &self,
        order: FeedOrder,
        viewer_id: &str,
        limit: usize,
    ) -> Result<Vec<PublicationStatus>, RepoError> {
        let state = self.state.read().await;
        let mut feed: Vec<PublicationStatus> =
            state.publications.values().map(|e| e.status(viewer_id)).collect();

        let published_at = |s: &PublicationStatus| s.record.as_ref().map(|r| r.published_at);
        match order {
            FeedOrder::Recent => feed.sort_by(|a, b| published_at(b).cmp(&published_at(a))),
            FeedOrder::Popular => feed.sort_by(|a, b| {
                b.like_count()
                    .cmp(&a.like_count())
                    .then_with(|| published_at(b).cmp(&published_at(a)))
            }),
        }
        feed.truncate(limit);
        Ok(feed)
    }
}

#[async_trait]
impl ExpenseRepository for InMemoryStore {
    async fn create_expense(&self, trip_id: Uuid, expense: &NewExpense) -> Result<Expense, RepoError> {
        let mut state = self.state.write().await;
        if !state.trips.contains_key(&trip_id) {
            return Err(format!("trip {trip_id} not found").into());
        }
        let expense = Expense::new(trip_id, expense);
        state.expenses.push(expense.clone());
        Ok(expense)
    }

    async fn delete_expense(&self, trip_id: Uuid, expense_id: Uuid) -> Result<bool, RepoError> {
        let mut state = self.state.write().await;
        let before = state.expenses.len();
        state.expenses.retain(|e| !(e.id == expense_id && e.trip_id == trip_id));
        Ok(state.expenses.len() != before)
    }

    async fn list_expenses(&self, trip_id: Uuid) -> Result<Vec<Expense>, RepoError> {
        let state = self.state.read().await;
        Ok(state.expenses.iter().filter(|e| e.trip_id == trip_id).cloned().collect())
    }
}
