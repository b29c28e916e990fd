use async_trait::async_trait;
use uuid::Uuid;
use wayfare_shared::{
    Expense, FeedOrder, ItineraryItem, NewExpense, NewItineraryItem, NewStay, NewTrip,
    PublicationRecord, PublicationStatus, Stay, Trip, TripPatch, TripTemplate,
};

/// Error type shared by every remote collaborator
pub type RepoError = Box<dyn std::error::Error + Send + Sync>;

/// Repository trait for trips, scoped to the authenticated owner
#[async_trait]
pub trait TripRepository: Send + Sync {
    async fn create_trip(&self, owner_id: &str, trip: &NewTrip) -> Result<Trip, RepoError>;

    async fn get_trip(&self, owner_id: &str, id: Uuid) -> Result<Option<Trip>, RepoError>;

    async fn list_trips(&self, owner_id: &str) -> Result<Vec<Trip>, RepoError>;

    async fn update_trip(
        &self,
        owner_id: &str,
        id: Uuid,
        patch: &TripPatch,
    ) -> Result<Option<Trip>, RepoError>;

    /// Delete a trip together with its items, stays, expenses and publication record
    async fn delete_trip(&self, owner_id: &str, id: Uuid) -> Result<bool, RepoError>;
}

/// Repository trait for scheduled activities and hotel stays
#[async_trait]
pub trait ItineraryRepository: Send + Sync {
    async fn create_item(&self, item: &NewItineraryItem) -> Result<ItineraryItem, RepoError>;

    async fn delete_item(&self, trip_id: Uuid, item_id: Uuid) -> Result<bool, RepoError>;

    /// Items of a trip in creation order
    async fn list_items(&self, trip_id: Uuid) -> Result<Vec<ItineraryItem>, RepoError>;

    async fn create_stay(&self, stay: &NewStay) -> Result<Stay, RepoError>;

    async fn delete_stay(&self, trip_id: Uuid, stay_id: Uuid) -> Result<bool, RepoError>;

    async fn list_stays(&self, trip_id: Uuid) -> Result<Vec<Stay>, RepoError>;
}

/// Repository trait for the social-feed publication of trips
#[async_trait]
pub trait PublicationRepository: Send + Sync {
    /// Fails if the trip already has a record
    async fn publish(
        &self,
        trip_id: Uuid,
        publisher_id: &str,
        comment: &str,
    ) -> Result<PublicationRecord, RepoError>;

    /// Fails if the trip has no record
    async fn unpublish(&self, trip_id: Uuid) -> Result<(), RepoError>;

    async fn get_status(&self, trip_id: Uuid, viewer_id: &str)
        -> Result<PublicationStatus, RepoError>;

    async fn like(&self, record_id: Uuid, viewer_id: &str) -> Result<(), RepoError>;

    async fn unlike(&self, record_id: Uuid, viewer_id: &str) -> Result<(), RepoError>;

    /// Trip id owning a publication record
    async fn record_trip(&self, record_id: Uuid) -> Result<Option<Uuid>, RepoError>;

    async fn list_feed(
        &self,
        order: FeedOrder,
        viewer_id: &str,
        limit: usize,
    ) -> Result<Vec<PublicationStatus>, RepoError>;
}

/// Repository trait for trip expenses
#[async_trait]
pub trait ExpenseRepository: Send + Sync {
    async fn create_expense(&self, trip_id: Uuid, expense: &NewExpense)
        -> Result<Expense, RepoError>;

    async fn delete_expense(&self, trip_id: Uuid, expense_id: Uuid) -> Result<bool, RepoError>;

    async fn list_expenses(&self, trip_id: Uuid) -> Result<Vec<Expense>, RepoError>;
}

/// Read-only catalog of recommended trip templates
#[async_trait]
pub trait TemplateCatalog: Send + Sync {
    async fn list_templates(&self) -> Result<Vec<TripTemplate>, RepoError>;

    async fn get_template(&self, id: &str) -> Result<Option<TripTemplate>, RepoError>;
}
