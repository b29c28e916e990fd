use std::sync::Arc;
use std::time::Duration;
use wayfare_core::repository::{
    ExpenseRepository, ItineraryRepository, PublicationRepository, TemplateCatalog, TripRepository,
};
use wayfare_itinerary::{ExpenseService, InstantiationSettings, TemplateInstantiator, TripPlanner};
use wayfare_store::app_config::PlannerConfig;
use wayfare_store::{
    DbClient, InMemoryStore, SqliteExpenseRepository, SqlitePublicationRepository, SqliteTripRepository,
};

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
}

/// The remote collaborators behind every handler
#[derive(Clone)]
pub struct Repositories {
    pub trips: Arc<dyn TripRepository>,
    pub itinerary: Arc<dyn ItineraryRepository>,
    pub publications: Arc<dyn PublicationRepository>,
    pub expenses: Arc<dyn ExpenseRepository>,
}

impl Repositories {
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            trips: store.clone(),
            itinerary: store.clone(),
            publications: store.clone(),
            expenses: store,
        }
    }

    pub fn sqlite(db: &DbClient) -> Self {
        let trips = Arc::new(SqliteTripRepository::new(db.pool.clone()));
        Self {
            trips: trips.clone(),
            itinerary: trips,
            publications: Arc::new(SqlitePublicationRepository::new(db.pool.clone())),
            expenses: Arc::new(SqliteExpenseRepository::new(db.pool.clone())),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn TemplateCatalog>,
    pub planner: Arc<TripPlanner>,
    pub instantiator: Arc<TemplateInstantiator>,
    pub publications: Arc<dyn PublicationRepository>,
    pub expenses: Arc<ExpenseService>,
    pub auth: AuthConfig,
    pub planner_config: PlannerConfig,
}

impl AppState {
    pub fn new(
        repos: Repositories,
        catalog: Arc<dyn TemplateCatalog>,
        auth: AuthConfig,
        planner_config: PlannerConfig,
    ) -> Self {
        let settings = InstantiationSettings {
            max_concurrent_requests: planner_config.max_concurrent_requests,
            request_timeout: Duration::from_millis(planner_config.request_timeout_ms),
        };

        Self {
            catalog,
            planner: Arc::new(TripPlanner::new(repos.trips.clone(), repos.itinerary.clone())),
            instantiator: Arc::new(TemplateInstantiator::new(repos.trips, repos.itinerary, settings)),
            publications: repos.publications,
            expenses: Arc::new(ExpenseService::new(repos.expenses)),
            auth,
            planner_config,
        }
    }
}
