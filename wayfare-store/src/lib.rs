pub mod app_config;
pub mod database;
pub mod expense_repo;
pub mod memory;
pub mod publication_repo;
pub mod trip_repo;

pub use database::DbClient;
pub use expense_repo::SqliteExpenseRepository;
pub use memory::InMemoryStore;
pub use publication_repo::SqlitePublicationRepository;
pub use trip_repo::SqliteTripRepository;
