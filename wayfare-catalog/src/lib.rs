pub mod recommended;

pub use recommended::{CatalogError, RecommendedCatalog};
