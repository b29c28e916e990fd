pub mod expense;
pub mod itinerary;
pub mod publication;
pub mod template;
pub mod trip;
