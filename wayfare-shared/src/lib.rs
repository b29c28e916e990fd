pub mod models;

pub use models::expense::{Amount, AmountParseError, Expense, ExpenseCategory, NewExpense};
pub use models::itinerary::{ActivityId, HotelId, ItineraryItem, NewItineraryItem, NewStay, Stay};
pub use models::publication::{FeedOrder, PublicationRecord, PublicationState, PublicationStatus};
pub use models::template::{
    TemplateActivity, TemplateCategory, TemplateHotel, TemplateStayWindow, TripTemplate,
};
pub use models::trip::{NewTrip, Trip, TripPatch};
