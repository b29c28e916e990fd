pub mod bucketizer;
pub mod expenses;
pub mod instantiator;
pub mod planner;
pub mod publication;

pub use bucketizer::{bucketize, stay_warnings, DayBucket, Itinerary, ItineraryInconsistency, StayWarning};
pub use expenses::{CategoryTotal, ExpenseError, ExpenseLedger, ExpenseService, ExpenseSort, ExpenseSummary};
pub use instantiator::{
    BatchOutcome, EntryError, InstantiationError, InstantiationOutcome, InstantiationSettings,
    TemplateInstantiator, TemplatePlan,
};
pub use planner::{PlannerError, TripPlanner, TripView};
pub use publication::{PublicationError, PublicationMachine};
