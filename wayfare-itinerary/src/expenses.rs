use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;
use wayfare_core::repository::ExpenseRepository;
use wayfare_shared::{Amount, Expense, ExpenseCategory, NewExpense};

#[derive(Debug, thiserror::Error)]
pub enum ExpenseError {
    #[error("Expense concept is required")]
    EmptyConcept,

    #[error("Expense amount must be positive, got {0}")]
    NonPositiveAmount(Amount),

    #[error("Expense total exceeds the representable amount")]
    TotalOverflow,

    #[error("Expense service error: {0}")]
    Remote(String),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseSort {
    /// Most recent first
    #[default]
    #[serde(alias = "date_desc")]
    Date,
    /// Largest first
    #[serde(alias = "amount_desc")]
    Amount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub category: ExpenseCategory,
    pub total: Amount,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExpenseSummary {
    pub currency: String,
    pub total: Amount,
    pub count: usize,
    pub by_category: Vec<CategoryTotal>,
}

/// Read-only view over a trip's expenses
#[derive(Debug, Clone, Default)]
pub struct ExpenseLedger {
    expenses: Vec<Expense>,
}

impl ExpenseLedger {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self { expenses }
    }

    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    /// Exact sum in minor units
    pub fn total(&self) -> Result<Amount, ExpenseError> {
        sum(self.expenses.iter())
    }

    /// Stable, so equal keys keep insertion order
    pub fn sorted_by(&self, sort: ExpenseSort) -> Vec<&Expense> {
        let mut sorted: Vec<&Expense> = self.expenses.iter().collect();
        match sort {
            ExpenseSort::Date => sorted.sort_by(|a, b| b.spent_on.cmp(&a.spent_on)),
            ExpenseSort::Amount => sorted.sort_by(|a, b| b.amount.cmp(&a.amount)),
        }
        sorted
    }

    pub fn by_category(&self) -> Result<BTreeMap<ExpenseCategory, CategoryTotal>, ExpenseError> {
        let mut groups: BTreeMap<ExpenseCategory, Vec<&Expense>> = BTreeMap::new();
        for expense in &self.expenses {
            groups.entry(expense.category).or_default().push(expense);
        }

        groups
            .into_iter()
            .map(|(category, entries)| {
                let total = CategoryTotal {
                    category,
                    total: sum(entries.iter().copied())?,
                    count: entries.len(),
                };
                Ok::<_, ExpenseError>((category, total))
            })
            .collect()
    }

    pub fn summary(&self, currency: &str) -> Result<ExpenseSummary, ExpenseError> {
        Ok(ExpenseSummary {
            currency: currency.to_string(),
            total: self.total()?,
            count: self.expenses.len(),
            by_category: self.by_category()?.into_values().collect(),
        })
    }
}

fn sum<'a>(mut expenses: impl Iterator<Item = &'a Expense>) -> Result<Amount, ExpenseError> {
    expenses.try_fold(Amount::ZERO, |acc, e| {
        acc.checked_add(e.amount).ok_or(ExpenseError::TotalOverflow)
    })
}

/// Validated expense mutations for a trip
pub struct ExpenseService {
    repo: Arc<dyn ExpenseRepository>,
}

impl ExpenseService {
    pub fn new(repo: Arc<dyn ExpenseRepository>) -> Self {
        Self { repo }
    }

    pub async fn add(&self, trip_id: Uuid, draft: &NewExpense) -> Result<Expense, ExpenseError> {
        let concept = draft.concept.trim();
        if concept.is_empty() {
            return Err(ExpenseError::EmptyConcept);
        }
        if !draft.amount.is_positive() {
            return Err(ExpenseError::NonPositiveAmount(draft.amount));
        }

        let draft = NewExpense {
            concept: concept.to_string(),
            ..draft.clone()
        };
        let expense = self
            .repo
            .create_expense(trip_id, &draft)
            .await
            .map_err(|e| ExpenseError::Remote(e.to_string()))?;

        info!(
            "Expense {} added to trip {}: {} {}",
            expense.id, trip_id, expense.amount, expense.category
        );
        Ok(expense)
    }

    pub async fn remove(&self, trip_id: Uuid, expense_id: Uuid) -> Result<bool, ExpenseError> {
        let removed = self
            .repo
            .delete_expense(trip_id, expense_id)
            .await
            .map_err(|e| ExpenseError::Remote(e.to_string()))?;
        if removed {
            info!("Expense {} removed from trip {}", expense_id, trip_id);
        }
        Ok(removed)
    }

    pub async fn ledger(&self, trip_id: Uuid) -> Result<ExpenseLedger, ExpenseError> {
        let expenses = self
            .repo
            .list_expenses(trip_id)
            .await
            .map_err(|e| ExpenseError::Remote(e.to_string()))?;
        Ok(ExpenseLedger::new(expenses))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use wayfare_core::repository::TripRepository;
    use wayfare_shared::NewTrip;
    use wayfare_store::InMemoryStore;

    fn expense(concept: &str, amount: &str, category: ExpenseCategory, day: u32) -> Expense {
        Expense {
            id: Uuid::new_v4(),
            trip_id: Uuid::nil(),
            concept: concept.to_string(),
            amount: amount.parse().unwrap(),
            category,
            spent_on: NaiveDate::from_ymd_opt(2025, 4, day).unwrap(),
            notes: None,
            created_at: Utc::now(),
        }
    }

    fn ledger() -> ExpenseLedger {
        ExpenseLedger::new(vec![
            expense("Hotel", "12.50", ExpenseCategory::Lodging, 2),
            expense("Taxi", "7.25", ExpenseCategory::Transport, 3),
            expense("Gum", "0.01", ExpenseCategory::Food, 1),
        ])
    }

    #[test]
    fn test_total_is_exact() {
        assert_eq!(ledger().total().unwrap().to_string(), "19.76");
        assert_eq!(ledger().total().unwrap().minor(), 1976);
    }

    #[test]
    fn test_total_is_order_independent() {
        let mut reversed = ledger().expenses().to_vec();
        reversed.reverse();
        assert_eq!(ExpenseLedger::new(reversed).total().unwrap(), ledger().total().unwrap());
    }

    #[test]
    fn test_total_overflow_is_reported() {
        let mut huge = expense("Yacht", "1", ExpenseCategory::Other, 1);
        huge.amount = Amount::from_minor(i64::MAX);
        let ledger = ExpenseLedger::new(vec![huge, expense("Tip", "0.01", ExpenseCategory::Other, 1)]);

        assert!(matches!(ledger.total(), Err(ExpenseError::TotalOverflow)));
        assert!(matches!(ledger.by_category(), Err(ExpenseError::TotalOverflow)));
        assert!(matches!(ledger.summary("EUR"), Err(ExpenseError::TotalOverflow)));
    }

    #[test]
    fn test_empty_ledger_totals_zero() {
        assert_eq!(ExpenseLedger::default().total().unwrap(), Amount::ZERO);
        assert!(ExpenseLedger::default().by_category().unwrap().is_empty());
    }

    #[test]
    fn test_sorting_does_not_mutate() {
        let ledger = ledger();
        let by_date: Vec<_> = ledger.sorted_by(ExpenseSort::Date).iter().map(|e| e.concept.as_str()).collect();
        assert_eq!(by_date, vec!["Taxi", "Hotel", "Gum"]);

        let by_amount: Vec<_> = ledger.sorted_by(ExpenseSort::Amount).iter().map(|e| e.concept.as_str()).collect();
        assert_eq!(by_amount, vec!["Hotel", "Taxi", "Gum"]);

        let original: Vec<_> = ledger.expenses().iter().map(|e| e.concept.as_str()).collect();
        assert_eq!(original, vec!["Hotel", "Taxi", "Gum"]);
    }

    #[test]
    fn test_sort_is_stable_for_ties() {
        let ledger = ExpenseLedger::new(vec![
            expense("a", "5", ExpenseCategory::Food, 1),
            expense("b", "5", ExpenseCategory::Food, 1),
            expense("c", "9", ExpenseCategory::Food, 1),
        ]);
        let by_amount: Vec<_> = ledger.sorted_by(ExpenseSort::Amount).iter().map(|e| e.concept.as_str()).collect();
        assert_eq!(by_amount, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_category_view() {
        let mut expenses = ledger().expenses().to_vec();
        expenses.push(expense("Lunch", "10", ExpenseCategory::Food, 2));

        let groups = ExpenseLedger::new(expenses).by_category().unwrap();
        let food = &groups[&ExpenseCategory::Food];
        assert_eq!(food.total.to_string(), "10.01");
        assert_eq!(food.count, 2);
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn test_sort_parses_short_and_long_names() {
        let short: ExpenseSort = serde_json::from_str("\"amount\"").unwrap();
        let long: ExpenseSort = serde_json::from_str("\"date_desc\"").unwrap();
        assert_eq!(short, ExpenseSort::Amount);
        assert_eq!(long, ExpenseSort::Date);
    }

    #[tokio::test]
    async fn test_service_validates_before_calling_repo() {
        let store = Arc::new(InMemoryStore::new());
        let day = NaiveDate::from_ymd_opt(2025, 4, 1).unwrap();
        let trip = store
            .create_trip(
                "alice",
                &NewTrip {
                    name: "Rome".into(),
                    city: "Rome".into(),
                    cover_image: None,
                    start_date: day,
                    end_date: day,
                    notes: None,
                },
            )
            .await
            .unwrap();
        let service = ExpenseService::new(store.clone());

        let mut draft = NewExpense {
            concept: "  ".into(),
            amount: "3".parse().unwrap(),
            category: ExpenseCategory::Food,
            spent_on: day,
            notes: None,
        };
        assert!(matches!(service.add(trip.id, &draft).await, Err(ExpenseError::EmptyConcept)));

        draft.concept = " Gelato ".into();
        draft.amount = Amount::ZERO;
        assert!(matches!(service.add(trip.id, &draft).await, Err(ExpenseError::NonPositiveAmount(_))));

        draft.amount = "3.40".parse().unwrap();
        let created = service.add(trip.id, &draft).await.unwrap();
        assert_eq!(created.concept, "Gelato");

        let ledger = service.ledger(trip.id).await.unwrap();
        assert_eq!(ledger.total().unwrap().to_string(), "3.40");
        assert!(service.remove(trip.id, created.id).await.unwrap());
        assert!(service.ledger(trip.id).await.unwrap().expenses().is_empty());
    }
}
