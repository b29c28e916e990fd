use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;
use wayfare_core::repository::{ExpenseRepository, RepoError};
use wayfare_shared::{Amount, Expense, ExpenseCategory, NewExpense};

pub struct SqliteExpenseRepository {
    pool: SqlitePool,
}

impl SqliteExpenseRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: Uuid,
    trip_id: Uuid,
    concept: String,
    amount_minor: i64,
    category: String,
    spent_on: NaiveDate,
    notes: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = RepoError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        let category: ExpenseCategory = row.category.parse()?;
        Ok(Expense {
            id: row.id,
            trip_id: row.trip_id,
            concept: row.concept,
            amount: Amount::from_minor(row.amount_minor),
            category,
            spent_on: row.spent_on,
            notes: row.notes,
            created_at: row.created_at,
        })
    }
}

#[async_trait]
impl ExpenseRepository for SqliteExpenseRepository {
    async fn create_expense(&self, trip_id: Uuid, expense: &NewExpense) -> Result<Expense, RepoError> {
        let exists: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM trips WHERE id = ?1")
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await?;
        if exists.is_none() {
            return Err(format!("trip {trip_id} not found").into());
        }

        let expense = Expense::new(trip_id, expense);

        sqlx::query(
            r#"
            INSERT INTO expenses (id, trip_id, concept, amount_minor, category, spent_on, notes, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(expense.id)
        .bind(expense.trip_id)
        .bind(&expense.concept)
        .bind(expense.amount.minor())
        .bind(expense.category.as_str())
        .bind(expense.spent_on)
        .bind(&expense.notes)
        .bind(expense.created_at)
        .execute(&self.pool)
        .await?;

        Ok(expense)
    }

    async fn delete_expense(&self, trip_id: Uuid, expense_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?1 AND trip_id = ?2")
            .bind(expense_id)
            .bind(trip_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_expenses(&self, trip_id: Uuid) -> Result<Vec<Expense>, RepoError> {
        let rows: Vec<ExpenseRow> = sqlx::query_as(
            "SELECT id, trip_id, concept, amount_minor, category, spent_on, notes, created_at FROM expenses WHERE trip_id = ?1 ORDER BY rowid",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Expense::try_from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{DbClient, SqliteTripRepository};
    use wayfare_core::repository::TripRepository;
    use wayfare_shared::NewTrip;

    #[tokio::test]
    async fn test_expenses_round_trip_in_minor_units() {
        let db = DbClient::in_memory().await.unwrap();
        db.migrate().await.unwrap();
        let trips = SqliteTripRepository::new(db.pool.clone());
        let repo = SqliteExpenseRepository::new(db.pool);

        let day = NaiveDate::from_ymd_opt(2024, 3, 2).unwrap();
        let trip = trips
            .create_trip(
                "alice",
                &NewTrip {
                    name: "Porto".into(),
                    city: "Porto".into(),
                    cover_image: None,
                    start_date: day,
                    end_date: day,
                    notes: None,
                },
            )
            .await
            .unwrap();

        let draft = NewExpense {
            concept: "Dinner".into(),
            amount: "12.30".parse().unwrap(),
            category: ExpenseCategory::Food,
            spent_on: day,
            notes: None,
        };
        let created = repo.create_expense(trip.id, &draft).await.unwrap();

        let listed = repo.list_expenses(trip.id).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].amount.minor(), 1230);
        assert_eq!(listed[0].category, ExpenseCategory::Food);

        assert!(repo.delete_expense(trip.id, created.id).await.unwrap());
        assert!(!repo.delete_expense(trip.id, created.id).await.unwrap());
        assert!(repo.create_expense(Uuid::new_v4(), &draft).await.is_err());
    }
}
