use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;
use wayfare_core::repository::{ItineraryRepository, RepoError, TripRepository};
use wayfare_shared::{
    ActivityId, HotelId, ItineraryItem, NewItineraryItem, NewStay, NewTrip, Stay, Trip, TripPatch,
};

/// Trips together with their itinerary items and stays.
pub struct SqliteTripRepository {
    pool: SqlitePool,
}

impl SqliteTripRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    async fn trip_exists(&self, trip_id: Uuid) -> Result<bool, sqlx::Error> {
        let found: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM trips WHERE id = ?1")
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(found.is_some())
    }
}

#[derive(sqlx::FromRow)]
struct TripRow {
    id: Uuid,
    owner_id: String,
    name: String,
    city: String,
    cover_image: Option<String>,
    start_date: NaiveDate,
    end_date: NaiveDate,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<TripRow> for Trip {
    fn from(row: TripRow) -> Self {
        Trip {
            id: row.id,
            owner_id: row.owner_id,
            name: row.name,
            city: row.city,
            cover_image: row.cover_image,
            start_date: row.start_date,
            end_date: row.end_date,
            notes: row.notes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: Uuid,
    trip_id: Uuid,
    activity_id: ActivityId,
    realized_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<ItemRow> for ItineraryItem {
    fn from(row: ItemRow) -> Self {
        ItineraryItem {
            id: row.id,
            trip_id: row.trip_id,
            activity_id: row.activity_id,
            realized_date: row.realized_date,
            created_at: row.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StayRow {
    id: Uuid,
    trip_id: Uuid,
    hotel_id: HotelId,
    stay_start: NaiveDate,
    stay_end: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<StayRow> for Stay {
    fn from(row: StayRow) -> Self {
        Stay {
            id: row.id,
            trip_id: row.trip_id,
            hotel_id: row.hotel_id,
            stay_start: row.stay_start,
            stay_end: row.stay_end,
            created_at: row.created_at,
        }
    }
}

const TRIP_COLUMNS: &str =
    "id, owner_id, name, city, cover_image, start_date, end_date, notes, created_at, updated_at";

#[async_trait]
impl TripRepository for SqliteTripRepository {
    async fn create_trip(&self, owner_id: &str, trip: &NewTrip) -> Result<Trip, RepoError> {
        if trip.end_date < trip.start_date {
            return Err(format!(
                "end date {} is before start date {}",
                trip.end_date, trip.start_date
            )
            .into());
        }
        let trip = Trip::new(owner_id, trip.clone());

        sqlx::query(
            r#"
            INSERT INTO trips (id, owner_id, name, city, cover_image, start_date, end_date, notes, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(trip.id)
        .bind(&trip.owner_id)
        .bind(&trip.name)
        .bind(&trip.city)
        .bind(&trip.cover_image)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(&trip.notes)
        .bind(trip.created_at)
        .bind(trip.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(trip)
    }

    async fn get_trip(&self, owner_id: &str, trip_id: Uuid) -> Result<Option<Trip>, RepoError> {
        let row: Option<TripRow> = sqlx::query_as(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE id = ?1 AND owner_id = ?2"
        ))
        .bind(trip_id)
        .bind(owner_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Trip::from))
    }

    async fn list_trips(&self, owner_id: &str) -> Result<Vec<Trip>, RepoError> {
        let rows: Vec<TripRow> = sqlx::query_as(&format!(
            "SELECT {TRIP_COLUMNS} FROM trips WHERE owner_id = ?1 ORDER BY start_date DESC, created_at DESC"
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Trip::from).collect())
    }

    async fn update_trip(
        &self,
        owner_id: &str,
        trip_id: Uuid,
        patch: &TripPatch,
    ) -> Result<Option<Trip>, RepoError> {
        let Some(mut trip) = self.get_trip(owner_id, trip_id).await? else {
            return Ok(None);
        };
        trip.apply(patch);
        if trip.end_date < trip.start_date {
            return Err(format!(
                "end date {} is before start date {}",
                trip.end_date, trip.start_date
            )
            .into());
        }

        sqlx::query(
            r#"
            UPDATE trips
            SET name = ?1, city = ?2, cover_image = ?3, start_date = ?4, end_date = ?5, notes = ?6, updated_at = ?7
            WHERE id = ?8 AND owner_id = ?9
            "#,
        )
        .bind(&trip.name)
        .bind(&trip.city)
        .bind(&trip.cover_image)
        .bind(trip.start_date)
        .bind(trip.end_date)
        .bind(&trip.notes)
        .bind(trip.updated_at)
        .bind(trip.id)
        .bind(&trip.owner_id)
        .execute(&self.pool)
        .await?;

        Ok(Some(trip))
    }

    async fn delete_trip(&self, owner_id: &str, trip_id: Uuid) -> Result<bool, RepoError> {
        let mut tx = self.pool.begin().await?;

        let owned: Option<(Uuid,)> =
            sqlx::query_as("SELECT id FROM trips WHERE id = ?1 AND owner_id = ?2")
                .bind(trip_id)
                .bind(owner_id)
                .fetch_optional(&mut *tx)
                .await?;
        if owned.is_none() {
            tx.rollback().await?;
            return Ok(false);
        }

        // Children first so the delete does not depend on the connection's foreign_keys pragma
        sqlx::query(
            "DELETE FROM publication_likes WHERE record_id IN (SELECT id FROM publications WHERE trip_id = ?1)",
        )
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;
        for table in ["publications", "expenses", "stays", "itinerary_items"] {
            sqlx::query(&format!("DELETE FROM {table} WHERE trip_id = ?1"))
                .bind(trip_id)
                .execute(&mut *tx)
                .await?;
        }
        sqlx::query("DELETE FROM trips WHERE id = ?1")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(true)
    }
}

#[async_trait]
impl ItineraryRepository for SqliteTripRepository {
    async fn create_item(&self, item: &NewItineraryItem) -> Result<ItineraryItem, RepoError> {
        if !self.trip_exists(item.trip_id).await? {
            return Err(format!("trip {} not found", item.trip_id).into());
        }
        let item = ItineraryItem::new(item);

        sqlx::query(
            "INSERT INTO itinerary_items (id, trip_id, activity_id, realized_date, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(item.id)
        .bind(item.trip_id)
        .bind(item.activity_id)
        .bind(item.realized_date)
        .bind(item.created_at)
        .execute(&self.pool)
        .await?;

        Ok(item)
    }

    async fn delete_item(&self, trip_id: Uuid, item_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM itinerary_items WHERE id = ?1 AND trip_id = ?2")
            .bind(item_id)
            .bind(trip_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_items(&self, trip_id: Uuid) -> Result<Vec<ItineraryItem>, RepoError> {
        // rowid follows insertion order
        let rows: Vec<ItemRow> = sqlx::query_as(
            "SELECT id, trip_id, activity_id, realized_date, created_at FROM itinerary_items WHERE trip_id = ?1 ORDER BY rowid",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(ItineraryItem::from).collect())
    }

    async fn create_stay(&self, stay: &NewStay) -> Result<Stay, RepoError> {
        if stay.stay_end < stay.stay_start {
            return Err(format!(
                "stay end {} is before stay start {}",
                stay.stay_end, stay.stay_start
            )
            .into());
        }
        if !self.trip_exists(stay.trip_id).await? {
            return Err(format!("trip {} not found", stay.trip_id).into());
        }
        let stay = Stay::new(stay);

        sqlx::query(
            "INSERT INTO stays (id, trip_id, hotel_id, stay_start, stay_end, created_at) VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        )
        .bind(stay.id)
        .bind(stay.trip_id)
        .bind(stay.hotel_id)
        .bind(stay.stay_start)
        .bind(stay.stay_end)
        .bind(stay.created_at)
        .execute(&self.pool)
        .await?;

        Ok(stay)
    }

    async fn delete_stay(&self, trip_id: Uuid, stay_id: Uuid) -> Result<bool, RepoError> {
        let result = sqlx::query("DELETE FROM stays WHERE id = ?1 AND trip_id = ?2")
            .bind(stay_id)
            .bind(trip_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_stays(&self, trip_id: Uuid) -> Result<Vec<Stay>, RepoError> {
        let rows: Vec<StayRow> = sqlx::query_as(
            "SELECT id, trip_id, hotel_id, stay_start, stay_end, created_at FROM stays WHERE trip_id = ?1 ORDER BY rowid",
        )
        .bind(trip_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Stay::from).collect())
    }
}
