use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use uuid::Uuid;
use wayfare_core::repository::{PublicationRepository, RepoError};
use wayfare_shared::{FeedOrder, PublicationRecord, PublicationStatus};

pub struct SqlitePublicationRepository {
    pool: SqlitePool,
}

impl SqlitePublicationRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct PublicationRow {
    id: Uuid,
    trip_id: Uuid,
    publisher_id: String,
    comment: String,
    published_at: DateTime<Utc>,
    like_count: i64,
    viewer_has_liked: i64,
}

impl From<PublicationRow> for PublicationStatus {
    fn from(row: PublicationRow) -> Self {
        PublicationStatus {
            trip_id: row.trip_id,
            viewer_has_liked: row.viewer_has_liked != 0,
            record: Some(PublicationRecord {
                id: row.id,
                trip_id: row.trip_id,
                publisher_id: row.publisher_id,
                comment: row.comment,
                like_count: u32::try_from(row.like_count).unwrap_or(u32::MAX),
                published_at: row.published_at,
            }),
        }
    }
}

// ?1 is always the viewer
const STATUS_SELECT: &str = r#"
    SELECT p.id AS id, p.trip_id AS trip_id, p.publisher_id AS publisher_id,
        p.comment AS comment, p.published_at AS published_at,
        (SELECT COUNT(*) FROM publication_likes l WHERE l.record_id = p.id) AS like_count,
        (SELECT COUNT(*) FROM publication_likes l WHERE l.record_id = p.id AND l.viewer_id = ?1) AS viewer_has_liked
    FROM publications p
"#;

#[async_trait]
impl PublicationRepository for SqlitePublicationRepository {
    async fn publish(
        &self,
        trip_id: Uuid,
        publisher_id: &str,
        comment: &str,
    ) -> Result<PublicationRecord, RepoError> {
        let existing: Option<(Uuid,)> = sqlx::query_as("SELECT id FROM publications WHERE trip_id = ?1")
            .bind(trip_id)
            .fetch_optional(&self.pool)
            .await?;
        if existing.is_some() {
            return Err(format!("trip {trip_id} is already published").into());
        }

        let record = PublicationRecord {
            id: Uuid::new_v4(),
            trip_id,
            publisher_id: publisher_id.to_string(),
            comment: comment.to_string(),
            like_count: 0,
            published_at: Utc::now(),
        };

        // UNIQUE(trip_id) still rejects a concurrent duplicate
        sqlx::query(
            "INSERT INTO publications (id, trip_id, publisher_id, comment, published_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        )
        .bind(record.id)
        .bind(record.trip_id)
        .bind(&record.publisher_id)
        .bind(&record.comment)
        .bind(record.published_at)
        .execute(&self.pool)
        .await?;

        Ok(record)
    }

    async fn unpublish(&self, trip_id: Uuid) -> Result<(), RepoError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            "DELETE FROM publication_likes WHERE record_id IN (SELECT id FROM publications WHERE trip_id = ?1)",
        )
        .bind(trip_id)
        .execute(&mut *tx)
        .await?;
        let result = sqlx::query("DELETE FROM publications WHERE trip_id = ?1")
            .bind(trip_id)
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(format!("trip {trip_id} is not published").into());
        }

        tx.commit().await?;
        Ok(())
    }

    async fn get_status(
        &self,
        trip_id: Uuid,
        viewer_id: &str,
    ) -> Result<PublicationStatus, RepoError> {
        let row: Option<PublicationRow> =
            sqlx::query_as(&format!("{STATUS_SELECT} WHERE p.trip_id = ?2"))
                .bind(viewer_id)
                .bind(trip_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row
            .map(PublicationStatus::from)
            .unwrap_or_else(|| PublicationStatus::private(trip_id)))
    }

    async fn like(&self, record_id: Uuid, viewer_id: &str) -> Result<(), RepoError> {
        if self.record_trip(record_id).await?.is_none() {
            return Err(format!("publication {record_id} not found").into());
        }

        sqlx::query(
            "INSERT OR IGNORE INTO publication_likes (record_id, viewer_id, liked_at) VALUES (?1, ?2, ?3)",
        )
        .bind(record_id)
        .bind(viewer_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn unlike(&self, record_id: Uuid, viewer_id: &str) -> Result<(), RepoError> {
        if self.record_trip(record_id).await?.is_none() {
            return Err(format!("publication {record_id} not found").into());
        }

        sqlx::query("DELETE FROM publication_likes WHERE record_id = ?1 AND viewer_id = ?2")
            .bind(record_id)
            .bind(viewer_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn record_trip(&self, record_id: Uuid) -> Result<Option<Uuid>, RepoError> {
        let row: Option<(Uuid,)> = sqlx::query_as("SELECT trip_id FROM publications WHERE id = ?1")
            .bind(record_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|(trip_id,)| trip_id))
    }

    async fn list_feed(
        &self,
        order: FeedOrder,
        viewer_id: &str,
        limit: usize,
    ) -> Result<Vec<PublicationStatus>, RepoError> {
        let order_by = match order {
            FeedOrder::Recent => "p.published_at DESC",
            FeedOrder::Popular => "like_count DESC, p.published_at DESC",
        };
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows: Vec<PublicationRow> =
            sqlx::query_as(&format!("{STATUS_SELECT} ORDER BY {order_by} LIMIT ?2"))
                .bind(viewer_id)
                .bind(limit)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().map(PublicationStatus::from).collect())
    }
}
