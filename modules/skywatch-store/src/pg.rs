use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{PgPool, Row};
use tracing::info;

use skywatch_common::{ExtractionRecord, SocialPost};

use crate::error::Result;
use crate::{PostSource, RecordStore, UpsertOutcome};

/// Postgres-backed record store. The `tweet_id` primary key plus
/// `ON CONFLICT DO NOTHING` makes the duplicate check atomic per key even
/// under concurrent writers.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create both tables if missing. Run once at startup.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS social_posts (
                tweet_id   TEXT PRIMARY KEY,
                ts         TIMESTAMPTZ NOT NULL,
                tweet_text TEXT NOT NULL,
                hashtags   TEXT NOT NULL DEFAULT ''
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS disaster_reports (
                tweet_id            TEXT PRIMARY KEY,
                ts                  TEXT NOT NULL,
                tweet_text          TEXT NOT NULL,
                is_genuine_disaster BOOLEAN NOT NULL,
                disaster_type       TEXT NOT NULL,
                location            TEXT NOT NULL,
                severity_score      DOUBLE PRECISION,
                latitude            DOUBLE PRECISION,
                longitude           DOUBLE PRECISION
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        info!("Store migrations applied");
        Ok(())
    }
}

#[async_trait]
impl RecordStore for PgStore {
    async fn exists(&self, tweet_id: &str) -> Result<bool> {
        let row = sqlx::query("SELECT 1 FROM disaster_reports WHERE tweet_id = $1")
            .bind(tweet_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn insert(&self, record: &ExtractionRecord) -> Result<UpsertOutcome> {
        let result = sqlx::query(
            r#"
            INSERT INTO disaster_reports
                (tweet_id, ts, tweet_text, is_genuine_disaster, disaster_type,
                 location, severity_score, latitude, longitude)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (tweet_id) DO NOTHING
            "#,
        )
        .bind(&record.tweet_id)
        .bind(&record.timestamp)
        .bind(&record.text)
        .bind(record.is_genuine_disaster)
        .bind(&record.disaster_type)
        .bind(&record.location)
        .bind(record.severity_score)
        .bind(record.latitude)
        .bind(record.longitude)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            Ok(UpsertOutcome::DuplicateSkipped)
        } else {
            Ok(UpsertOutcome::Inserted)
        }
    }

    async fn update_coordinates(
        &self,
        tweet_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<()> {
        sqlx::query(
            "UPDATE disaster_reports SET latitude = $2, longitude = $3 WHERE tweet_id = $1",
        )
        .bind(tweet_id)
        .bind(latitude)
        .bind(longitude)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn missing_coordinates(&self) -> Result<Vec<ExtractionRecord>> {
        let rows = sqlx::query(
            r#"
            SELECT tweet_id, ts, tweet_text, is_genuine_disaster, disaster_type,
                   location, severity_score, latitude, longitude
            FROM disaster_reports
            WHERE is_genuine_disaster
              AND latitude IS NULL
              AND lower(location) NOT IN ('none', 'not specified')
            ORDER BY tweet_id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(row_to_record).collect())
    }
}

#[async_trait]
impl PostSource for PgStore {
    async fn fetch_window(&self, day: NaiveDate) -> Result<Vec<SocialPost>> {
        let start = day.and_hms_opt(0, 0, 0).expect("midnight is valid").and_utc();
        let end = start + chrono::Duration::days(1);

        let rows = sqlx::query_as::<_, (String, chrono::DateTime<chrono::Utc>, String, String)>(
            r#"
            SELECT tweet_id, ts, tweet_text, hashtags
            FROM social_posts
            WHERE ts >= $1 AND ts < $2
            ORDER BY ts
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, ts, text, hashtags)| SocialPost {
                id,
                timestamp: ts.format("%Y-%m-%d %H:%M:%S").to_string(),
                text,
                hashtags,
            })
            .collect())
    }
}

fn row_to_record(row: sqlx::postgres::PgRow) -> ExtractionRecord {
    ExtractionRecord {
        tweet_id: row.get("tweet_id"),
        timestamp: row.get("ts"),
        text: row.get("tweet_text"),
        is_genuine_disaster: row.get("is_genuine_disaster"),
        disaster_type: row.get("disaster_type"),
        location: row.get("location"),
        severity_score: row.get("severity_score"),
        latitude: row.get("latitude"),
        longitude: row.get("longitude"),
    }
}
