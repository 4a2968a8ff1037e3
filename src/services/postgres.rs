use async_trait::async_trait;
use serde::de::DeserializeOwned;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use uuid::Uuid;

use crate::models::{Brief, MatchResult, NewMatchResult, Venue};
use crate::services::store::{BriefSource, ResultStore, StoreError, VenueCatalog};

/// PostgreSQL client for the venue catalog, briefs and match results
///
/// Venues and briefs are owned by the CRUD side of the system and only read
/// here. Match sets are written once per brief: a `match_runs` row keyed by
/// brief plus the ranked `match_results` rows, committed in one transaction.
pub struct PostgresClient {
    pool: PgPool,
}

impl PostgresClient {
    /// Create a new PostgreSQL client from a connection string
    pub async fn new(
        database_url: &str,
        max_connections: u32,
        min_connections: u32,
        acquire_timeout: Duration,
        idle_timeout: Duration,
    ) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .min_connections(min_connections)
            .acquire_timeout(acquire_timeout)
            .idle_timeout(idle_timeout)
            .test_before_acquire(true)
            .connect(database_url)
            .await?;

        // Run migrations on startup
        sqlx::migrate!("./migrations").run(&pool).await?;

        Ok(Self { pool })
    }

    /// Create a new PostgreSQL client from settings
    pub async fn from_settings(
        url: &str,
        max_connections: Option<u32>,
        min_connections: Option<u32>,
        acquire_timeout_secs: Option<u64>,
        idle_timeout_secs: Option<u64>,
    ) -> Result<Self, StoreError> {
        tracing::info!("Connecting to PostgreSQL");

        Self::new(
            url,
            max_connections.unwrap_or(10),
            min_connections.unwrap_or(1),
            Duration::from_secs(acquire_timeout_secs.unwrap_or(5)),
            Duration::from_secs(idle_timeout_secs.unwrap_or(600)),
        )
        .await
    }
}

fn parse_enum<T: DeserializeOwned>(column: &str, value: String) -> Result<T, StoreError> {
    serde_json::from_value(serde_json::Value::String(value.clone()))
        .map_err(|_| StoreError::InvalidRow(format!("unexpected {} value: {}", column, value)))
}

fn non_negative(column: &str, value: i32) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::InvalidRow(format!("negative {}: {}", column, value)))
}

fn venue_from_row(row: &PgRow) -> Result<Venue, StoreError> {
    Ok(Venue {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        description: row.try_get("description")?,
        borough: parse_enum("borough", row.try_get("borough")?)?,
        neighborhood: row.try_get("neighborhood")?,
        address: row.try_get("address")?,
        capacity_min: non_negative("capacity_min", row.try_get("capacity_min")?)?,
        capacity_max: non_negative("capacity_max", row.try_get("capacity_max")?)?,
        base_price: row.try_get("base_price")?,
        min_spend: row.try_get("min_spend")?,
        verification_status: parse_enum("verification_status", row.try_get("verification_status")?)?,
    })
}

fn brief_from_row(row: &PgRow) -> Result<Brief, StoreError> {
    let borough_pref: Option<String> = row.try_get("borough_pref")?;

    Ok(Brief {
        id: row.try_get("id")?,
        event_type: parse_enum("event_type", row.try_get("event_type")?)?,
        headcount: non_negative("headcount", row.try_get("headcount")?)?,
        date_preferred: row.try_get("date_preferred")?,
        date_flexible: row.try_get("date_flexible")?,
        borough_pref: borough_pref
            .map(|b| parse_enum("borough_pref", b))
            .transpose()?,
        neighborhood_pref: row.try_get("neighborhood_pref")?,
        budget_min: row.try_get("budget_min")?,
        budget_max: row.try_get("budget_max")?,
        food_bev_level: parse_enum("food_bev_level", row.try_get("food_bev_level")?)?,
        alcohol_level: parse_enum("alcohol_level", row.try_get("alcohol_level")?)?,
        av_needs: parse_enum("av_needs", row.try_get("av_needs")?)?,
    })
}

/// Map a write failure, turning uniqueness violations into conflicts
fn map_insert_error(brief_id: i64, err: sqlx::Error) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => StoreError::Conflict(brief_id),
        _ => StoreError::SqlxError(err),
    }
}

const VENUE_COLUMNS: &str = r#"
    id, name, description, borough, neighborhood, address,
    capacity_min, capacity_max, base_price, min_spend, verification_status
"#;

#[async_trait]
impl VenueCatalog for PostgresClient {
    async fn list_verified_venues(&self) -> Result<Vec<Venue>, StoreError> {
        let query = format!(
            "SELECT {} FROM venues WHERE verification_status = 'verified' ORDER BY id",
            VENUE_COLUMNS
        );

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let venues = rows.iter().map(venue_from_row).collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Loaded {} verified venues", venues.len());

        Ok(venues)
    }

    async fn get_venue(&self, venue_id: i64) -> Result<Option<Venue>, StoreError> {
        let query = format!("SELECT {} FROM venues WHERE id = $1", VENUE_COLUMNS);

        let row = sqlx::query(&query)
            .bind(venue_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(venue_from_row).transpose()
    }
}

#[async_trait]
impl BriefSource for PostgresClient {
    async fn get_brief(&self, brief_id: i64) -> Result<Option<Brief>, StoreError> {
        let query = r#"
            SELECT id, event_type, headcount, date_preferred, date_flexible,
                   borough_pref, neighborhood_pref, budget_min, budget_max,
                   food_bev_level, alcohol_level, av_needs
            FROM event_briefs
            WHERE id = $1
        "#;

        let row = sqlx::query(query)
            .bind(brief_id)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(brief_from_row).transpose()
    }
}

#[async_trait]
impl ResultStore for PostgresClient {
    async fn count_results(&self, brief_id: i64) -> Result<usize, StoreError> {
        let query = r#"
            SELECT COUNT(*) AS total
            FROM match_results
            WHERE brief_id = $1
        "#;

        let row = sqlx::query(query).bind(brief_id).fetch_one(&self.pool).await?;
        let total: i64 = row.try_get("total")?;

        Ok(total as usize)
    }

    async fn is_generated(&self, brief_id: i64) -> Result<bool, StoreError> {
        let query = r#"
            SELECT EXISTS (SELECT 1 FROM match_runs WHERE brief_id = $1)
                OR EXISTS (SELECT 1 FROM match_results WHERE brief_id = $1) AS generated
        "#;

        let row = sqlx::query(query).bind(brief_id).fetch_one(&self.pool).await?;

        Ok(row.try_get("generated")?)
    }

    /// Commit a full ranked set in one transaction
    ///
    /// The `match_runs` primary key and the `(brief_id, rank)` and
    /// `(brief_id, venue_id)` unique indexes make a second writer fail with
    /// [`StoreError::Conflict`]. Any failure rolls the whole set back.
    async fn insert_results(
        &self,
        brief_id: i64,
        run_id: Uuid,
        results: &[NewMatchResult],
    ) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO match_runs (brief_id, run_id, result_count, completed_at)
            VALUES ($1, $2, $3, NOW())
            "#,
        )
        .bind(brief_id)
        .bind(run_id)
        .bind(results.len() as i32)
        .execute(&mut *tx)
        .await
        .map_err(|e| map_insert_error(brief_id, e))?;

        for result in results {
            sqlx::query(
                r#"
                INSERT INTO match_results (brief_id, venue_id, score, explanation, rank, created_at)
                VALUES ($1, $2, $3, $4, $5, NOW())
                "#,
            )
            .bind(brief_id)
            .bind(result.venue_id)
            .bind(result.score)
            .bind(&result.explanation)
            .bind(result.rank as i32)
            .execute(&mut *tx)
            .await
            .map_err(|e| map_insert_error(brief_id, e))?;
        }

        tx.commit().await?;

        tracing::debug!("Committed {} match results for brief {}", results.len(), brief_id);

        Ok(())
    }

    async fn list_results(&self, brief_id: i64) -> Result<Vec<MatchResult>, StoreError> {
        let query = r#"
            SELECT id, brief_id, venue_id, score, explanation, rank, created_at
            FROM match_results
            WHERE brief_id = $1
            ORDER BY rank ASC
        "#;

        let rows = sqlx::query(query).bind(brief_id).fetch_all(&self.pool).await?;

        rows.iter()
            .map(|row| -> Result<MatchResult, StoreError> {
                Ok(MatchResult {
                    id: row.try_get("id")?,
                    brief_id: row.try_get("brief_id")?,
                    venue_id: row.try_get("venue_id")?,
                    score: row.try_get("score")?,
                    explanation: row.try_get("explanation")?,
                    rank: non_negative("rank", row.try_get("rank")?)?,
                    created_at: row.try_get("created_at")?,
                })
            })
            .collect()
    }

    /// Health check for the database connection
    async fn health_check(&self) -> Result<bool, StoreError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}
