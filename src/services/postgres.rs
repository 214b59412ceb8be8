use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{NeighborhoodPatch, NeighborhoodRecord, NewNeighborhood};

/// Errors that can occur when interacting with PostgreSQL
#[derive(Debug, Error)]
pub enum PostgresError {
    #[error("SQLx error: {0}")]
    SqlxError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrateError(#[from] sqlx::migrate::MigrateError),

    #[error("Malformed row: {0}")]
    MalformedRow(String),
}

const SELECT_COLUMNS: &str =
    "id, name, city, safety, pollution, cleanliness, greenery, budget, data_sources, last_updated";

/// PostgreSQL-backed neighborhood catalog
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
    ) -> Result<Self, PostgresError> {
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
    ) -> Result<Self, PostgresError> {
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

    /// Fetch all neighborhoods, or those of one city
    ///
    /// Rows come back ordered by `(name, id)` so that ranking ties resolve
    /// the same way on every request.
    pub async fn fetch_candidates(
        &self,
        city: Option<&str>,
    ) -> Result<Vec<NeighborhoodRecord>, PostgresError> {
        let rows = match city {
            Some(city) => {
                let query = format!(
                    "SELECT {} FROM neighborhoods WHERE city = $1 ORDER BY name, id",
                    SELECT_COLUMNS
                );
                sqlx::query(&query).bind(city).fetch_all(&self.pool).await?
            }
            None => {
                let query = format!("SELECT {} FROM neighborhoods ORDER BY name, id", SELECT_COLUMNS);
                sqlx::query(&query).fetch_all(&self.pool).await?
            }
        };

        let records = rows.iter().map(record_from_row).collect::<Result<Vec<_>, _>>()?;

        tracing::debug!("Fetched {} neighborhoods (city: {:?})", records.len(), city);

        Ok(records)
    }

    /// Fetch a single neighborhood by id
    pub async fn get_by_id(&self, id: Uuid) -> Result<Option<NeighborhoodRecord>, PostgresError> {
        let query = format!("SELECT {} FROM neighborhoods WHERE id = $1", SELECT_COLUMNS);

        let row = sqlx::query(&query).bind(id).fetch_optional(&self.pool).await?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// Insert a new neighborhood
    pub async fn create(&self, new: NewNeighborhood) -> Result<NeighborhoodRecord, PostgresError> {
        let query = format!(
            r#"
            INSERT INTO neighborhoods
                (id, name, city, safety, pollution, cleanliness, greenery, budget, data_sources, last_updated)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, NOW())
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(Uuid::new_v4())
            .bind(&new.name)
            .bind(&new.city)
            .bind(i16::from(new.safety))
            .bind(i16::from(new.pollution))
            .bind(i16::from(new.cleanliness))
            .bind(i16::from(new.greenery))
            .bind(new.budget)
            .bind(&new.data_sources)
            .fetch_one(&self.pool)
            .await?;

        record_from_row(&row)
    }

    /// Apply a partial update in a single statement
    ///
    /// Returns `None` when no neighborhood has this id.
    pub async fn update(
        &self,
        id: Uuid,
        patch: NeighborhoodPatch,
    ) -> Result<Option<NeighborhoodRecord>, PostgresError> {
        let query = format!(
            r#"
            UPDATE neighborhoods SET
                name = COALESCE($2::text, name),
                city = COALESCE($3::text, city),
                safety = COALESCE($4::smallint, safety),
                pollution = COALESCE($5::smallint, pollution),
                cleanliness = COALESCE($6::smallint, cleanliness),
                greenery = COALESCE($7::smallint, greenery),
                budget = COALESCE($8::double precision, budget),
                data_sources = COALESCE($9::text[], data_sources),
                last_updated = NOW()
            WHERE id = $1
            RETURNING {}
            "#,
            SELECT_COLUMNS
        );

        let row = sqlx::query(&query)
            .bind(id)
            .bind(patch.name)
            .bind(patch.city)
            .bind(patch.safety.map(i16::from))
            .bind(patch.pollution.map(i16::from))
            .bind(patch.cleanliness.map(i16::from))
            .bind(patch.greenery.map(i16::from))
            .bind(patch.budget)
            .bind(patch.data_sources)
            .fetch_optional(&self.pool)
            .await?;

        row.as_ref().map(record_from_row).transpose()
    }

    /// Delete a neighborhood, returning whether it existed
    pub async fn delete(&self, id: Uuid) -> Result<bool, PostgresError> {
        let result = sqlx::query("DELETE FROM neighborhoods WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Health check for the database connection
    pub async fn health_check(&self) -> Result<bool, PostgresError> {
        sqlx::query("SELECT 1")
            .fetch_one(&self.pool)
            .await
            .map(|_| true)
            .map_err(Into::into)
    }
}

/// Convert a stored row, rejecting metrics outside 0..=100
fn record_from_row(row: &PgRow) -> Result<NeighborhoodRecord, PostgresError> {
    Ok(NeighborhoodRecord {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        city: row.try_get("city")?,
        safety: metric(row, "safety")?,
        pollution: metric(row, "pollution")?,
        cleanliness: metric(row, "cleanliness")?,
        greenery: metric(row, "greenery")?,
        budget: row.try_get("budget")?,
        data_sources: row.try_get("data_sources")?,
        last_updated: row.try_get("last_updated")?,
    })
}

fn metric(row: &PgRow, column: &str) -> Result<u8, PostgresError> {
    let value: i16 = row.try_get(column)?;
    metric_from_i16(column, value)
}

fn metric_from_i16(column: &str, value: i16) -> Result<u8, PostgresError> {
    u8::try_from(value)
        .ok()
        .filter(|v| *v <= 100)
        .ok_or_else(|| PostgresError::MalformedRow(format!("{} out of range: {}", column, value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metric_range_check() {
        assert_eq!(metric_from_i16("safety", 0).unwrap(), 0);
        assert_eq!(metric_from_i16("safety", 100).unwrap(), 100);
        assert!(metric_from_i16("safety", 101).is_err());
        assert!(metric_from_i16("pollution", -1).is_err());
    }
}
