//! PostgreSQL listing store.
//!
//! Each listing is one row: the field map as a JSONB document plus the two
//! checksums as columns. Field-level merges use JSONB concatenation
//! (`document || patch`), which overwrites the patch's top-level keys and
//! keeps every other key, such as enrichment fields from an earlier run.

use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::FromRow;
use std::collections::HashSet;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};

use crate::error::{CollaboratorError, CollaboratorResult};
use crate::traits::store::ListingStore;
use crate::types::{ListingFields, ListingUpdate, StoredListing};

/// PostgreSQL-backed listing store.
#[derive(Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

#[derive(FromRow)]
struct ListingRow {
    id: String,
    document: serde_json::Value,
    check_sum_json: i64,
    check_sum_description: i64,
}

impl ListingRow {
    fn into_listing(self) -> CollaboratorResult<StoredListing> {
        let fields: ListingFields =
            serde_json::from_value(self.document).map_err(CollaboratorError::store)?;
        Ok(StoredListing {
            id: self.id,
            fields,
            check_sum_json: checksum_from_column(self.check_sum_json)?,
            check_sum_description: checksum_from_column(self.check_sum_description)?,
        })
    }
}

fn checksum_from_column(value: i64) -> CollaboratorResult<u32> {
    u32::try_from(value).map_err(|_| {
        CollaboratorError::UnexpectedResponse(format!("checksum {value} out of u32 range"))
    })
}

impl PostgresStore {
    /// Connect with a bounded pool. `acquire_timeout` caps how long a store
    /// call may wait for a connection.
    pub async fn connect(
        database_url: &str,
        acquire_timeout: Duration,
    ) -> CollaboratorResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .acquire_timeout(acquire_timeout)
            .connect(database_url)
            .await
            .map_err(CollaboratorError::store)?;
        info!("Connected to listing store");
        Ok(Self { pool })
    }

    /// Wrap an existing pool.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Run embedded schema migrations.
    pub async fn migrate(&self) -> CollaboratorResult<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(CollaboratorError::store)?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl ListingStore for PostgresStore {
    #[instrument(skip(self))]
    async fn find(&self, id: &str) -> CollaboratorResult<Option<StoredListing>> {
        let row = sqlx::query_as::<_, ListingRow>(
            "SELECT id, document, check_sum_json, check_sum_description
             FROM listings
             WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(CollaboratorError::store)?;

        row.map(ListingRow::into_listing).transpose()
    }

    #[instrument(skip(self, listing), fields(id = %listing.id))]
    async fn insert(&self, listing: &StoredListing) -> CollaboratorResult<()> {
        let document = serde_json::to_value(&listing.fields).map_err(CollaboratorError::store)?;

        sqlx::query(
            r#"
            INSERT INTO listings (id, document, check_sum_json, check_sum_description)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                document = EXCLUDED.document,
                check_sum_json = EXCLUDED.check_sum_json,
                check_sum_description = EXCLUDED.check_sum_description,
                updated_at = NOW()
            "#,
        )
        .bind(&listing.id)
        .bind(document)
        .bind(i64::from(listing.check_sum_json))
        .bind(i64::from(listing.check_sum_description))
        .execute(&self.pool)
        .await
        .map_err(CollaboratorError::store)?;

        debug!("Inserted listing");
        Ok(())
    }

    #[instrument(skip(self, update))]
    async fn update_fields(&self, id: &str, update: &ListingUpdate) -> CollaboratorResult<bool> {
        let patch = serde_json::to_value(&update.fields).map_err(CollaboratorError::store)?;

        let result = sqlx::query(
            r#"
            UPDATE listings
            SET document = document || $2,
                check_sum_json = $3,
                check_sum_description = $4,
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(patch)
        .bind(i64::from(update.checksums.json))
        .bind(i64::from(update.checksums.description))
        .execute(&self.pool)
        .await
        .map_err(CollaboratorError::store)?;

        let matched = result.rows_affected() > 0;
        if !matched {
            warn!("Update matched no listing (deleted concurrently?)");
        }
        Ok(matched)
    }

    async fn list_ids(&self) -> CollaboratorResult<HashSet<String>> {
        let ids: Vec<String> = sqlx::query_scalar("SELECT id FROM listings")
            .fetch_all(&self.pool)
            .await
            .map_err(CollaboratorError::store)?;
        Ok(ids.into_iter().collect())
    }

    #[instrument(skip(self, ids), fields(count = ids.len()))]
    async fn delete_many(&self, ids: &[String]) -> CollaboratorResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let result = sqlx::query("DELETE FROM listings WHERE id = ANY($1)")
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(CollaboratorError::store)?;

        Ok(result.rows_affected())
    }
}
