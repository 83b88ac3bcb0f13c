#[cfg(test)]
pub(crate) mod memory;
pub mod models;
pub mod store;
pub mod sync;

use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Postgres, QueryBuilder, Transaction};
use swatch_core::NewTokenEntry;
use uuid::Uuid;

use crate::error::AppError;
use models::{DesignFile, FileMetadata, TokenEntry};
use store::{SyncTransaction, TokenStore};

const FILE_COLUMNS: &str = "id, file_key, name, thumbnail_url, created_at, updated_at";

/// Database connection wrapper
#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    /// Connect to the database
    pub async fn connect(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self { pool })
    }

    /// Create the pool without opening a connection yet
    pub fn connect_lazy(database_url: &str) -> anyhow::Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_lazy(database_url)?;

        Ok(Self { pool })
    }

    /// Run database migrations
    pub async fn migrate(&self) -> anyhow::Result<()> {
        sqlx::migrate!("../../migrations").run(&self.pool).await?;
        Ok(())
    }

    /// List all design files, most recently synced first
    pub async fn list_files(&self) -> Result<Vec<DesignFile>, AppError> {
        let files = sqlx::query_as::<_, DesignFile>(&format!(
            "SELECT {} FROM design_files ORDER BY updated_at DESC",
            FILE_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await?;

        Ok(files)
    }

    /// Get a design file by ID
    pub async fn get_file(&self, id: Uuid) -> Result<Option<DesignFile>, AppError> {
        Ok(self.file_by_id(id).await?)
    }

    /// Delete a design file; its tokens go with it
    pub async fn delete_file(&self, id: Uuid) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM design_files WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Tokens of a file, optionally limited to categories starting with
    /// `category` (compared literally, no wildcards)
    pub async fn list_tokens(
        &self,
        file_id: Uuid,
        category: Option<&str>,
    ) -> Result<Vec<TokenEntry>, AppError> {
        let tokens = sqlx::query_as::<_, TokenEntry>(
            r#"
            SELECT id, file_id, node_id, name, type, raw_data, created_at
            FROM token_entries
            WHERE file_id = $1 AND ($2::TEXT IS NULL OR left(type, length($2)) = $2)
            ORDER BY type, name
            "#,
        )
        .bind(file_id)
        .bind(category)
        .fetch_all(&self.pool)
        .await?;

        Ok(tokens)
    }
}

#[async_trait]
impl TokenStore for Database {
    type Tx = PgSyncTransaction;

    async fn begin(&self) -> Result<PgSyncTransaction, sqlx::Error> {
        Ok(PgSyncTransaction {
            tx: self.pool.begin().await?,
        })
    }

    async fn file_by_id(&self, id: Uuid) -> Result<Option<DesignFile>, sqlx::Error> {
        sqlx::query_as::<_, DesignFile>(&format!(
            "SELECT {} FROM design_files WHERE id = $1",
            FILE_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }
}

/// Postgres transaction; rolled back on drop unless committed
pub struct PgSyncTransaction {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl SyncTransaction for PgSyncTransaction {
    async fn upsert_file(
        &mut self,
        file_key: &str,
        meta: &FileMetadata,
    ) -> Result<DesignFile, sqlx::Error> {
        // The conflict update locks the row until commit, so syncs of the
        // same file key run one after the other.
        sqlx::query_as::<_, DesignFile>(&format!(
            r#"
            INSERT INTO design_files (file_key, name, thumbnail_url)
            VALUES ($1, $2, $3)
            ON CONFLICT (file_key)
            DO UPDATE SET name = EXCLUDED.name,
                          thumbnail_url = EXCLUDED.thumbnail_url,
                          updated_at = NOW()
            RETURNING {}
            "#,
            FILE_COLUMNS
        ))
        .bind(file_key)
        .bind(&meta.name)
        .bind(&meta.thumbnail_url)
        .fetch_one(&mut *self.tx)
        .await
    }

    async fn delete_tokens(&mut self, file_id: Uuid) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM token_entries WHERE file_id = $1")
            .bind(file_id)
            .execute(&mut *self.tx)
            .await?;

        Ok(result.rows_affected())
    }

    async fn insert_tokens(
        &mut self,
        file_id: Uuid,
        batch: &[NewTokenEntry],
    ) -> Result<u64, sqlx::Error> {
        if batch.is_empty() {
            return Ok(0);
        }

        let mut query = QueryBuilder::<Postgres>::new(
            "INSERT INTO token_entries (file_id, node_id, name, type, raw_data) ",
        );
        query.push_values(batch, |mut row, entry| {
            row.push_bind(file_id)
                .push_bind(entry.token_id.clone())
                .push_bind(entry.name.clone())
                .push_bind(entry.category.clone())
                .push_bind(entry.raw_payload.clone());
        });

        let result = query.build().execute(&mut *self.tx).await?;
        Ok(result.rows_affected())
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await
    }
}
