use async_trait::async_trait;
use swatch_core::NewTokenEntry;
use uuid::Uuid;

use super::models::{DesignFile, FileMetadata};

/// Storage used by the importer.
///
/// Writes go through a [`SyncTransaction`]; nothing is visible to readers
/// until it is committed, and dropping it discards its writes.
#[async_trait]
pub trait TokenStore: Send + Sync {
    type Tx: SyncTransaction;

    async fn begin(&self) -> Result<Self::Tx, sqlx::Error>;

    async fn file_by_id(&self, id: Uuid) -> Result<Option<DesignFile>, sqlx::Error>;
}

#[async_trait]
pub trait SyncTransaction: Send {
    /// Create the file or refresh its name and thumbnail, keyed by `file_key`
    async fn upsert_file(
        &mut self,
        file_key: &str,
        meta: &FileMetadata,
    ) -> Result<DesignFile, sqlx::Error>;

    /// Remove every token of the file, returning how many were removed
    async fn delete_tokens(&mut self, file_id: Uuid) -> Result<u64, sqlx::Error>;

    async fn insert_tokens(
        &mut self,
        file_id: Uuid,
        batch: &[NewTokenEntry],
    ) -> Result<u64, sqlx::Error>;

    async fn commit(self) -> Result<(), sqlx::Error>;
}
