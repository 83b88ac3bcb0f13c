use swatch_core::NewTokenEntry;
use tracing::{debug, info};

use super::models::{DesignFile, FileMetadata};
use super::store::{SyncTransaction, TokenStore};

/// Rows per insert statement
pub const DEFAULT_BATCH_SIZE: usize = 50;

/// Bound parameters per token row
const TOKEN_ROW_BINDS: usize = 5;

/// Largest batch that stays within Postgres' 65535 bind parameters per statement
pub const MAX_BATCH_SIZE: usize = u16::MAX as usize / TOKEN_ROW_BINDS;

/// Create or refresh the file record on its own
pub async fn record_file<S: TokenStore>(
    store: &S,
    file_key: &str,
    meta: &FileMetadata,
) -> Result<DesignFile, sqlx::Error> {
    let mut tx = store.begin().await?;
    let file = tx.upsert_file(file_key, meta).await?;
    tx.commit().await?;
    Ok(file)
}

/// Upsert the file and replace its whole token set with `entries`.
///
/// Runs in one transaction: if any batch fails nothing is written.
pub async fn sync<S: TokenStore>(
    store: &S,
    file_key: &str,
    meta: &FileMetadata,
    entries: &[NewTokenEntry],
    batch_size: usize,
) -> Result<DesignFile, sqlx::Error> {
    let mut tx = store.begin().await?;
    let file = tx.upsert_file(file_key, meta).await?;

    let removed = tx.delete_tokens(file.id).await?;
    let mut inserted = 0;
    for batch in entries.chunks(batch_size.clamp(1, MAX_BATCH_SIZE)) {
        inserted += tx.insert_tokens(file.id, batch).await?;
        debug!(file_id = %file.id, rows = batch.len(), "Inserted token batch");
    }

    tx.commit().await?;
    info!(
        file_key,
        file_id = %file.id,
        removed,
        inserted,
        "Replaced token entries"
    );

    Ok(file)
}
