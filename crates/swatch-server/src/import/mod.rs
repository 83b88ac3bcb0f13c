mod extract;
mod styles;
mod variables;

pub use extract::extract;
pub use styles::{enrich_styles, FallbackOutcome, StyleEnrichment};
pub use variables::{fetch_variables, VariablesError};

use swatch_core::parse_file_key;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

use crate::db::models::{DesignFile, FileMetadata};
use crate::db::store::TokenStore;
use crate::db::sync::{record_file, sync, DEFAULT_BATCH_SIZE, MAX_BATCH_SIZE};
use crate::source::{SourceApi, SourceError};

/// Errors ending an import or sync
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Not a valid file key or file URL: {0}")]
    InvalidFileKey(String),

    #[error("Failed to fetch the file: {0}")]
    Transport(#[source] SourceError),

    #[error("The design API response has no document")]
    MalformedResponse,

    #[error(
        "The file was imported, but its variables could not be read: the access token was \
         rejected with 403 (permission denied). Make sure the token has the \
         file_variables:read scope, then sync again."
    )]
    VariablesUnauthorized,

    #[error("The file was imported, but its variables are unavailable: {0}")]
    VariablesUnavailable(String),

    #[error("No design tokens found. Make sure the file has styles or variables defined.")]
    NoTokensFound,

    #[error("Design file {0} not found")]
    FileNotFound(Uuid),

    #[error("Database error: {0}")]
    Storage(#[from] sqlx::Error),
}

/// Imports design files and keeps their tokens in sync
pub struct Importer<A, S> {
    api: A,
    store: S,
    batch_size: usize,
}

impl<A: SourceApi, S: TokenStore> Importer<A, S> {
    pub fn new(api: A, store: S) -> Self {
        Self {
            api,
            store,
            batch_size: DEFAULT_BATCH_SIZE,
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.clamp(1, MAX_BATCH_SIZE);
        self
    }

    /// Import a file by key (or file URL) and store its tokens.
    ///
    /// The file record is saved as soon as the file is fetched. Token
    /// extraction failures leave the previously stored tokens in place.
    pub async fn import_file(
        &self,
        file_key: &str,
        credential: &str,
    ) -> Result<DesignFile, ImportError> {
        let file_key = parse_file_key(file_key)
            .ok_or_else(|| ImportError::InvalidFileKey(file_key.to_string()))?;
        info!(file_key, "Importing design file");

        let file = self
            .api
            .get_file(file_key, credential)
            .await
            .map_err(ImportError::Transport)?;
        if file.document.is_none() {
            return Err(ImportError::MalformedResponse);
        }
        info!(
            file_key,
            last_modified = file.last_modified.as_deref().unwrap_or("unknown"),
            "Fetched design file"
        );

        let meta = FileMetadata {
            name: file.name.clone(),
            thumbnail_url: file.thumbnail_url.clone(),
        };
        let recorded = record_file(&self.store, file_key, &meta).await?;
        info!(file_key, file_id = %recorded.id, name = %recorded.name, "Saved file record");

        let entries = extract(&self.api, &file, file_key, credential).await?;
        let synced = sync(&self.store, file_key, &meta, &entries, self.batch_size).await?;
        info!(
            file_key,
            styles = entries.iter().filter(|e| e.is_style()).count(),
            variables = entries.iter().filter(|e| e.is_variable()).count(),
            "Import finished"
        );

        Ok(synced)
    }

    /// Re-run the import of an already known file
    pub async fn sync_file(
        &self,
        file_id: Uuid,
        credential: &str,
    ) -> Result<DesignFile, ImportError> {
        let file = self
            .store
            .file_by_id(file_id)
            .await?
            .ok_or(ImportError::FileNotFound(file_id))?;

        info!(file_id = %file_id, file_key = %file.file_key, "Syncing design file");
        self.import_file(&file.file_key, credential).await
    }
}
