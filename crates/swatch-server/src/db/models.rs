use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Imported design file, unique by `file_key`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct DesignFile {
    pub id: Uuid,
    pub file_key: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored design token of a file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
pub struct TokenEntry {
    pub id: Uuid,
    pub file_id: Uuid,
    #[sqlx(rename = "node_id")]
    pub token_id: String,
    pub name: String,
    #[sqlx(rename = "type")]
    pub category: String,
    #[sqlx(rename = "raw_data")]
    pub raw_payload: serde_json::Value,
    pub created_at: DateTime<Utc>,
}

/// File attributes refreshed on every sync
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileMetadata {
    pub name: String,
    pub thumbnail_url: Option<String>,
}
