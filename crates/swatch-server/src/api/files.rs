use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::db::models::{DesignFile, TokenEntry};
use crate::error::AppError;
use crate::AppState;

/// Request to import a design file
#[derive(Debug, Deserialize)]
pub struct ImportFileRequest {
    /// File key or file URL
    pub file_key: String,
    pub access_token: String,
}

/// Request to re-sync a known file
#[derive(Debug, Deserialize)]
pub struct SyncFileRequest {
    pub access_token: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct TokenQuery {
    /// Category prefix, e.g. `STYLE_` or `VARIABLE_COLOR`
    pub category: Option<String>,
}

/// Response for design file operations
#[derive(Debug, Serialize)]
pub struct DesignFileResponse {
    pub id: Uuid,
    pub file_key: String,
    pub name: String,
    pub thumbnail_url: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl From<DesignFile> for DesignFileResponse {
    fn from(file: DesignFile) -> Self {
        Self {
            id: file.id,
            file_key: file.file_key,
            name: file.name,
            thumbnail_url: file.thumbnail_url,
            created_at: file.created_at,
            updated_at: file.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub id: Uuid,
    pub token_id: String,
    pub name: String,
    pub category: String,
    pub raw_payload: serde_json::Value,
}

impl From<TokenEntry> for TokenResponse {
    fn from(token: TokenEntry) -> Self {
        Self {
            id: token.id,
            token_id: token.token_id,
            name: token.name,
            category: token.category,
            raw_payload: token.raw_payload,
        }
    }
}

fn require_token(token: &str) -> Result<&str, AppError> {
    let token = token.trim();
    if token.is_empty() {
        return Err(AppError::BadRequest("access_token is required".to_string()));
    }
    Ok(token)
}

/// List all imported files
async fn list_files(
    State(state): State<AppState>,
) -> Result<Json<Vec<DesignFileResponse>>, AppError> {
    let files = state.db.list_files().await?;
    Ok(Json(files.into_iter().map(Into::into).collect()))
}

/// Import a file and its tokens
async fn import_file(
    State(state): State<AppState>,
    Json(req): Json<ImportFileRequest>,
) -> Result<Json<DesignFileResponse>, AppError> {
    let token = require_token(&req.access_token)?;
    let file = state.importer.import_file(&req.file_key, token).await?;
    Ok(Json(file.into()))
}

/// Get a file by ID
async fn get_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<DesignFileResponse>, AppError> {
    let file = state
        .db
        .get_file(id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Design file {} not found", id)))?;
    Ok(Json(file.into()))
}

/// Re-import a known file
async fn sync_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(req): Json<SyncFileRequest>,
) -> Result<Json<DesignFileResponse>, AppError> {
    let token = require_token(&req.access_token)?;
    let file = state.importer.sync_file(id, token).await?;
    Ok(Json(file.into()))
}

/// Delete a file and its tokens
async fn delete_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<serde_json::Value>, AppError> {
    if !state.db.delete_file(id).await? {
        return Err(AppError::NotFound(format!("Design file {} not found", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// List the tokens of a file
async fn list_tokens(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<TokenQuery>,
) -> Result<Json<Vec<TokenResponse>>, AppError> {
    let category = query.category.map(|c| c.to_uppercase());
    let tokens = state.db.list_tokens(id, category.as_deref()).await?;
    Ok(Json(tokens.into_iter().map(Into::into).collect()))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/files", get(list_files))
        .route("/api/files/import", post(import_file))
        .route("/api/files/{id}", get(get_file).delete(delete_file))
        .route("/api/files/{id}/sync", post(sync_file))
        .route("/api/files/{id}/tokens", get(list_tokens))
}
