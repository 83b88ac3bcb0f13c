use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::import::ImportError;

/// Application error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error(transparent)]
    Import(#[from] ImportError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Database(e) | AppError::Import(ImportError::Storage(e)) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error".to_string())
            }
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Import(e) => {
                let status = match e {
                    ImportError::InvalidFileKey(_) => StatusCode::BAD_REQUEST,
                    ImportError::FileNotFound(_) => StatusCode::NOT_FOUND,
                    ImportError::Transport(source) if source.status() == Some(403) => {
                        StatusCode::FORBIDDEN
                    }
                    ImportError::Transport(source) if source.status() == Some(404) => {
                        StatusCode::NOT_FOUND
                    }
                    ImportError::Transport(_) | ImportError::MalformedResponse => {
                        StatusCode::BAD_GATEWAY
                    }
                    ImportError::VariablesUnauthorized => StatusCode::FORBIDDEN,
                    ImportError::VariablesUnavailable(_) | ImportError::NoTokensFound => {
                        StatusCode::UNPROCESSABLE_ENTITY
                    }
                    ImportError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                tracing::warn!("Import failed: {}", e);
                (status, e.to_string())
            }
        };

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}
