use swatch_core::variable::entries_from_local;
use swatch_core::NewTokenEntry;
use thiserror::Error;

use crate::source::{SourceApi, SourceError};

#[derive(Debug, Error)]
pub enum VariablesError {
    /// The endpoint answered 403; the token lacks the variables scope
    #[error("access token rejected with 403: {0}")]
    Unauthorized(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Read the file's local variables from the dedicated endpoint
pub async fn fetch_variables<A: SourceApi + ?Sized>(
    api: &A,
    file_key: &str,
    credential: &str,
) -> Result<Vec<NewTokenEntry>, VariablesError> {
    let response = api
        .get_local_variables(file_key, credential)
        .await
        .map_err(|e| match e {
            SourceError::Status {
                status: 403,
                message,
            } => VariablesError::Unauthorized(message),
            other => VariablesError::Unavailable(other.to_string()),
        })?;

    entries_from_local(&response).map_err(|e| VariablesError::Unavailable(e.to_string()))
}
