//! Design API seam: the three endpoints the importer consumes.

mod figma;

pub use figma::{FigmaClient, FigmaTimeouts, FIGMA_API_BASE};

use async_trait::async_trait;
use serde::Deserialize;
use std::collections::BTreeMap;
use swatch_core::{LocalVariablesResponse, Node, StyleMeta, Variable, VariableCollection};
use thiserror::Error;

/// Errors returned by the design API client
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    #[error("design API returned {status}: {message}")]
    Status { status: u16, message: String },

    #[error("design API request failed: {0}")]
    Network(String),

    #[error("failed to decode design API response: {0}")]
    Decode(String),
}

impl SourceError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SourceError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            SourceError::Decode(e.to_string())
        } else {
            SourceError::Network(e.to_string())
        }
    }
}

/// Response of the file endpoint
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileResponse {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub last_modified: Option<String>,
    #[serde(default)]
    pub document: Option<Node>,
    /// Style metadata keyed by style id; carries no values
    #[serde(default)]
    pub styles: BTreeMap<String, StyleMeta>,
    #[serde(default)]
    pub variables: BTreeMap<String, Variable>,
    #[serde(default)]
    pub variable_collections: BTreeMap<String, VariableCollection>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeEntry {
    #[serde(default)]
    pub document: Option<Node>,
}

/// Response of the node lookup endpoint; ids the source could not find map to `null`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodesResponse {
    #[serde(default)]
    pub nodes: BTreeMap<String, Option<NodeEntry>>,
}

impl NodesResponse {
    pub fn document(&self, node_id: &str) -> Option<&Node> {
        self.nodes.get(node_id)?.as_ref()?.document.as_ref()
    }
}

/// The design tool's REST API. The credential is passed on every call.
#[async_trait]
pub trait SourceApi: Send + Sync {
    async fn get_file(&self, file_key: &str, credential: &str)
        -> Result<FileResponse, SourceError>;

    async fn get_nodes(
        &self,
        file_key: &str,
        node_ids: &[String],
        credential: &str,
    ) -> Result<NodesResponse, SourceError>;

    async fn get_local_variables(
        &self,
        file_key: &str,
        credential: &str,
    ) -> Result<LocalVariablesResponse, SourceError>;
}
