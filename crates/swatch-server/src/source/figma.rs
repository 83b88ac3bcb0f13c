use async_trait::async_trait;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use swatch_core::LocalVariablesResponse;

use super::{FileResponse, NodesResponse, SourceApi, SourceError};

pub const FIGMA_API_BASE: &str = "https://api.figma.com/v1";
const TOKEN_HEADER: &str = "X-Figma-Token";

/// Per-endpoint request timeouts
#[derive(Debug, Clone)]
pub struct FigmaTimeouts {
    pub file: Duration,
    pub nodes: Duration,
    /// Kept short: the variables endpoint is not available for every file
    pub variables: Duration,
}

impl Default for FigmaTimeouts {
    fn default() -> Self {
        Self {
            file: Duration::from_secs(60),
            nodes: Duration::from_secs(30),
            variables: Duration::from_secs(15),
        }
    }
}

/// Figma REST API client
#[derive(Clone)]
pub struct FigmaClient {
    http: Client,
    base_url: String,
    timeouts: FigmaTimeouts,
}

impl FigmaClient {
    pub fn new(base_url: impl Into<String>, timeouts: FigmaTimeouts) -> Result<Self, SourceError> {
        let http = Client::builder()
            .user_agent(concat!("swatch/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeouts,
        })
    }

    async fn send<T: DeserializeOwned>(
        &self,
        request: RequestBuilder,
        credential: &str,
        timeout: Duration,
    ) -> Result<T, SourceError> {
        let response = request
            .header(TOKEN_HEADER, credential)
            .header("Accept", "application/json")
            .timeout(timeout)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let body = response.bytes().await?;
        decode(&body)
    }
}

/// Decode a response body with no nesting limit.
///
/// Document depth is chosen by the file's author; the stack grows on the
/// heap while decoding and the walker applies its own depth cap afterwards.
pub(crate) fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T, SourceError> {
    let mut de = serde_json::Deserializer::from_slice(body);
    de.disable_recursion_limit();
    let value = T::deserialize(serde_stacker::Deserializer::new(&mut de))
        .map_err(|e| SourceError::Decode(e.to_string()))?;
    de.end().map_err(|e| SourceError::Decode(e.to_string()))?;
    Ok(value)
}

/// The `err` or `message` field of an error body, else the start of the raw body
pub(crate) fn error_message(body: &str) -> String {
    let parsed = serde_json::from_str::<Value>(body).ok();
    parsed
        .as_ref()
        .and_then(|v| v.get("err").or_else(|| v.get("message")))
        .and_then(Value::as_str)
        .map(str::to_string)
        .unwrap_or_else(|| body.chars().take(200).collect())
}

#[async_trait]
impl SourceApi for FigmaClient {
    async fn get_file(
        &self,
        file_key: &str,
        credential: &str,
    ) -> Result<FileResponse, SourceError> {
        let url = format!("{}/files/{}", self.base_url, file_key);
        tracing::debug!("GET {}", url);
        self.send(self.http.get(&url), credential, self.timeouts.file)
            .await
    }

    async fn get_nodes(
        &self,
        file_key: &str,
        node_ids: &[String],
        credential: &str,
    ) -> Result<NodesResponse, SourceError> {
        let url = format!("{}/files/{}/nodes", self.base_url, file_key);
        tracing::debug!("GET {} ({} ids)", url, node_ids.len());
        let request = self.http.get(&url).query(&[("ids", node_ids.join(","))]);
        self.send(request, credential, self.timeouts.nodes).await
    }

    async fn get_local_variables(
        &self,
        file_key: &str,
        credential: &str,
    ) -> Result<LocalVariablesResponse, SourceError> {
        let url = format!("{}/files/{}/variables/local", self.base_url, file_key);
        tracing::debug!("GET {}", url);
        self.send(self.http.get(&url), credential, self.timeouts.variables)
            .await
    }
}
