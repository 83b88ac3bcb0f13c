//! Scripted design API for tests.

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use swatch_core::LocalVariablesResponse;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use crate::source::{FileResponse, NodesResponse, SourceApi, SourceError};

pub fn not_found() -> SourceError {
    SourceError::Status {
        status: 404,
        message: "Not found".to_string(),
    }
}

pub fn forbidden() -> SourceError {
    SourceError::Status {
        status: 403,
        message: "Invalid scope(s): file_variables:read".to_string(),
    }
}

pub struct FakeSource {
    file: Mutex<Result<FileResponse, SourceError>>,
    nodes: Mutex<Result<NodesResponse, SourceError>>,
    variables: Mutex<Result<LocalVariablesResponse, SourceError>>,
    node_requests: Mutex<Vec<Vec<String>>>,
    variable_calls: AtomicUsize,
    credentials: Mutex<Vec<String>>,
}

impl FakeSource {
    /// A source serving `file` (JSON of the file endpoint), with no nodes and
    /// a variables endpoint answering 404
    pub fn with_file(file: Value) -> Self {
        let source = Self {
            file: Mutex::new(Err(not_found())),
            nodes: Mutex::new(Ok(NodesResponse::default())),
            variables: Mutex::new(Err(not_found())),
            node_requests: Mutex::new(Vec::new()),
            variable_calls: AtomicUsize::new(0),
            credentials: Mutex::new(Vec::new()),
        };
        source.set_file(file);
        source
    }

    pub fn set_file(&self, file: Value) {
        let file = serde_json::from_value(file).expect("test file JSON is a valid file response");
        *self.file.lock().unwrap() = Ok(file);
    }

    pub fn fail_file(&self, error: SourceError) {
        *self.file.lock().unwrap() = Err(error);
    }

    pub fn set_nodes(&self, nodes: Value) {
        let nodes = serde_json::from_value(nodes).expect("test nodes JSON is valid");
        *self.nodes.lock().unwrap() = Ok(nodes);
    }

    pub fn fail_nodes(&self, error: SourceError) {
        *self.nodes.lock().unwrap() = Err(error);
    }

    pub fn set_variables(&self, variables: Value) {
        let variables = serde_json::from_value(variables).expect("test variables JSON is valid");
        *self.variables.lock().unwrap() = Ok(variables);
    }

    pub fn fail_variables(&self, error: SourceError) {
        *self.variables.lock().unwrap() = Err(error);
    }

    pub fn node_requests(&self) -> Vec<Vec<String>> {
        self.node_requests.lock().unwrap().clone()
    }

    pub fn variable_calls(&self) -> usize {
        self.variable_calls.load(Ordering::SeqCst)
    }

    /// Credentials seen across all calls, in order
    pub fn credentials(&self) -> Vec<String> {
        self.credentials.lock().unwrap().clone()
    }

    fn saw(&self, credential: &str) {
        self.credentials.lock().unwrap().push(credential.to_string());
    }
}

#[async_trait]
impl SourceApi for FakeSource {
    async fn get_file(
        &self,
        _file_key: &str,
        credential: &str,
    ) -> Result<FileResponse, SourceError> {
        self.saw(credential);
        self.file.lock().unwrap().clone()
    }

    async fn get_nodes(
        &self,
        _file_key: &str,
        node_ids: &[String],
        credential: &str,
    ) -> Result<NodesResponse, SourceError> {
        self.saw(credential);
        self.node_requests.lock().unwrap().push(node_ids.to_vec());
        self.nodes.lock().unwrap().clone()
    }

    async fn get_local_variables(
        &self,
        _file_key: &str,
        credential: &str,
    ) -> Result<LocalVariablesResponse, SourceError> {
        self.saw(credential);
        self.variable_calls.fetch_add(1, Ordering::SeqCst);
        self.variables.lock().unwrap().clone()
    }
}

/// A canned HTTP reply
#[derive(Debug, Clone)]
pub struct Reply {
    status: u16,
    body: String,
    delay: Duration,
}

impl Reply {
    pub fn json(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            delay: Duration::ZERO,
        }
    }

    /// Wait before sending anything back
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

/// Local HTTP server answering by request path (query string ignored).
/// Unknown paths get a 404 in the design API's error shape.
pub struct ScriptedServer {
    pub base_url: String,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedServer {
    pub async fn start(routes: Vec<(&str, Reply)>) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());
        let routes: Arc<HashMap<String, Reply>> = Arc::new(
            routes
                .into_iter()
                .map(|(path, reply)| (path.to_string(), reply))
                .collect(),
        );
        let requests = Arc::new(Mutex::new(Vec::new()));

        let seen = requests.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                tokio::spawn(respond(socket, routes.clone(), seen.clone()));
            }
        });

        Self { base_url, requests }
    }

    /// Raw request heads received so far, header names lowercased
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

async fn respond(
    mut socket: TcpStream,
    routes: Arc<HashMap<String, Reply>>,
    seen: Arc<Mutex<Vec<String>>>,
) {
    let mut head = Vec::new();
    let mut chunk = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        match socket.read(&mut chunk).await {
            Ok(0) | Err(_) => return,
            Ok(n) => head.extend_from_slice(&chunk[..n]),
        }
    }
    let head = String::from_utf8_lossy(&head).into_owned();
    let target = head.split_whitespace().nth(1).unwrap_or("/");
    let path = target.split('?').next().unwrap_or("/");
    seen.lock().unwrap().push(head.to_lowercase());

    let reply = routes
        .get(path)
        .cloned()
        .unwrap_or_else(|| Reply::json(404, r#"{"status":404,"err":"Not found"}"#));
    tokio::time::sleep(reply.delay).await;

    let response = format!(
        "HTTP/1.1 {} Scripted\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
        reply.status,
        reply.body.len(),
        reply.body
    );
    let _ = socket.write_all(response.as_bytes()).await;
    let _ = socket.shutdown().await;
}

/// A document node nesting `depth` levels of single-child nodes above `leaf`
/// (a JSON node object), so `leaf` sits at depth `depth`
pub fn nested_document(depth: usize, leaf: &str) -> String {
    let mut document = String::new();
    for level in 0..depth {
        document.push_str(&format!(r#"{{"id":"n{}","children":["#, level));
    }
    document.push_str(leaf);
    for _ in 0..depth {
        document.push_str("]}");
    }
    document
}
