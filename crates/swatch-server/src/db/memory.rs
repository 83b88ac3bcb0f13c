//! In-memory [`TokenStore`] for tests. Transactions work on a copy of the
//! state that replaces the shared state on commit.

use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex};
use swatch_core::NewTokenEntry;
use uuid::Uuid;

use super::models::{DesignFile, FileMetadata, TokenEntry};
use super::store::{SyncTransaction, TokenStore};

#[derive(Debug, Clone, Default)]
struct State {
    files: BTreeMap<Uuid, DesignFile>,
    tokens: Vec<TokenEntry>,
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<State>>,
    batches: Arc<Mutex<Vec<usize>>>,
    fail_on_batch: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the n-th (1-based) `insert_tokens` call of every transaction fail
    pub fn failing_on_batch(mut self, n: usize) -> Self {
        self.fail_on_batch = Some(n);
        self
    }

    pub fn files(&self) -> Vec<DesignFile> {
        self.state.lock().unwrap().files.values().cloned().collect()
    }

    pub fn tokens(&self, file_id: Uuid) -> Vec<TokenEntry> {
        let state = self.state.lock().unwrap();
        let mut tokens: Vec<TokenEntry> = state
            .tokens
            .iter()
            .filter(|t| t.file_id == file_id)
            .cloned()
            .collect();
        tokens.sort_by(|a, b| a.token_id.cmp(&b.token_id));
        tokens
    }

    pub fn token_ids(&self, file_id: Uuid) -> Vec<String> {
        self.tokens(file_id).into_iter().map(|t| t.token_id).collect()
    }

    /// Sizes of every batch handed to `insert_tokens`, committed or not
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().unwrap().clone()
    }
}

#[async_trait]
impl TokenStore for MemoryStore {
    type Tx = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, sqlx::Error> {
        let working = self.state.lock().unwrap().clone();
        Ok(MemoryTransaction {
            shared: Arc::clone(&self.state),
            batches: Arc::clone(&self.batches),
            fail_on_batch: self.fail_on_batch,
            inserts: 0,
            working,
        })
    }

    async fn file_by_id(&self, id: Uuid) -> Result<Option<DesignFile>, sqlx::Error> {
        Ok(self.state.lock().unwrap().files.get(&id).cloned())
    }
}

pub struct MemoryTransaction {
    shared: Arc<Mutex<State>>,
    batches: Arc<Mutex<Vec<usize>>>,
    fail_on_batch: Option<usize>,
    inserts: usize,
    working: State,
}

#[async_trait]
impl SyncTransaction for MemoryTransaction {
    async fn upsert_file(
        &mut self,
        file_key: &str,
        meta: &FileMetadata,
    ) -> Result<DesignFile, sqlx::Error> {
        let now = Utc::now();
        let existing = self
            .working
            .files
            .values_mut()
            .find(|f| f.file_key == file_key);

        let file = match existing {
            Some(file) => {
                file.name = meta.name.clone();
                file.thumbnail_url = meta.thumbnail_url.clone();
                file.updated_at = now;
                file.clone()
            }
            None => {
                let file = DesignFile {
                    id: Uuid::new_v4(),
                    file_key: file_key.to_string(),
                    name: meta.name.clone(),
                    thumbnail_url: meta.thumbnail_url.clone(),
                    created_at: now,
                    updated_at: now,
                };
                self.working.files.insert(file.id, file.clone());
                file
            }
        };
        Ok(file)
    }

    async fn delete_tokens(&mut self, file_id: Uuid) -> Result<u64, sqlx::Error> {
        let before = self.working.tokens.len();
        self.working.tokens.retain(|t| t.file_id != file_id);
        Ok((before - self.working.tokens.len()) as u64)
    }

    async fn insert_tokens(
        &mut self,
        file_id: Uuid,
        batch: &[NewTokenEntry],
    ) -> Result<u64, sqlx::Error> {
        self.inserts += 1;
        self.batches.lock().unwrap().push(batch.len());
        if self.fail_on_batch == Some(self.inserts) {
            return Err(sqlx::Error::Protocol("injected batch failure".into()));
        }

        let mut stored: HashSet<String> = self
            .working
            .tokens
            .iter()
            .filter(|t| t.file_id == file_id)
            .map(|t| t.token_id.clone())
            .collect();
        for entry in batch {
            if !stored.insert(entry.token_id.clone()) {
                return Err(sqlx::Error::Protocol(format!(
                    "duplicate token {} for file {}",
                    entry.token_id, file_id
                )));
            }
            self.working.tokens.push(TokenEntry {
                id: Uuid::new_v4(),
                file_id,
                token_id: entry.token_id.clone(),
                name: entry.name.clone(),
                category: entry.category.clone(),
                raw_payload: entry.raw_payload.clone(),
                created_at: Utc::now(),
            });
        }
        Ok(batch.len() as u64)
    }

    async fn commit(self) -> Result<(), sqlx::Error> {
        *self.shared.lock().unwrap() = self.working;
        Ok(())
    }
}
