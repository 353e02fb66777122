// src/novelty.rs
//! Seen-set bookkeeping: which posting identifiers earlier runs already reported.
//!
//! The set only ever grows. Loading is lenient: a missing file is an empty set,
//! and a corrupt one is logged and also treated as empty, so every posting of
//! that run is reported as new once.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use crate::error::StoreError;
use crate::ingest::types::Posting;

#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Stored identifiers. A store that does not exist yet yields an empty list.
    async fn load(&self) -> Result<Vec<String>, StoreError>;
    /// Replace the stored identifiers with `ids` (already sorted).
    async fn save(&self, ids: &[String]) -> Result<(), StoreError>;
}

/// Pretty-printed JSON array of strings on disk.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait]
impl SeenStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<String>, StoreError> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(cause) => {
                return Err(StoreError::Read {
                    path: self.path.clone(),
                    cause,
                })
            }
        };
        serde_json::from_str(&raw).map_err(|cause| StoreError::Malformed {
            path: self.path.clone(),
            cause,
        })
    }

    async fn save(&self, ids: &[String]) -> Result<(), StoreError> {
        let write_err = |cause| StoreError::Write {
            path: self.path.clone(),
            cause,
        };

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await.map_err(write_err)?;
        }
        let body = serde_json::to_string_pretty(ids).map_err(StoreError::Encode)?;

        // Write next to the target, then rename over it.
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body).await.map_err(write_err)?;
        fs::rename(&tmp, &self.path).await.map_err(write_err)?;
        Ok(())
    }
}

// --- Test helper ---
#[derive(Debug, Default)]
pub struct MemoryStore {
    ids: std::sync::Mutex<Vec<String>>,
    saves: std::sync::atomic::AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ids<S: Into<String>>(ids: impl IntoIterator<Item = S>) -> Self {
        Self {
            ids: std::sync::Mutex::new(ids.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.ids.lock().unwrap().clone()
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[async_trait]
impl SeenStore for MemoryStore {
    async fn load(&self) -> Result<Vec<String>, StoreError> {
        Ok(self.snapshot())
    }

    async fn save(&self, ids: &[String]) -> Result<(), StoreError> {
        *self.ids.lock().unwrap() = ids.to_vec();
        self.saves.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        Ok(())
    }
}

/// Classifies postings as new or already seen, against a store-backed set.
pub struct NoveltyTracker<S: SeenStore> {
    store: S,
    seen: BTreeSet<String>,
}

impl<S: SeenStore> NoveltyTracker<S> {
    /// Read the seen set once. Store errors degrade to an empty set.
    pub async fn load(store: S) -> Self {
        let seen = match store.load().await {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!(error = %e, "seen set unreadable, starting empty");
                BTreeSet::new()
            }
        };
        Self { store, seen }
    }

    /// Split into (new, all). `all` is `candidates` unchanged. Does not touch the set.
    pub fn partition(&self, candidates: Vec<Posting>) -> (Vec<Posting>, Vec<Posting>) {
        let new = candidates
            .iter()
            .filter(|p| !self.seen.contains(&p.identifier))
            .cloned()
            .collect();
        (new, candidates)
    }

    pub fn record(&mut self, candidates: &[Posting]) {
        for p in candidates {
            if !self.seen.contains(&p.identifier) {
                self.seen.insert(p.identifier.clone());
            }
        }
    }

    pub async fn persist(&self) -> Result<(), StoreError> {
        let ids: Vec<String> = self.seen.iter().cloned().collect();
        self.store.save(&ids).await
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.seen.contains(identifier)
    }

    pub fn len(&self) -> usize {
        self.seen.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seen.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }
}
