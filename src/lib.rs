// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod digest;
pub mod error;
pub mod ingest;
pub mod notify;
pub mod novelty;
pub mod pipeline;
pub mod run_log;

// ---- Re-exports for stable public API ----
pub use crate::error::{DeliveryError, FetchError, StoreError};
pub use crate::ingest::types::{PageParser, Posting, SourceProvider};
pub use crate::ingest::{matches, KeywordFilter};
pub use crate::novelty::{JsonFileStore, MemoryStore, NoveltyTracker, SeenStore};
pub use crate::pipeline::{Pipeline, RunReport};
