// src/ingest/types.rs
use crate::error::FetchError;
use crate::ingest::KeywordFilter;

/// One candidate job listing extracted from a source page.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize, PartialEq, Eq)]
pub struct Posting {
    pub identifier: String,  // dedup key, e.g. "Ntchito::https://ntchito.com/job/..."
    pub title: String,
    pub link: String,        // absolute URL
    pub source_name: String, // e.g. "Ntchito", "OnlineJobMW"
    pub meta: String,        // "company | location | posted", may be empty
}

/// Site-specific extraction of postings from raw markup.
pub trait PageParser: Send + Sync {
    fn parse(&self, html: &str, filter: &KeywordFilter) -> Vec<Posting>;
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self, filter: &KeywordFilter) -> Result<Vec<Posting>, FetchError>;
    fn name(&self) -> &str;
}
