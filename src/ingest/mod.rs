// src/ingest/mod.rs
pub mod fetch;
pub mod providers;
pub mod types;

use crate::ingest::types::{Posting, SourceProvider};
use metrics::{counter, describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;

/// One-time metrics registration (so series show up once a recorder is installed).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(
            "jobwatch_postings_parsed_total",
            "Postings extracted from source pages (after keyword filtering)."
        );
        describe_counter!(
            "jobwatch_source_errors_total",
            "Source fetch failures."
        );
        describe_counter!(
            "jobwatch_new_postings_total",
            "Postings not present in the seen set."
        );
        describe_histogram!("jobwatch_parse_ms", "Page parse time in milliseconds.");
        describe_gauge!(
            "jobwatch_last_run_ts",
            "Unix ts when the pipeline last ran."
        );
    });
}

/// Case-insensitive substring match: true if any keyword occurs in `text`.
pub fn matches<S: AsRef<str>>(text: &str, keywords: &[S]) -> bool {
    let t = text.to_lowercase();
    keywords
        .iter()
        .any(|k| t.contains(&k.as_ref().to_lowercase()))
}

/// Interest keywords, lower-cased once up front.
#[derive(Debug, Clone, Default)]
pub struct KeywordFilter {
    lowered: Vec<String>,
}

impl KeywordFilter {
    pub fn new<S: AsRef<str>>(keywords: &[S]) -> Self {
        Self {
            lowered: keywords
                .iter()
                .map(|k| k.as_ref().trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
        }
    }

    pub fn matches(&self, text: &str) -> bool {
        let t = text.to_lowercase();
        self.lowered.iter().any(|k| t.contains(k.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.lowered.is_empty()
    }
}

/// Collapse internal whitespace runs to a single space and trim.
pub fn normalize_text(s: &str) -> String {
    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").expect("whitespace regex"));
    re_ws.replace_all(s, " ").trim().to_string()
}

/// Fetch every provider in order. A failing provider is logged and skipped.
/// Returns (postings, names of failed sources).
pub async fn collect_postings(
    providers: &[Box<dyn SourceProvider>],
    filter: &KeywordFilter,
) -> (Vec<Posting>, Vec<String>) {
    ensure_metrics_described();

    let mut collected = Vec::new();
    let mut failed = Vec::new();
    for p in providers {
        match p.fetch_latest(filter).await {
            Ok(mut v) => {
                tracing::info!(source = p.name(), postings = v.len(), "source parsed");
                collected.append(&mut v);
            }
            Err(e) => {
                tracing::warn!(source = p.name(), error = %e, "ERROR fetching source");
                counter!("jobwatch_source_errors_total").increment(1);
                failed.push(p.name().to_string());
            }
        }
    }

    (collected, failed)
}
