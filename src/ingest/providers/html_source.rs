// src/ingest/providers/html_source.rs
use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::error::FetchError;
use crate::ingest::fetch::Fetcher;
use crate::ingest::types::{PageParser, Posting, SourceProvider};
use crate::ingest::KeywordFilter;

/// A named listing page plus the parser that understands it.
pub struct HtmlSource {
    name: String,
    mode: Mode,
    parser: Box<dyn PageParser>,
}

enum Mode {
    Fixture(String),
    Http { url: String, fetcher: Fetcher },
}

impl HtmlSource {
    pub fn from_url(
        name: impl Into<String>,
        url: impl Into<String>,
        fetcher: Fetcher,
        parser: Box<dyn PageParser>,
    ) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Http {
                url: url.into(),
                fetcher,
            },
            parser,
        }
    }

    /// Serve fixed markup instead of hitting the network.
    pub fn from_fixture(
        name: impl Into<String>,
        html: &str,
        parser: Box<dyn PageParser>,
    ) -> Self {
        Self {
            name: name.into(),
            mode: Mode::Fixture(html.to_string()),
            parser,
        }
    }

    fn parse_timed(&self, html: &str, filter: &KeywordFilter) -> Vec<Posting> {
        let t0 = std::time::Instant::now();
        let out = self.parser.parse(html, filter);

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("jobwatch_parse_ms").record(ms);
        counter!("jobwatch_postings_parsed_total").increment(out.len() as u64);
        out
    }
}

#[async_trait]
impl SourceProvider for HtmlSource {
    async fn fetch_latest(&self, filter: &KeywordFilter) -> Result<Vec<Posting>, FetchError> {
        match &self.mode {
            Mode::Fixture(html) => Ok(self.parse_timed(html, filter)),
            Mode::Http { url, fetcher } => {
                let html = fetcher.fetch(&self.name, url).await?;
                Ok(self.parse_timed(&html, filter))
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}
