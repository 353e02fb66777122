// src/ingest/providers/posted_lines.rs
//! Text-line extraction for listing pages that render each job as an unlabeled
//! block of lines ending in a "Posted ..." marker:
//!
//! ```text
//! Finance Officer        <- title     (4 lines back)
//! Acme Corp              <- company   (3 lines back)
//! Lilongwe               <- location  (2 lines back)
//! Full Time
//! Posted 2 days ago      <- marker
//! ```
//!
//! The offsets are fixed. A block with a different shape silently yields
//! wrong or empty fields.

use std::collections::VecDeque;

use scraper::Html;

use crate::ingest::types::{PageParser, Posting};
use crate::ingest::KeywordFilter;

const MIN_TITLE_CHARS: usize = 6;
const TITLE_BACK: usize = 4;
const COMPANY_BACK: usize = 3;
const LOCATION_BACK: usize = 2;
const SKIPPED_TAGS: [&str; 4] = ["script", "style", "noscript", "template"];

/// Keeps the last `cap` lines seen by the scanner.
#[derive(Debug)]
pub struct LookbackWindow {
    lines: VecDeque<String>,
    cap: usize,
}

impl LookbackWindow {
    pub fn new(cap: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(cap),
            cap,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.lines.len() == self.cap {
            self.lines.pop_front();
        }
        self.lines.push_back(line);
    }

    /// The line `n` positions before the current one (1 = previous line).
    /// Empty when the sequence does not reach that far back.
    pub fn back(&self, n: usize) -> &str {
        if n == 0 || n > self.lines.len() {
            return "";
        }
        &self.lines[self.lines.len() - n]
    }
}

/// Flatten a page into ordered, trimmed, non-empty text lines.
pub fn text_lines(html: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut out = Vec::new();
    for node in document.root_element().descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let hidden = node
            .parent()
            .and_then(|p| p.value().as_element().map(|e| e.name()))
            .is_some_and(|name| SKIPPED_TAGS.contains(&name));
        if hidden {
            continue;
        }
        out.extend(
            text.lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(str::to_string),
        );
    }
    out
}

fn is_posted_marker(line: &str) -> bool {
    line.to_lowercase().starts_with("posted ")
}

pub struct PostedLineParser {
    source_name: String,
    listing_url: String,
}

impl PostedLineParser {
    /// `listing_url` doubles as every posting's link; the page has no per-job URL.
    pub fn new(source_name: impl Into<String>, listing_url: impl Into<String>) -> Self {
        Self {
            source_name: source_name.into(),
            listing_url: listing_url.into(),
        }
    }

    /// Scan an already-flattened line sequence.
    pub fn parse_lines<I>(&self, lines: I, filter: &KeywordFilter) -> Vec<Posting>
    where
        I: IntoIterator<Item = String>,
    {
        let mut window = LookbackWindow::new(TITLE_BACK);
        let mut out = Vec::new();

        for line in lines {
            if is_posted_marker(&line) {
                if let Some(p) = self.posting_at(&window, &line, filter) {
                    out.push(p);
                }
            }
            window.push(line);
        }

        out
    }

    fn posting_at(
        &self,
        window: &LookbackWindow,
        posted: &str,
        filter: &KeywordFilter,
    ) -> Option<Posting> {
        let title = window.back(TITLE_BACK);
        let company = window.back(COMPANY_BACK);
        let location = window.back(LOCATION_BACK);

        if title.chars().count() < MIN_TITLE_CHARS || !filter.matches(title) {
            tracing::debug!(source = %self.source_name, %posted, %title, "posted marker skipped");
            return None;
        }

        let meta = [company, location, posted]
            .into_iter()
            .filter(|p| !p.is_empty())
            .collect::<Vec<_>>()
            .join(" | ");

        Some(Posting {
            identifier: format!("{}::{}::{}::{}", self.source_name, title, company, posted),
            title: title.to_string(),
            link: self.listing_url.clone(),
            source_name: self.source_name.clone(),
            meta,
        })
    }
}

impl PageParser for PostedLineParser {
    fn parse(&self, html: &str, filter: &KeywordFilter) -> Vec<Posting> {
        self.parse_lines(text_lines(html), filter)
    }
}
