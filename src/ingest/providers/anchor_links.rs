// src/ingest/providers/anchor_links.rs
//! Anchor-based extraction: every on-site link whose text looks like a job title.

use std::collections::HashSet;

use once_cell::sync::OnceCell;
use scraper::{Html, Selector};
use url::Url;

use crate::ingest::types::{PageParser, Posting};
use crate::ingest::{normalize_text, KeywordFilter};

const MIN_TITLE_CHARS: usize = 6;
const NAV_LABELS: [&str; 5] = ["home", "jobs", "contact", "register", "login"];

pub struct AnchorLinkParser {
    source_name: String,
    /// Site root, e.g. `https://site-a.example/`. Links must start with it.
    site_root: String,
}

impl AnchorLinkParser {
    /// `site_url` is any URL on the site; only its origin is kept.
    pub fn new(source_name: impl Into<String>, site_url: &str) -> anyhow::Result<Self> {
        let site = Url::parse(site_url)?;
        if site.host_str().is_none() {
            anyhow::bail!("site url has no host: {site_url}");
        }
        Ok(Self {
            source_name: source_name.into(),
            site_root: format!("{}/", site.origin().ascii_serialization()),
        })
    }

    fn is_on_site(&self, href: &str) -> bool {
        href.starts_with(&self.site_root)
    }
}

fn anchor_selector() -> &'static Selector {
    static SEL: OnceCell<Selector> = OnceCell::new();
    SEL.get_or_init(|| Selector::parse("a[href]").expect("anchor selector"))
}

fn is_nav_label(text: &str) -> bool {
    NAV_LABELS.iter().any(|l| l.eq_ignore_ascii_case(text))
}

impl PageParser for AnchorLinkParser {
    fn parse(&self, html: &str, filter: &KeywordFilter) -> Vec<Posting> {
        let document = Html::parse_document(html);
        let mut seen_ids = HashSet::new();
        let mut out = Vec::new();

        for a in document.select(anchor_selector()) {
            let href = a.value().attr("href").unwrap_or_default().trim();
            // Multi-line anchors become one-line titles.
            let title = normalize_text(&a.text().collect::<Vec<_>>().join(" "));

            if title.chars().count() < MIN_TITLE_CHARS {
                continue;
            }
            if !self.is_on_site(href) {
                continue;
            }
            if is_nav_label(&title) || !filter.matches(&title) {
                continue;
            }

            let identifier = format!("{}::{}", self.source_name, href);
            if !seen_ids.insert(identifier.clone()) {
                continue;
            }
            out.push(Posting {
                identifier,
                title,
                link: href.to_string(),
                source_name: self.source_name.clone(),
                meta: String::new(),
            });
        }

        out
    }
}
