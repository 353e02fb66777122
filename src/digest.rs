// src/digest.rs
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use tokio::fs;

use crate::ingest::types::Posting;

pub const DEFAULT_DIGEST_TITLE: &str = "Malawi Job Digest";
pub const NO_NEW_JOBS_LINE: &str = "No new matching jobs today.";

/// Title and ISO date joined by U+2014. Used for the heading and the mail subject.
pub fn dated_title(title: &str, date: NaiveDate) -> String {
    format!("{title} \u{2014} {}", date.format("%Y-%m-%d"))
}

/// Render the Markdown digest for one run.
pub fn render(new_postings: &[Posting], date: NaiveDate, title: &str) -> String {
    let mut lines = vec![format!("# {}", dated_title(title, date)), String::new()];

    if new_postings.is_empty() {
        lines.push(NO_NEW_JOBS_LINE.to_string());
    }
    for p in new_postings {
        lines.push(format!("- **{}** ({})", p.title, p.source_name));
        if !p.meta.is_empty() {
            lines.push(format!("  - {}", p.meta));
        }
        lines.push(format!("  - {}", p.link));
    }

    let mut doc = lines.join("\n");
    doc.push('\n');
    doc
}

/// Writes the digest to a fixed path, replacing whatever was there.
#[derive(Debug, Clone)]
pub struct DigestWriter {
    path: PathBuf,
    title: String,
}

impl DigestWriter {
    pub fn new(path: impl Into<PathBuf>, title: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: title.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn render(&self, new_postings: &[Posting], date: NaiveDate) -> String {
        render(new_postings, date, &self.title)
    }

    pub async fn write(&self, document: &str) -> Result<()> {
        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)
                .await
                .with_context(|| format!("creating {}", dir.display()))?;
        }
        fs::write(&self.path, document)
            .await
            .with_context(|| format!("writing digest to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn empty_digest_says_so() {
        let doc = render(&[], date(), "Jobs");
        assert_eq!(doc, "# Jobs \u{2014} 2025-03-14\n\nNo new matching jobs today.\n");
    }

    #[test]
    fn meta_line_only_when_present() {
        let postings = vec![
            Posting {
                identifier: "a".into(),
                title: "Finance Officer".into(),
                link: "https://b.example/list/".into(),
                source_name: "SiteB".into(),
                meta: "Acme Corp | Lilongwe | Posted 2 days ago".into(),
            },
            Posting {
                identifier: "b".into(),
                title: "Project Manager".into(),
                link: "https://a.example/jobs/1".into(),
                source_name: "SiteA".into(),
                meta: String::new(),
            },
        ];
        let doc = render(&postings, date(), "Jobs");
        let expected = "# Jobs \u{2014} 2025-03-14\n\n\
                        - **Finance Officer** (SiteB)\n  \
                        - Acme Corp | Lilongwe | Posted 2 days ago\n  \
                        - https://b.example/list/\n\
                        - **Project Manager** (SiteA)\n  \
                        - https://a.example/jobs/1\n";
        assert_eq!(doc, expected);
        assert!(!doc.contains(NO_NEW_JOBS_LINE));
    }

    #[tokio::test]
    async fn write_overwrites_previous_digest() {
        let dir = tempfile::tempdir().unwrap();
        let writer = DigestWriter::new(dir.path().join("out/daily.md"), "Jobs");
        writer.write("first run with a long body\n").await.unwrap();
        writer.write("second\n").await.unwrap();
        let got = std::fs::read_to_string(writer.path()).unwrap();
        assert_eq!(got, "second\n");
    }
}
