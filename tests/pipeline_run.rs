// tests/pipeline_run.rs
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;
use jobwatch::digest::{DigestWriter, NO_NEW_JOBS_LINE};
use jobwatch::ingest::providers::{AnchorLinkParser, HtmlSource, PostedLineParser};
use jobwatch::config::AppConfig;
use jobwatch::notify::Notifier;
use jobwatch::pipeline::run_configured;
use jobwatch::{
    DeliveryError, FetchError, JsonFileStore, KeywordFilter, MemoryStore, NoveltyTracker,
    Pipeline, Posting, SourceProvider,
};

const SITE_A: &str = include_str!("fixtures/site_a.html");
const SITE_B: &str = include_str!("fixtures/site_b.html");

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
}

fn keywords() -> KeywordFilter {
    KeywordFilter::new(&["Manager", "Officer", "Assistant", "Project"])
}

fn site_a() -> Box<dyn SourceProvider> {
    let parser = AnchorLinkParser::new("SiteA", "https://site-a.example/").unwrap();
    Box::new(HtmlSource::from_fixture("SiteA", SITE_A, Box::new(parser)))
}

fn site_b() -> Box<dyn SourceProvider> {
    let parser = PostedLineParser::new("SiteB", "https://site-b.example/job-category/job_vacancies/");
    Box::new(HtmlSource::from_fixture("SiteB", SITE_B, Box::new(parser)))
}

struct DownProvider;

#[async_trait]
impl SourceProvider for DownProvider {
    async fn fetch_latest(&self, _filter: &KeywordFilter) -> Result<Vec<Posting>, FetchError> {
        Err(FetchError::Status {
            source_name: "SiteA".to_string(),
            status: reqwest::StatusCode::SERVICE_UNAVAILABLE,
        })
    }
    fn name(&self) -> &str {
        "SiteA"
    }
}

#[derive(Clone, Default)]
struct RecordingNotifier {
    calls: Arc<Mutex<Vec<(String, String, PathBuf)>>>,
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn send(&self, subject: &str, body: &str, attachment: &Path) -> Result<(), DeliveryError> {
        self.calls
            .lock()
            .unwrap()
            .push((subject.to_string(), body.to_string(), attachment.to_path_buf()));
        Ok(())
    }
    fn name(&self) -> &'static str {
        "recording"
    }
}

struct BrokenNotifier;

#[async_trait]
impl Notifier for BrokenNotifier {
    async fn send(&self, _: &str, _: &str, _: &Path) -> Result<(), DeliveryError> {
        Err(DeliveryError::MissingCredentials("SENDER_EMAIL".to_string()))
    }
    fn name(&self) -> &'static str {
        "broken"
    }
}

#[tokio::test]
async fn second_run_on_same_markup_reports_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let seen = dir.path().join("data/seen.json");
    let digest_path = dir.path().join("outputs/daily_jobs.md");

    let pipeline = Pipeline::new(
        vec![site_b(), site_a()],
        keywords(),
        DigestWriter::new(&digest_path, "Job Digest"),
    );

    let mut tracker = NoveltyTracker::load(JsonFileStore::new(&seen)).await;
    let first = pipeline.run_once(&mut tracker, today()).await;
    assert_eq!(first.collected, 4);
    assert_eq!(first.new_postings.len(), 4);
    assert!(first.failed_sources.is_empty());
    assert_eq!(first.delivered, None);

    let digest = std::fs::read_to_string(&digest_path).unwrap();
    assert!(digest.starts_with("# Job Digest \u{2014} 2025-03-14\n"));
    assert!(digest.contains("- **Finance Officer** (SiteB)"));
    assert!(digest.contains("  - Acme Corp | Lilongwe | Posted 2 days ago"));
    assert!(digest.contains("  - https://site-a.example/jobs/123"));

    // Fresh tracker from disk, like the next day's process.
    let mut tracker = NoveltyTracker::load(JsonFileStore::new(&seen)).await;
    let second = pipeline.run_once(&mut tracker, today()).await;
    assert_eq!(second.collected, 4);
    assert!(second.new_postings.is_empty());

    let digest = std::fs::read_to_string(&digest_path).unwrap();
    assert_eq!(
        digest,
        format!("# Job Digest \u{2014} 2025-03-14\n\n{NO_NEW_JOBS_LINE}\n")
    );

    let third = pipeline.run_once(&mut tracker, today()).await;
    assert!(third.new_postings.is_empty());
    assert_eq!(std::fs::read_to_string(&digest_path).unwrap(), digest);
}

#[tokio::test]
async fn failing_source_does_not_block_the_other() {
    let dir = tempfile::tempdir().unwrap();
    let digest_path = dir.path().join("daily_jobs.md");
    let pipeline = Pipeline::new(
        vec![Box::new(DownProvider) as Box<dyn SourceProvider>, site_b()],
        keywords(),
        DigestWriter::new(&digest_path, "Job Digest"),
    );

    let mut tracker = NoveltyTracker::load(MemoryStore::new()).await;
    let report = pipeline.run_once(&mut tracker, today()).await;

    assert_eq!(report.failed_sources, vec!["SiteA".to_string()]);
    assert_eq!(report.new_postings.len(), 2);
    assert!(report.new_postings.iter().all(|p| p.source_name == "SiteB"));

    let digest = std::fs::read_to_string(&digest_path).unwrap();
    assert!(digest.contains("Project Assistant"));
    assert_eq!(tracker.store().snapshot().len(), 2);
}

#[tokio::test]
async fn already_seen_postings_are_left_out_of_digest() {
    let dir = tempfile::tempdir().unwrap();
    let digest_path = dir.path().join("daily_jobs.md");
    let pipeline = Pipeline::new(
        vec![site_b()],
        keywords(),
        DigestWriter::new(&digest_path, "Job Digest"),
    );

    let store = MemoryStore::with_ids(["SiteB::Finance Officer::Acme Corp::Posted 2 days ago"]);
    let mut tracker = NoveltyTracker::load(store).await;
    let report = pipeline.run_once(&mut tracker, today()).await;

    assert_eq!(report.collected, 2);
    assert_eq!(report.new_postings.len(), 1);
    assert_eq!(report.new_postings[0].title, "Project Assistant");
    let digest = std::fs::read_to_string(&digest_path).unwrap();
    assert!(!digest.contains("Finance Officer"));
}

#[tokio::test]
async fn notifier_receives_digest_and_counts() {
    let dir = tempfile::tempdir().unwrap();
    let digest_path = dir.path().join("daily_jobs.md");
    let notifier = RecordingNotifier::default();
    let pipeline = Pipeline::new(
        vec![site_a()],
        keywords(),
        DigestWriter::new(&digest_path, "Job Digest"),
    )
    .with_notifier(Box::new(notifier.clone()));

    let mut tracker = NoveltyTracker::load(MemoryStore::new()).await;
    let report = pipeline.run_once(&mut tracker, today()).await;
    assert_eq!(report.delivered, Some(true));

    let calls = notifier.calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let (subject, body, attachment) = &calls[0];
    assert_eq!(subject, "Job Digest \u{2014} 2025-03-14");
    assert!(body.contains("New matching jobs: 2"));
    assert!(body.contains("See attached daily_jobs.md."));
    assert_eq!(attachment, &digest_path);
}

#[tokio::test]
async fn delivery_failure_is_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let digest_path = dir.path().join("daily_jobs.md");
    let pipeline = Pipeline::new(
        vec![site_a()],
        keywords(),
        DigestWriter::new(&digest_path, "Job Digest"),
    )
    .with_notifier(Box::new(BrokenNotifier));

    let mut tracker = NoveltyTracker::load(MemoryStore::new()).await;
    let report = pipeline.run_once(&mut tracker, today()).await;

    assert_eq!(report.delivered, Some(false));
    assert_eq!(report.new_postings.len(), 2);
    assert!(digest_path.exists());
    assert_eq!(tracker.store().save_count(), 1);
}

#[tokio::test]
async fn rejected_user_agent_still_produces_digest() {
    let dir = tempfile::tempdir().unwrap();
    let mut cfg = AppConfig::default();
    cfg.sources.clear();
    cfg.email.enabled = false;
    cfg.fetch.user_agent = "bot\nx".to_string();
    cfg.paths.digest_file = dir.path().join("outputs/daily_jobs.md");
    cfg.paths.seen_file = dir.path().join("data/seen.json");

    let report = run_configured(&cfg, today()).await;

    assert!(report.new_postings.is_empty());
    assert_eq!(report.delivered, None);
    let digest = std::fs::read_to_string(&cfg.paths.digest_file).unwrap();
    assert!(digest.contains(NO_NEW_JOBS_LINE));
    assert!(cfg.paths.seen_file.exists());
}
