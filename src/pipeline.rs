// src/pipeline.rs
//! One run: fetch every source, split off what is new, persist the seen set,
//! write the digest and optionally mail it. Nothing in here fails the run.

use chrono::NaiveDate;
use metrics::{counter, gauge};
use tracing::{info, warn};

use crate::config::{AppConfig, ParserKind, SourceConfig};
use crate::digest::{dated_title, DigestWriter};
use crate::ingest::fetch::Fetcher;
use crate::ingest::providers::{AnchorLinkParser, HtmlSource, PostedLineParser};
use crate::ingest::types::{PageParser, Posting, SourceProvider};
use crate::ingest::{collect_postings, KeywordFilter};
use crate::notify::{EmailSender, Notifier};
use crate::novelty::{JsonFileStore, NoveltyTracker, SeenStore};

/// What a run did.
#[derive(Debug, Clone, Default)]
pub struct RunReport {
    pub collected: usize,
    pub new_postings: Vec<Posting>,
    pub failed_sources: Vec<String>,
    /// `None` when no notifier is configured.
    pub delivered: Option<bool>,
}

pub struct Pipeline {
    providers: Vec<Box<dyn SourceProvider>>,
    filter: KeywordFilter,
    digest: DigestWriter,
    notifier: Option<Box<dyn Notifier>>,
}

impl Pipeline {
    pub fn new(
        providers: Vec<Box<dyn SourceProvider>>,
        filter: KeywordFilter,
        digest: DigestWriter,
    ) -> Self {
        Self {
            providers,
            filter,
            digest,
            notifier: None,
        }
    }

    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    pub async fn run_once<S: SeenStore>(
        &self,
        tracker: &mut NoveltyTracker<S>,
        today: NaiveDate,
    ) -> RunReport {
        info!("=== run started ===");

        let (collected, failed_sources) = collect_postings(&self.providers, &self.filter).await;

        let (new_postings, all) = tracker.partition(collected);
        tracker.record(&all);
        if let Err(e) = tracker.persist().await {
            warn!(error = %e, "seen set not saved");
        }
        counter!("jobwatch_new_postings_total").increment(new_postings.len() as u64);

        let document = self.digest.render(&new_postings, today);
        if let Err(e) = self.digest.write(&document).await {
            warn!(error = ?e, "digest not written");
        }

        let delivered = match &self.notifier {
            Some(n) => Some(self.deliver(n.as_ref(), new_postings.len(), today).await),
            None => None,
        };

        info!(new = new_postings.len(), total = all.len(), "New items: {}", new_postings.len());
        info!("Digest: {}", self.digest.path().display());
        gauge!("jobwatch_last_run_ts").set(chrono::Utc::now().timestamp() as f64);
        info!("=== run finished ===");

        RunReport {
            collected: all.len(),
            new_postings,
            failed_sources,
            delivered,
        }
    }

    async fn deliver(&self, notifier: &dyn Notifier, new_count: usize, today: NaiveDate) -> bool {
        let subject = dated_title(self.digest.title(), today);
        let file_name = self
            .digest
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        let body = format!(
            "Daily job digest generated.\nNew matching jobs: {new_count}\n\nSee attached {file_name}."
        );

        match notifier.send(&subject, &body, self.digest.path()).await {
            Ok(()) => true,
            Err(e) => {
                warn!(channel = notifier.name(), error = %e, "Email send FAILED");
                false
            }
        }
    }
}

fn parser_for(source: &SourceConfig) -> anyhow::Result<Box<dyn PageParser>> {
    let parser: Box<dyn PageParser> = match source.parser {
        ParserKind::AnchorLinks => Box::new(AnchorLinkParser::new(&source.name, &source.url)?),
        ParserKind::PostedLines => Box::new(PostedLineParser::new(&source.name, &source.url)),
    };
    Ok(parser)
}

/// HTTP providers for every configured source. Misconfigured sources are logged and left out.
pub fn providers_from_config(cfg: &AppConfig, fetcher: &Fetcher) -> Vec<Box<dyn SourceProvider>> {
    let mut out: Vec<Box<dyn SourceProvider>> = Vec::with_capacity(cfg.sources.len());
    for s in &cfg.sources {
        match parser_for(s) {
            Ok(parser) => out.push(Box::new(HtmlSource::from_url(
                &s.name,
                &s.url,
                fetcher.clone(),
                parser,
            ))),
            Err(e) => warn!(source = %s.name, error = %e, "source skipped: bad config"),
        }
    }
    out
}

/// Mail notifier when enabled and credentials are present.
fn notifier_from_config(cfg: &AppConfig) -> Option<Box<dyn Notifier>> {
    if !cfg.email.enabled {
        return None;
    }
    match EmailSender::from_env(&cfg.email.smtp_host) {
        Ok(sender) => Some(Box::new(sender)),
        Err(e) => {
            warn!(error = %e, "Email not sent");
            None
        }
    }
}

/// HTTP client from config; falls back to the default client settings.
fn fetcher_from_config(cfg: &AppConfig) -> Fetcher {
    match Fetcher::new(&cfg.fetch.user_agent, cfg.fetch.timeout_secs) {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, "fetch settings rejected, using defaults");
            Fetcher::default()
        }
    }
}

/// Full production run: HTTP sources, JSON seen set, optional email.
pub async fn run_configured(cfg: &AppConfig, today: NaiveDate) -> RunReport {
    let fetcher = fetcher_from_config(cfg);
    let providers = providers_from_config(cfg, &fetcher);
    let digest = DigestWriter::new(&cfg.paths.digest_file, &cfg.digest.title);

    let mut pipeline = Pipeline::new(providers, KeywordFilter::new(&cfg.keywords), digest);
    if let Some(n) = notifier_from_config(cfg) {
        pipeline = pipeline.with_notifier(n);
    }

    let mut tracker = NoveltyTracker::load(JsonFileStore::new(&cfg.paths.seen_file)).await;
    pipeline.run_once(&mut tracker, today).await
}
