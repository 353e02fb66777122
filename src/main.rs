//! jobwatch: one run of the job-listing watcher.
//! Scrapes the configured listing pages, writes the digest of new postings,
//! and mails it when email is enabled. Always exits 0; problems go to the run log.

use jobwatch::config::AppConfig;
use jobwatch::{pipeline, run_log};

#[tokio::main]
async fn main() {
    // Load .env (email credentials, config overrides); absent file is fine.
    let _ = dotenvy::dotenv();

    let (cfg, cfg_err) = match AppConfig::load_default() {
        Ok(cfg) => (cfg, None),
        Err(e) => (AppConfig::default(), Some(e)),
    };

    run_log::init(&cfg.paths.log_file);
    if let Some(e) = cfg_err {
        tracing::warn!(error = ?e, "config not loaded, using built-in defaults");
    }

    let today = chrono::Local::now().date_naive();
    let report = pipeline::run_configured(&cfg, today).await;
    if !report.failed_sources.is_empty() {
        tracing::info!(failed = ?report.failed_sources, "some sources were skipped");
    }
}
