// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::keywords::{clean_list, load_keywords_override};
use crate::digest::DEFAULT_DIGEST_TITLE;
use crate::ingest::fetch::{DEFAULT_TIMEOUT_SECS, DEFAULT_USER_AGENT};
use crate::notify::email::DEFAULT_SMTP_HOST;

pub const DEFAULT_CONFIG_PATH: &str = "config/jobwatch.toml";
pub const ENV_CONFIG_PATH: &str = "JOBWATCH_CONFIG_PATH";

/// Which extraction heuristic a source page needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserKind {
    /// On-site links whose text matches a keyword.
    AnchorLinks,
    /// Unlabeled line blocks ending in "Posted ...".
    PostedLines,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
    pub parser: ParserKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PathsConfig {
    pub seen_file: PathBuf,
    pub digest_file: PathBuf,
    pub log_file: PathBuf,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            seen_file: PathBuf::from("data/seen.json"),
            digest_file: PathBuf::from("outputs/daily_jobs.md"),
            log_file: PathBuf::from("outputs/run.log"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct DigestConfig {
    pub title: String,
}

impl Default for DigestConfig {
    fn default() -> Self {
        Self {
            title: DEFAULT_DIGEST_TITLE.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EmailConfig {
    pub enabled: bool,
    pub smtp_host: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            smtp_host: DEFAULT_SMTP_HOST.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub keywords: Vec<String>,
    pub sources: Vec<SourceConfig>,
    pub paths: PathsConfig,
    pub fetch: FetchConfig,
    pub digest: DigestConfig,
    pub email: EmailConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            keywords: ["Manager", "Officer", "Assistant", "Project"]
                .map(String::from)
                .to_vec(),
            sources: vec![
                SourceConfig {
                    name: "OnlineJobMW".to_string(),
                    url: "https://onlinejobmw.com/job-category/job_vacancies/".to_string(),
                    parser: ParserKind::PostedLines,
                },
                SourceConfig {
                    name: "Ntchito".to_string(),
                    url: "https://ntchito.com/".to_string(),
                    parser: ParserKind::AnchorLinks,
                },
            ],
            paths: PathsConfig::default(),
            fetch: FetchConfig::default(),
            digest: DigestConfig::default(),
            email: EmailConfig::default(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let data = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&data).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let mut cfg: AppConfig = toml::from_str(s)?;
        cfg.keywords = clean_list(cfg.keywords);

        if cfg.fetch.timeout_secs == 0 {
            cfg.fetch.timeout_secs = DEFAULT_TIMEOUT_SECS;
        }
        if reqwest::header::HeaderValue::from_str(&cfg.fetch.user_agent).is_err() {
            cfg.fetch.user_agent = DEFAULT_USER_AGENT.to_string();
        }
        if let Some(src) = cfg.sources.iter().find(|src| src.name.trim().is_empty()) {
            anyhow::bail!("source with url {} has an empty name", src.url);
        }
        Ok(cfg)
    }

    /// Resolve config using env var + fallbacks:
    /// 1) $JOBWATCH_CONFIG_PATH
    /// 2) config/jobwatch.toml
    /// 3) built-in defaults
    ///
    /// `$JOBWATCH_KEYWORDS_PATH` then replaces the keyword list.
    pub fn load_default() -> Result<Self> {
        let mut cfg = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::load_from_file(&pb)?
        } else if Path::new(DEFAULT_CONFIG_PATH).exists() {
            Self::load_from_file(DEFAULT_CONFIG_PATH)?
        } else {
            Self::default()
        };

        if let Some(keywords) = load_keywords_override()? {
            cfg.keywords = keywords;
        }
        Ok(cfg)
    }
}
