// src/error.rs
//! Error kinds for the run. None of them aborts a run: callers log and move on.

use std::path::PathBuf;
use thiserror::Error;

/// One source could not be fetched. The source is skipped for this run.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{source_name}: request failed: {cause}")]
    Request {
        source_name: String,
        #[source]
        cause: reqwest::Error,
    },
    #[error("{source_name}: HTTP {status}")]
    Status {
        source_name: String,
        status: reqwest::StatusCode,
    },
}

impl FetchError {
    pub fn source_name(&self) -> &str {
        match self {
            Self::Request { source_name, .. } | Self::Status { source_name, .. } => source_name,
        }
    }
}

/// Seen-set storage failures. Read-side kinds degrade to an empty set.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("reading seen set from {}: {cause}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    #[error("malformed seen set in {}: {cause}", .path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        cause: serde_json::Error,
    },
    #[error("encoding seen set: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("writing seen set to {}: {cause}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
}

/// Digest delivery failed. Logged; the run still counts as a success.
#[derive(Debug, Error)]
pub enum DeliveryError {
    #[error("missing email settings: {0}")]
    MissingCredentials(String),
    #[error("invalid address {value:?}: {cause}")]
    InvalidAddress {
        value: String,
        #[source]
        cause: lettre::address::AddressError,
    },
    #[error("reading attachment {}: {cause}", .path.display())]
    Attachment {
        path: PathBuf,
        #[source]
        cause: std::io::Error,
    },
    #[error("building message: {0}")]
    Build(#[from] lettre::error::Error),
    #[error("smtp: {0}")]
    Transport(#[from] lettre::transport::smtp::Error),
}
