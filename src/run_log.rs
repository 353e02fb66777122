// src/run_log.rs
//! Tracing setup: an append-only run log file plus compact stderr output.

use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::Path;
use std::sync::Mutex;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const DEFAULT_FILTER: &str = "jobwatch=info,warn";

fn open_append(path: &Path) -> io::Result<File> {
    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir)?;
    }
    OpenOptions::new().create(true).append(true).open(path)
}

/// Install the global subscriber. `RUST_LOG` overrides the default filter.
/// If the log file cannot be opened, logging continues on stderr only.
pub fn init(log_path: &Path) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let mut open_err = None;
    let file_layer = match open_append(log_path) {
        Ok(file) => Some(
            fmt::layer()
                .with_ansi(false)
                .with_target(false)
                .with_writer(Mutex::new(file)),
        ),
        Err(e) => {
            open_err = Some(e);
            None
        }
    };

    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(file_layer)
        .with(fmt::layer().compact().with_writer(io::stderr))
        .try_init();

    if let Some(e) = open_err {
        tracing::warn!(path = %log_path.display(), error = %e, "run log unavailable, stderr only");
    }
}
