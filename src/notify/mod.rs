// src/notify/mod.rs
pub mod email;

use std::path::Path;

use crate::error::DeliveryError;

/// Delivers a finished digest somewhere outside the process.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, subject: &str, body: &str, attachment: &Path)
        -> Result<(), DeliveryError>;
    fn name(&self) -> &'static str;
}

pub use email::EmailSender;
