use std::path::Path;

use lettre::message::{header::ContentType, Attachment, Mailbox, Message, MultiPart, SinglePart};
use lettre::transport::smtp::{authentication::Credentials, AsyncSmtpTransport};
use lettre::{AsyncTransport, Tokio1Executor};

use super::Notifier;
use crate::error::DeliveryError;

pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

const ENV_SENDER: &str = "SENDER_EMAIL";
const ENV_PASSWORD: &str = "SENDER_APP_PASSWORD";
const ENV_RECIPIENT: &str = "RECIPIENT_EMAIL";
const ENV_SMTP_HOST: &str = "SMTP_HOST";

/// SMTP delivery over implicit TLS (port 465), authenticated with an app password.
pub struct EmailSender {
    mailer: AsyncSmtpTransport<Tokio1Executor>,
    from: Mailbox,
    to: Mailbox,
}

fn parse_mailbox(value: &str) -> Result<Mailbox, DeliveryError> {
    value.parse().map_err(|cause| DeliveryError::InvalidAddress {
        value: value.to_string(),
        cause,
    })
}

impl EmailSender {
    pub fn new(host: &str, sender: &str, password: &str, recipient: &str) -> Result<Self, DeliveryError> {
        let creds = Credentials::new(sender.to_string(), password.to_string());
        let mailer = AsyncSmtpTransport::<Tokio1Executor>::relay(host)?
            .credentials(creds)
            .build();

        Ok(Self {
            mailer,
            from: parse_mailbox(sender)?,
            to: parse_mailbox(recipient)?,
        })
    }

    /// Credentials from the environment (`.env` is loaded by the binary).
    /// `$SMTP_HOST` wins over `default_host`.
    pub fn from_env(default_host: &str) -> Result<Self, DeliveryError> {
        let read = |key: &str| {
            std::env::var(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let sender = read(ENV_SENDER);
        let password = read(ENV_PASSWORD);
        let recipient = read(ENV_RECIPIENT);

        let (Some(sender), Some(password), Some(recipient)) = (sender, password, recipient) else {
            return Err(DeliveryError::MissingCredentials(format!(
                "{ENV_SENDER} / {ENV_PASSWORD} / {ENV_RECIPIENT}"
            )));
        };
        let host = read(ENV_SMTP_HOST).unwrap_or_else(|| default_host.to_string());

        Self::new(&host, &sender, &password, &recipient)
    }

    pub fn recipient(&self) -> &Mailbox {
        &self.to
    }

    /// Build the message; the attachment is skipped when the file does not exist.
    pub async fn build_message(
        &self,
        subject: &str,
        body: &str,
        attachment: &Path,
    ) -> Result<Message, DeliveryError> {
        let has_attachment = tokio::fs::try_exists(attachment).await.unwrap_or(false);
        let content = if has_attachment {
            let bytes = tokio::fs::read(attachment)
                .await
                .map_err(|cause| DeliveryError::Attachment {
                    path: attachment.to_path_buf(),
                    cause,
                })?;
            Some(bytes)
        } else {
            None
        };

        let builder = Message::builder()
            .from(self.from.clone())
            .to(self.to.clone())
            .subject(subject);

        let Some(content) = content else {
            return Ok(builder
                .header(ContentType::TEXT_PLAIN)
                .body(body.to_string())?);
        };
        let filename = attachment
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| "digest.md".to_string());
        let markdown = ContentType::parse("text/markdown").unwrap_or(ContentType::TEXT_PLAIN);

        let parts = MultiPart::mixed()
            .singlepart(SinglePart::plain(body.to_string()))
            .singlepart(Attachment::new(filename).body(content, markdown));

        Ok(builder.multipart(parts)?)
    }
}

#[async_trait::async_trait]
impl Notifier for EmailSender {
    async fn send(&self, subject: &str, body: &str, attachment: &Path) -> Result<(), DeliveryError> {
        let msg = self.build_message(subject, body, attachment).await?;
        self.mailer.send(msg).await?;
        tracing::info!(recipient = %self.to, "Email sent");
        Ok(())
    }

    fn name(&self) -> &'static str {
        "email"
    }
}
