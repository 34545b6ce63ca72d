//! Email channel
//!
//! Delivers the HTML submission body over SMTP with every staged file
//! attached. One message is built per recipient so a bad address cannot
//! take down delivery to the rest.

use std::sync::Arc;

use async_trait::async_trait;
use carbazar_core::models::{ChannelKind, ChannelOutcome, StagedAttachment};
use carbazar_core::Config;
use lettre::message::header::ContentType;
use lettre::message::{Attachment, Body, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use tokio::fs;
use tracing::{info, warn};

use crate::channel::{Capabilities, ChannelSendError, ChannelSender};

const SUBJECT: &str = "New Car Sale Submission";
const MAX_EMAIL_RECIPIENTS: usize = 50;

/// SMTP-backed channel sender.
#[derive(Clone)]
pub struct EmailSender {
    mailer: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from: String,
}

impl EmailSender {
    /// Create the sender from config. Returns `None` when the email
    /// channel is disabled or SMTP is not configured.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.email_channel_enabled() {
            tracing::debug!("Email channel disabled (EMAIL_CHANNEL_ENABLED=false)");
            return None;
        }
        let host = config.smtp_host()?;
        let from = config.smtp_from()?.to_string();
        let port = config.smtp_port().unwrap_or(587);

        let mailer = if config.smtp_tls() {
            let b = AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(host).ok()?;
            let b = b.port(port);
            let b = if let (Some(u), Some(p)) = (config.smtp_user(), config.smtp_password()) {
                b.credentials(Credentials::new(u.to_string(), p.to_string()))
            } else {
                b
            };
            tracing::info!(
                host = %host,
                port = port,
                "Email channel initialized (SMTP with STARTTLS)"
            );
            b.build()
        } else {
            let b = AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(host).port(port);
            let b = if let (Some(u), Some(p)) = (config.smtp_user(), config.smtp_password()) {
                b.credentials(Credentials::new(u.to_string(), p.to_string()))
            } else {
                b
            };
            tracing::info!(host = %host, port = port, "Email channel initialized (SMTP)");
            b.build()
        };

        Some(Self {
            mailer: Arc::new(mailer),
            from,
        })
    }

    async fn send_one(
        &self,
        to: &str,
        body_html: &str,
        attachments: &[StagedAttachment],
    ) -> Result<(), ChannelSendError> {
        let to_addr: Mailbox = to
            .parse()
            .map_err(|_| ChannelSendError::InvalidRecipient(to.to_string()))?;
        let from_addr: Mailbox = self
            .from
            .parse()
            .map_err(|_| ChannelSendError::Message("invalid SMTP_FROM address".to_string()))?;

        let mut multipart = MultiPart::mixed().singlepart(SinglePart::html(body_html.to_string()));
        for attachment in attachments {
            let data = fs::read(&attachment.staged_path).await?;
            let content_type = match ContentType::parse(&attachment.content_type) {
                Ok(ct) => ct,
                Err(_) => ContentType::parse("application/octet-stream")
                    .map_err(|e| ChannelSendError::Message(e.to_string()))?,
            };
            multipart = multipart.singlepart(
                Attachment::new(attachment.original_filename.clone())
                    .body(Body::new(data), content_type),
            );
        }

        let message = Message::builder()
            .from(from_addr)
            .to(to_addr)
            .subject(SUBJECT)
            .multipart(multipart)
            .map_err(|e| ChannelSendError::Message(e.to_string()))?;

        self.mailer
            .send(message)
            .await
            .map_err(|e| ChannelSendError::Provider(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ChannelSender for EmailSender {
    fn kind(&self) -> ChannelKind {
        ChannelKind::Email
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            requires_durable_url: false,
            max_recipients: MAX_EMAIL_RECIPIENTS,
        }
    }

    async fn send(
        &self,
        recipients: &[String],
        body: &str,
        attachments: &[StagedAttachment],
    ) -> ChannelOutcome {
        if recipients.is_empty() {
            warn!("Email channel has no recipients configured");
            return ChannelOutcome::failed(ChannelKind::Email, "no_recipients");
        }

        let mut failures = 0usize;
        let mut last_category = "provider_error";
        for recipient in recipients {
            match self.send_one(recipient, body, attachments).await {
                Ok(()) => {
                    info!(attachments = attachments.len(), "Submission email sent");
                }
                Err(e) => {
                    warn!(error = %e, "Failed to send submission email");
                    failures += 1;
                    last_category = e.category();
                }
            }
        }

        if failures == 0 {
            ChannelOutcome::ok(ChannelKind::Email)
        } else {
            ChannelOutcome::failed(ChannelKind::Email, last_category)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // Tests in this module mutate process env; serialize them.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn base_env() {
        std::env::set_var("ENVIRONMENT", "development");
        std::env::set_var("DATABASE_URL", "postgresql://localhost/test");
    }

    fn enabled_env() {
        base_env();
        std::env::set_var("EMAIL_CHANNEL_ENABLED", "true");
        std::env::set_var("SMTP_HOST", "smtp.example.com");
        std::env::set_var("SMTP_FROM", "noreply@example.com");
    }

    #[test]
    fn from_config_returns_none_when_channel_disabled() {
        let _guard = ENV_LOCK.lock().unwrap();
        base_env();
        std::env::set_var("EMAIL_CHANNEL_ENABLED", "false");
        let config = Config::from_env().expect("test config from env");
        assert!(EmailSender::from_config(&config).is_none());
    }

    #[test]
    fn capabilities_do_not_require_published_urls() {
        let _guard = ENV_LOCK.lock().unwrap();
        enabled_env();
        let config = Config::from_env().expect("test config from env");
        let sender = EmailSender::from_config(&config).expect("sender from config");
        assert!(!sender.capabilities().requires_durable_url);
        assert_eq!(sender.kind(), ChannelKind::Email);
    }

    #[tokio::test]
    async fn empty_recipient_list_fails_without_contacting_smtp() {
        let sender = {
            let _guard = ENV_LOCK.lock().unwrap();
            enabled_env();
            let config = Config::from_env().expect("test config from env");
            EmailSender::from_config(&config).expect("sender from config")
        };

        let outcome = sender.send(&[], "<html></html>", &[]).await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("no_recipients"));
    }
}
