//! WhatsApp channel
//!
//! Delivers the chat body through the Twilio Messages API. WhatsApp can
//! only reference attachments by public URL, so the sender consumes the
//! `published_url` set by the asset publisher: one text message per
//! recipient, then one media message per published attachment. A failed
//! media send or an unpublished attachment marks the outcome failed but
//! never stops the remaining sends.

use std::time::Duration;

use async_trait::async_trait;
use carbazar_core::models::{ChannelKind, ChannelOutcome, StagedAttachment};
use carbazar_core::Config;
use reqwest::Client;
use tracing::{info, warn};

use crate::channel::{Capabilities, ChannelSendError, ChannelSender};

const HTTP_TIMEOUT_SECS: u64 = 30;
const MAX_WHATSAPP_RECIPIENTS: usize = 10;

/// Twilio-backed WhatsApp channel sender.
#[derive(Clone)]
pub struct WhatsAppSender {
    http_client: Client,
    api_base: String,
    account_sid: String,
    auth_token: String,
    from: String,
}

impl WhatsAppSender {
    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from: impl Into<String>,
        api_base: impl Into<String>,
    ) -> Self {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(HTTP_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();

        Self {
            http_client,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: from.into(),
        }
    }

    /// Create the sender from config. Returns `None` when the WhatsApp
    /// channel is disabled or credentials are missing.
    pub fn from_config(config: &Config) -> Option<Self> {
        if !config.whatsapp_channel_enabled() {
            tracing::debug!("WhatsApp channel disabled (WHATSAPP_CHANNEL_ENABLED=false)");
            return None;
        }
        let account_sid = config.whatsapp_account_sid()?;
        let auth_token = config.whatsapp_auth_token()?;
        let from = config.whatsapp_from()?;

        tracing::info!("WhatsApp channel initialized");
        Some(Self::new(
            account_sid,
            auth_token,
            from,
            config.whatsapp_api_base(),
        ))
    }

    /// Post one message to the Twilio Messages endpoint. Exactly one of
    /// `body` and `media_url` is set per call.
    async fn post_message(
        &self,
        to: &str,
        body: Option<&str>,
        media_url: Option<&str>,
    ) -> Result<(), ChannelSendError> {
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.api_base, self.account_sid
        );

        let mut params = vec![("From", self.from.as_str()), ("To", to)];
        if let Some(body) = body {
            params.push(("Body", body));
        }
        if let Some(media_url) = media_url {
            params.push(("MediaUrl", media_url));
        }

        let response = self
            .http_client
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&params)
            .send()
            .await
            .map_err(|e| ChannelSendError::Provider(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ChannelSendError::Provider(format!(
                "status {status}: {text}"
            )));
        }

        Ok(())
    }
}

#[async_trait]
impl ChannelSender for WhatsAppSender {
    fn kind(&self) -> ChannelKind {
        ChannelKind::WhatsApp
    }

    fn capabilities(&self) -> Capabilities {
        Capabilities {
            requires_durable_url: true,
            max_recipients: MAX_WHATSAPP_RECIPIENTS,
        }
    }

    async fn send(
        &self,
        recipients: &[String],
        body: &str,
        attachments: &[StagedAttachment],
    ) -> ChannelOutcome {
        if recipients.is_empty() {
            warn!("WhatsApp channel has no recipients configured");
            return ChannelOutcome::failed(ChannelKind::WhatsApp, "no_recipients");
        }

        let mut failures = 0usize;
        let mut last_category = "provider_error";

        for recipient in recipients {
            match self.post_message(recipient, Some(body), None).await {
                Ok(()) => info!(to = %recipient, "WhatsApp text message sent"),
                Err(e) => {
                    warn!(error = %e, "Failed to send WhatsApp text message");
                    failures += 1;
                    last_category = e.category();
                }
            }

            // Media messages still go out after a failed text send.
            for attachment in attachments {
                let Some(media_url) = attachment.published_url.as_deref() else {
                    warn!(
                        filename = %attachment.original_filename,
                        "Attachment has no published URL, skipping media send"
                    );
                    failures += 1;
                    last_category = "publish_error";
                    continue;
                };
                match self.post_message(recipient, None, Some(media_url)).await {
                    Ok(()) => info!(to = %recipient, "WhatsApp media message sent"),
                    Err(e) => {
                        warn!(error = %e, "Failed to send WhatsApp media message");
                        failures += 1;
                        last_category = e.category();
                    }
                }
            }
        }

        if failures == 0 {
            ChannelOutcome::ok(ChannelKind::WhatsApp)
        } else {
            ChannelOutcome::failed(ChannelKind::WhatsApp, last_category)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn sender(api_base: &str) -> WhatsAppSender {
        WhatsAppSender::new("AC123", "token", "whatsapp:+15550001111", api_base)
    }

    fn attachment(url: Option<&str>) -> StagedAttachment {
        StagedAttachment {
            original_filename: "car.jpg".to_string(),
            staged_path: PathBuf::from("/tmp/car.jpg"),
            content_type: "image/jpeg".to_string(),
            size_bytes: 3,
            published_url: url.map(|u| u.to_string()),
        }
    }

    #[tokio::test]
    async fn text_and_media_sends_succeed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(201)
            .with_body(r#"{"sid":"SM1"}"#)
            .expect(2)
            .create_async()
            .await;

        let sender = sender(&server.url());
        let outcome = sender
            .send(
                &["whatsapp:+15550002222".to_string()],
                "body",
                &[attachment(Some("https://cdn.example.com/car.jpg"))],
            )
            .await;

        mock.assert_async().await;
        assert!(outcome.success);
    }

    #[tokio::test]
    async fn provider_rejection_is_reported_as_redacted_category() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(401)
            .with_body(r#"{"message":"Authenticate"}"#)
            .create_async()
            .await;

        let sender = sender(&server.url());
        let outcome = sender
            .send(&["whatsapp:+15550002222".to_string()], "body", &[])
            .await;

        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("provider_error"));
    }

    #[tokio::test]
    async fn unpublished_attachment_fails_media_but_text_still_sends() {
        let mut server = mockito::Server::new_async().await;
        // Only the text message reaches the provider.
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(201)
            .with_body(r#"{"sid":"SM1"}"#)
            .expect(1)
            .create_async()
            .await;

        let sender = sender(&server.url());
        let outcome = sender
            .send(
                &["whatsapp:+15550002222".to_string()],
                "body",
                &[attachment(None)],
            )
            .await;

        mock.assert_async().await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("publish_error"));
    }

    // One published and one unpublished attachment: the text message and
    // the published attachment's media send both reach the provider, and
    // the skipped one marks the outcome failed.
    #[tokio::test]
    async fn published_media_still_sends_when_another_is_unpublished() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(201)
            .with_body(r#"{"sid":"SM1"}"#)
            .expect(2)
            .create_async()
            .await;

        let sender = sender(&server.url());
        let outcome = sender
            .send(
                &["whatsapp:+15550002222".to_string()],
                "body",
                &[
                    attachment(Some("https://cdn.example.com/car.jpg")),
                    attachment(None),
                ],
            )
            .await;

        mock.assert_async().await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("publish_error"));
    }

    #[tokio::test]
    async fn empty_recipient_list_fails_without_calls() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .expect(0)
            .create_async()
            .await;

        let sender = sender(&server.url());
        let outcome = sender.send(&[], "body", &[]).await;

        mock.assert_async().await;
        assert!(!outcome.success);
        assert_eq!(outcome.error.as_deref(), Some("no_recipients"));
    }
}
