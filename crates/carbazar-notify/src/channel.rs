//! Channel sender abstraction
//!
//! Every outbound medium implements `ChannelSender`. Senders never return
//! a hard error from `send`: any failure is captured in the returned
//! `ChannelOutcome` so one broken provider cannot abort the other
//! channels' deliveries.

use async_trait::async_trait;
use carbazar_core::models::{ChannelKind, ChannelOutcome, StagedAttachment};
use thiserror::Error;

/// Static properties of a channel the dispatcher needs to know up front.
#[derive(Debug, Clone, Copy)]
pub struct Capabilities {
    /// Channel can only reference attachments by public URL, so they must
    /// be published before `send` is called.
    pub requires_durable_url: bool,
    /// Upper bound on recipients per dispatch; extras are dropped with a
    /// warning.
    pub max_recipients: usize,
}

/// Errors internal to a sender. These never cross the `send` boundary;
/// senders map them to a redacted outcome category first.
#[derive(Debug, Error)]
pub enum ChannelSendError {
    #[error("Provider rejected the request: {0}")]
    Provider(String),

    #[error("Invalid recipient address: {0}")]
    InvalidRecipient(String),

    #[error("Failed to build message: {0}")]
    Message(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl ChannelSendError {
    /// Stable outcome category. Raw provider text goes to the logs only.
    pub fn category(&self) -> &'static str {
        match self {
            ChannelSendError::Provider(_) => "provider_error",
            ChannelSendError::InvalidRecipient(_) => "invalid_recipient",
            ChannelSendError::Message(_) => "message_error",
            ChannelSendError::Io(_) => "io_error",
        }
    }
}

/// One outbound notification medium.
#[async_trait]
pub trait ChannelSender: Send + Sync {
    fn kind(&self) -> ChannelKind;

    fn capabilities(&self) -> Capabilities;

    /// Deliver one rendered body to the given recipients. Infallible by
    /// contract: failures are reported through the outcome.
    async fn send(
        &self,
        recipients: &[String],
        body: &str,
        attachments: &[StagedAttachment],
    ) -> ChannelOutcome;
}
