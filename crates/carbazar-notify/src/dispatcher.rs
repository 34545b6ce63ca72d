//! Submission dispatch orchestration
//!
//! One dispatch moves through a fixed pipeline: stage attachments, render
//! a body per channel, publish attachments when any channel needs public
//! URLs, fan out to all channel senders concurrently, aggregate outcomes,
//! then clean up the staged files. Staging failures reject the whole
//! submission before any external call; everything after staging is
//! best-effort per channel.

use std::sync::Arc;
use std::time::Duration;

use carbazar_core::models::{ChannelOutcome, DispatchReport, SubmissionForm};
use carbazar_storage::stager::{AttachmentStager, RawPart, StageError};
use carbazar_storage::traits::AssetPublisher;
use futures::future::join_all;
use tracing::{error, info, warn};

use crate::channel::ChannelSender;
use crate::render;

/// One enabled channel plus the recipients it delivers to.
#[derive(Clone)]
pub struct ConfiguredChannel {
    pub sender: Arc<dyn ChannelSender>,
    pub recipients: Vec<String>,
}

/// Fans one submission out to every configured channel.
#[derive(Clone)]
pub struct SubmissionDispatcher {
    stager: AttachmentStager,
    publisher: Arc<dyn AssetPublisher>,
    channels: Vec<ConfiguredChannel>,
    send_timeout: Duration,
}

impl SubmissionDispatcher {
    pub fn new(
        stager: AttachmentStager,
        publisher: Arc<dyn AssetPublisher>,
        channels: Vec<ConfiguredChannel>,
        send_timeout: Duration,
    ) -> Self {
        Self {
            stager,
            publisher,
            channels,
            send_timeout,
        }
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    /// Dispatch one submission.
    ///
    /// Returns `Err` only for staging failures, which happen before any
    /// external call. After staging, every channel gets exactly one
    /// outcome in the report, in configuration order, and the staged
    /// files are cleaned up regardless of channel results.
    #[tracing::instrument(skip_all, fields(attachments = parts.len(), channels = self.channels.len()))]
    pub async fn dispatch(
        &self,
        form: SubmissionForm,
        parts: Vec<RawPart>,
    ) -> Result<DispatchReport, StageError> {
        let batch = self.stager.stage(parts).await?;

        let bodies: Vec<String> = self
            .channels
            .iter()
            .map(|c| render::render(&form, c.sender.kind()))
            .collect();

        let mut attachments = batch.attachments.clone();
        let needs_urls = self
            .channels
            .iter()
            .any(|c| c.sender.capabilities().requires_durable_url);
        if needs_urls && !attachments.is_empty() {
            let results = join_all(attachments.iter().map(|a| self.publisher.publish(a))).await;
            for (attachment, result) in attachments.iter_mut().zip(results) {
                match result {
                    Ok(url) => attachment.published_url = Some(url),
                    Err(e) => {
                        // Left unpublished; URL-requiring channels report
                        // the miss in their own outcome.
                        warn!(
                            error = %e,
                            filename = %attachment.original_filename,
                            "Failed to publish attachment"
                        );
                    }
                }
            }
        }

        let mut handles = Vec::with_capacity(self.channels.len());
        for (channel, body) in self.channels.iter().zip(bodies) {
            let sender = Arc::clone(&channel.sender);
            let kind = sender.kind();
            let max = sender.capabilities().max_recipients;
            if channel.recipients.len() > max {
                warn!(
                    channel = %kind,
                    configured = channel.recipients.len(),
                    max,
                    "Recipient list exceeds channel limit, extra recipients dropped"
                );
            }
            let recipients: Vec<String> = channel.recipients.iter().take(max).cloned().collect();
            let attachments = attachments.clone();
            let timeout = self.send_timeout;

            // Spawned so a panicking sender surfaces as a JoinError
            // instead of tearing down the whole dispatch.
            let handle = tokio::spawn(async move {
                match tokio::time::timeout(timeout, sender.send(&recipients, &body, &attachments))
                    .await
                {
                    Ok(outcome) => outcome,
                    Err(_) => {
                        warn!(channel = %kind, "Channel send timed out");
                        ChannelOutcome::failed(kind, "timeout")
                    }
                }
            });
            handles.push((kind, handle));
        }

        let mut outcomes = Vec::with_capacity(handles.len());
        for (kind, handle) in handles {
            match handle.await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    error!(channel = %kind, error = %e, "Channel send task failed");
                    outcomes.push(ChannelOutcome::failed(kind, "internal_error"));
                }
            }
        }

        let report = DispatchReport::from_outcomes(outcomes);
        info!(status = ?report.status, "Submission dispatched");

        batch.cleanup().await;

        Ok(report)
    }
}
