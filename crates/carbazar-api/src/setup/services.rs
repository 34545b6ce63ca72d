//! Service initialization: staging, publisher, channel senders, dispatcher.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use carbazar_core::models::StagedAttachment;
use carbazar_core::Config;
use carbazar_db::CarListingRepository;
use carbazar_notify::{ChannelSender, ConfiguredChannel, EmailSender, SubmissionDispatcher, WhatsAppSender};
use carbazar_storage::{create_publisher, AssetPublisher, AttachmentStager, PublishError, PublishResult};
use sqlx::PgPool;

use crate::state::{AppState, DbState, DispatchState};

/// Stands in when no configured channel needs published URLs. The
/// dispatcher only publishes for URL-requiring channels, so this is never
/// invoked in such a setup; if it is, the config check below was wrong.
struct DisabledPublisher;

#[async_trait]
impl AssetPublisher for DisabledPublisher {
    async fn publish(&self, _attachment: &StagedAttachment) -> PublishResult<String> {
        Err(PublishError::ConfigError(
            "No asset publisher configured".to_string(),
        ))
    }
}

/// Initialize all services and build the application state.
pub async fn initialize_services(config: &Config, pool: PgPool) -> Result<Arc<AppState>> {
    let stager = AttachmentStager::new(
        config.staging_dir(),
        config.max_attachments(),
        config.max_attachment_size_bytes(),
    )
    .await
    .context("Failed to initialize attachment staging")?;

    let mut channels: Vec<ConfiguredChannel> = Vec::new();

    if let Some(email) = EmailSender::from_config(config) {
        channels.push(ConfiguredChannel {
            sender: Arc::new(email) as Arc<dyn ChannelSender>,
            recipients: config.email_recipients().to_vec(),
        });
    }

    if let Some(whatsapp) = WhatsAppSender::from_config(config) {
        channels.push(ConfiguredChannel {
            sender: Arc::new(whatsapp) as Arc<dyn ChannelSender>,
            recipients: config.whatsapp_recipients().to_vec(),
        });
    }

    if channels.is_empty() {
        tracing::warn!("No notification channels enabled; submissions will report no outcomes");
    }

    let needs_publisher = channels
        .iter()
        .any(|c| c.sender.capabilities().requires_durable_url);
    let publisher: Arc<dyn AssetPublisher> = if needs_publisher {
        create_publisher(config)
            .await
            .context("Failed to initialize asset publisher")?
    } else {
        Arc::new(DisabledPublisher)
    };

    let dispatcher = SubmissionDispatcher::new(
        stager,
        publisher,
        channels,
        Duration::from_secs(config.send_timeout_seconds()),
    );
    tracing::info!(
        channels = dispatcher.channel_count(),
        "Submission dispatcher initialized"
    );

    let state = AppState {
        db: DbState {
            pool: pool.clone(),
            listings: CarListingRepository::new(pool),
        },
        dispatch: DispatchState { dispatcher },
        config: config.clone(),
        is_production: config.is_production(),
    };

    Ok(Arc::new(state))
}
