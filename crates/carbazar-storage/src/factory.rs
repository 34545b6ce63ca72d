use crate::{AssetPublisher, CloudinaryPublisher, LocalPublisher, PublishError, PublishResult};
use carbazar_core::{Config, PublisherBackend};
use std::sync::Arc;

/// Create an asset publisher based on configuration
pub async fn create_publisher(config: &Config) -> PublishResult<Arc<dyn AssetPublisher>> {
    match config.publisher_backend() {
        PublisherBackend::Cloudinary => {
            let cloud_name = config
                .cloudinary_cloud_name()
                .map(String::from)
                .ok_or_else(|| {
                    PublishError::ConfigError("CLOUDINARY_CLOUD_NAME not configured".to_string())
                })?;
            let api_key = config.cloudinary_api_key().map(String::from).ok_or_else(|| {
                PublishError::ConfigError("CLOUDINARY_API_KEY not configured".to_string())
            })?;
            let api_secret = config
                .cloudinary_api_secret()
                .map(String::from)
                .ok_or_else(|| {
                    PublishError::ConfigError("CLOUDINARY_API_SECRET not configured".to_string())
                })?;

            let publisher = CloudinaryPublisher::new(cloud_name, api_key, api_secret)?;
            Ok(Arc::new(publisher))
        }

        PublisherBackend::Local => {
            let base_path = config.local_media_path().map(String::from).ok_or_else(|| {
                PublishError::ConfigError("LOCAL_MEDIA_PATH not configured".to_string())
            })?;
            let base_url = config
                .local_media_base_url()
                .map(String::from)
                .ok_or_else(|| {
                    PublishError::ConfigError("LOCAL_MEDIA_BASE_URL not configured".to_string())
                })?;

            let publisher = LocalPublisher::new(base_path, base_url).await?;
            Ok(Arc::new(publisher))
        }
    }
}
