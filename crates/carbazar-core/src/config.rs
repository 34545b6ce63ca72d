//! Configuration module
//!
//! This module provides the environment-driven configuration for the API and
//! services: server, database, staging limits, and the external provider
//! credentials for each notification channel. Recipient addresses and phone
//! numbers are configuration data, never literals in handler code.

use std::env;

// Common constants
const MAX_CONNECTIONS: u32 = 20;
const CONNECTION_TIMEOUT_SECS: u64 = 30;
const DB_IDLE_TIMEOUT_SECS: u64 = 600;
const DB_MAX_LIFETIME_SECS: u64 = 1800;
const MAX_ATTACHMENTS: usize = 10;
const MAX_ATTACHMENT_SIZE_MB: usize = 10;
const SEND_TIMEOUT_SECS: u64 = 30;

/// Remote asset publisher backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherBackend {
    /// Files are copied into a locally served media directory.
    Local,
    /// Files are uploaded to Cloudinary and served from its CDN.
    Cloudinary,
}

/// Application configuration.
#[derive(Clone, Debug)]
pub struct Config {
    server_port: u16,
    cors_origins: Vec<String>,
    environment: String,
    database_url: String,
    db_max_connections: u32,
    db_timeout_seconds: u64,
    db_idle_timeout_seconds: u64,
    db_max_lifetime_seconds: u64,
    // Attachment staging
    staging_dir: String,
    max_attachments: usize,
    max_attachment_size_bytes: usize,
    // Email channel
    email_channel_enabled: bool,
    smtp_host: Option<String>,
    smtp_port: Option<u16>,
    smtp_user: Option<String>,
    smtp_password: Option<String>,
    smtp_from: Option<String>,
    smtp_tls: bool,
    email_recipients: Vec<String>,
    // WhatsApp channel
    whatsapp_channel_enabled: bool,
    whatsapp_account_sid: Option<String>,
    whatsapp_auth_token: Option<String>,
    whatsapp_from: Option<String>,
    whatsapp_recipients: Vec<String>,
    whatsapp_api_base: String,
    // Remote asset publisher
    publisher_backend: PublisherBackend,
    cloudinary_cloud_name: Option<String>,
    cloudinary_api_key: Option<String>,
    cloudinary_api_secret: Option<String>,
    local_media_path: Option<String>,
    local_media_base_url: Option<String>,
    // Dispatch behavior
    send_timeout_seconds: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        dotenvy::dotenv().ok();

        let environment = env::var("ENVIRONMENT")
            .or_else(|_| env::var("APP_ENV"))
            .unwrap_or_else(|_| "development".to_string());

        let cors_origins_str = env::var("CORS_ORIGINS").unwrap_or_else(|_| "*".to_string());
        let is_production =
            environment.to_lowercase() == "production" || environment.to_lowercase() == "prod";
        if is_production && cors_origins_str.trim() == "*" {
            return Err(anyhow::anyhow!(
                "CORS_ORIGINS cannot be '*' in production. Please specify explicit origins."
            ));
        }

        let cors_origins: Vec<String> = cors_origins_str
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let max_attachment_size_mb = env::var("MAX_ATTACHMENT_SIZE_MB")
            .unwrap_or_else(|_| MAX_ATTACHMENT_SIZE_MB.to_string())
            .parse::<usize>()
            .unwrap_or(MAX_ATTACHMENT_SIZE_MB);

        let publisher_backend = match env::var("MEDIA_PUBLISHER")
            .unwrap_or_else(|_| "local".to_string())
            .to_lowercase()
            .as_str()
        {
            "cloudinary" => PublisherBackend::Cloudinary,
            _ => PublisherBackend::Local,
        };

        let config = Config {
            server_port: env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number"))?,
            cors_origins,
            environment,
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| MAX_CONNECTIONS.to_string())
                .parse()
                .unwrap_or(MAX_CONNECTIONS),
            db_timeout_seconds: env::var("DB_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| CONNECTION_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(CONNECTION_TIMEOUT_SECS),
            db_idle_timeout_seconds: env::var("DB_IDLE_TIMEOUT_SECONDS")
                .unwrap_or_else(|_| DB_IDLE_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(DB_IDLE_TIMEOUT_SECS),
            db_max_lifetime_seconds: env::var("DB_MAX_LIFETIME_SECONDS")
                .unwrap_or_else(|_| DB_MAX_LIFETIME_SECS.to_string())
                .parse()
                .unwrap_or(DB_MAX_LIFETIME_SECS),
            staging_dir: env::var("STAGING_DIR").unwrap_or_else(|_| "uploads".to_string()),
            max_attachments: env::var("MAX_ATTACHMENTS")
                .unwrap_or_else(|_| MAX_ATTACHMENTS.to_string())
                .parse()
                .unwrap_or(MAX_ATTACHMENTS),
            max_attachment_size_bytes: max_attachment_size_mb * 1024 * 1024,
            email_channel_enabled: env::var("EMAIL_CHANNEL_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            smtp_host: env::var("SMTP_HOST").ok(),
            smtp_port: env::var("SMTP_PORT").ok().and_then(|s| s.parse().ok()),
            smtp_user: env::var("SMTP_USER").ok(),
            smtp_password: env::var("SMTP_PASSWORD").ok(),
            smtp_from: env::var("SMTP_FROM").ok(),
            smtp_tls: env::var("SMTP_TLS")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            email_recipients: parse_csv(env::var("EMAIL_RECIPIENTS").ok()),
            whatsapp_channel_enabled: env::var("WHATSAPP_CHANNEL_ENABLED")
                .unwrap_or_else(|_| "true".to_string())
                .to_lowercase()
                .parse()
                .unwrap_or(true),
            whatsapp_account_sid: env::var("WHATSAPP_ACCOUNT_SID").ok(),
            whatsapp_auth_token: env::var("WHATSAPP_AUTH_TOKEN").ok(),
            whatsapp_from: env::var("WHATSAPP_FROM").ok(),
            whatsapp_recipients: parse_csv(env::var("WHATSAPP_RECIPIENTS").ok()),
            whatsapp_api_base: env::var("WHATSAPP_API_BASE")
                .unwrap_or_else(|_| "https://api.twilio.com".to_string()),
            publisher_backend,
            cloudinary_cloud_name: env::var("CLOUDINARY_CLOUD_NAME").ok(),
            cloudinary_api_key: env::var("CLOUDINARY_API_KEY").ok(),
            cloudinary_api_secret: env::var("CLOUDINARY_API_SECRET").ok(),
            local_media_path: env::var("LOCAL_MEDIA_PATH").ok(),
            local_media_base_url: env::var("LOCAL_MEDIA_BASE_URL").ok(),
            send_timeout_seconds: env::var("SEND_TIMEOUT_SECS")
                .unwrap_or_else(|_| SEND_TIMEOUT_SECS.to_string())
                .parse()
                .unwrap_or(SEND_TIMEOUT_SECS),
        };

        Ok(config)
    }

    /// Fail fast on misconfiguration: every enabled channel must carry the
    /// credentials and recipients it needs before the server starts.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if self.email_channel_enabled {
            if self.smtp_host.is_none() || self.smtp_from.is_none() {
                return Err(anyhow::anyhow!(
                    "SMTP_HOST and SMTP_FROM must be set when EMAIL_CHANNEL_ENABLED=true"
                ));
            }
            if self.email_recipients.is_empty() {
                return Err(anyhow::anyhow!(
                    "EMAIL_RECIPIENTS must list at least one address when EMAIL_CHANNEL_ENABLED=true"
                ));
            }
        }

        if self.whatsapp_channel_enabled {
            if self.whatsapp_account_sid.is_none()
                || self.whatsapp_auth_token.is_none()
                || self.whatsapp_from.is_none()
            {
                return Err(anyhow::anyhow!(
                    "WHATSAPP_ACCOUNT_SID, WHATSAPP_AUTH_TOKEN and WHATSAPP_FROM must be set when WHATSAPP_CHANNEL_ENABLED=true"
                ));
            }
            if self.whatsapp_recipients.is_empty() {
                return Err(anyhow::anyhow!(
                    "WHATSAPP_RECIPIENTS must list at least one number when WHATSAPP_CHANNEL_ENABLED=true"
                ));
            }
        }

        if self.publisher_backend == PublisherBackend::Cloudinary
            && (self.cloudinary_cloud_name.is_none()
                || self.cloudinary_api_key.is_none()
                || self.cloudinary_api_secret.is_none())
        {
            return Err(anyhow::anyhow!(
                "CLOUDINARY_CLOUD_NAME, CLOUDINARY_API_KEY and CLOUDINARY_API_SECRET must be set when MEDIA_PUBLISHER=cloudinary"
            ));
        }

        if self.publisher_backend == PublisherBackend::Local
            && self.whatsapp_channel_enabled
            && (self.local_media_path.is_none() || self.local_media_base_url.is_none())
        {
            return Err(anyhow::anyhow!(
                "LOCAL_MEDIA_PATH and LOCAL_MEDIA_BASE_URL must be set when MEDIA_PUBLISHER=local and the WhatsApp channel is enabled"
            ));
        }

        if self.max_attachments == 0 {
            return Err(anyhow::anyhow!("MAX_ATTACHMENTS must be at least 1"));
        }

        Ok(())
    }

    /// Check if the application is running in production mode
    pub fn is_production(&self) -> bool {
        let env = self.environment.to_lowercase();
        env == "production" || env == "prod"
    }

    // Convenience getters for common fields

    pub fn server_port(&self) -> u16 {
        self.server_port
    }

    pub fn cors_origins(&self) -> &[String] {
        &self.cors_origins
    }

    pub fn environment(&self) -> &str {
        &self.environment
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
    }

    pub fn db_timeout_seconds(&self) -> u64 {
        self.db_timeout_seconds
    }

    pub fn db_idle_timeout_seconds(&self) -> u64 {
        self.db_idle_timeout_seconds
    }

    pub fn db_max_lifetime_seconds(&self) -> u64 {
        self.db_max_lifetime_seconds
    }

    pub fn staging_dir(&self) -> &str {
        &self.staging_dir
    }

    pub fn max_attachments(&self) -> usize {
        self.max_attachments
    }

    pub fn max_attachment_size_bytes(&self) -> usize {
        self.max_attachment_size_bytes
    }

    pub fn email_channel_enabled(&self) -> bool {
        self.email_channel_enabled
    }

    pub fn smtp_host(&self) -> Option<&str> {
        self.smtp_host.as_deref()
    }

    pub fn smtp_port(&self) -> Option<u16> {
        self.smtp_port
    }

    pub fn smtp_user(&self) -> Option<&str> {
        self.smtp_user.as_deref()
    }

    pub fn smtp_password(&self) -> Option<&str> {
        self.smtp_password.as_deref()
    }

    pub fn smtp_from(&self) -> Option<&str> {
        self.smtp_from.as_deref()
    }

    pub fn smtp_tls(&self) -> bool {
        self.smtp_tls
    }

    pub fn email_recipients(&self) -> &[String] {
        &self.email_recipients
    }

    pub fn whatsapp_channel_enabled(&self) -> bool {
        self.whatsapp_channel_enabled
    }

    pub fn whatsapp_account_sid(&self) -> Option<&str> {
        self.whatsapp_account_sid.as_deref()
    }

    pub fn whatsapp_auth_token(&self) -> Option<&str> {
        self.whatsapp_auth_token.as_deref()
    }

    pub fn whatsapp_from(&self) -> Option<&str> {
        self.whatsapp_from.as_deref()
    }

    pub fn whatsapp_recipients(&self) -> &[String] {
        &self.whatsapp_recipients
    }

    pub fn whatsapp_api_base(&self) -> &str {
        &self.whatsapp_api_base
    }

    pub fn publisher_backend(&self) -> PublisherBackend {
        self.publisher_backend
    }

    pub fn cloudinary_cloud_name(&self) -> Option<&str> {
        self.cloudinary_cloud_name.as_deref()
    }

    pub fn cloudinary_api_key(&self) -> Option<&str> {
        self.cloudinary_api_key.as_deref()
    }

    pub fn cloudinary_api_secret(&self) -> Option<&str> {
        self.cloudinary_api_secret.as_deref()
    }

    pub fn local_media_path(&self) -> Option<&str> {
        self.local_media_path.as_deref()
    }

    pub fn local_media_base_url(&self) -> Option<&str> {
        self.local_media_base_url.as_deref()
    }

    pub fn send_timeout_seconds(&self) -> u64 {
        self.send_timeout_seconds
    }
}

fn parse_csv(value: Option<String>) -> Vec<String> {
    value
        .map(|s| {
            s.split(',')
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_csv_trims_and_drops_empty_entries() {
        let parsed = parse_csv(Some("a@example.com, b@example.com,,  ".to_string()));
        assert_eq!(parsed, vec!["a@example.com", "b@example.com"]);
        assert!(parse_csv(None).is_empty());
    }
}
