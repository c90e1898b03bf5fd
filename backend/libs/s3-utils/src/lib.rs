/// Shared S3 utilities
///
/// Provides the AWS S3 client, configuration, and the object operations the
/// services need (upload, prefix listing, batch deletion).

use aws_sdk_s3::config::Region;
use aws_sdk_s3::Client;
use std::sync::Arc;
use thiserror::Error;

pub mod config;
pub mod operations;

pub use config::{encode_key, S3Config};
pub use operations::S3Operations;

/// Errors returned by S3 operations
#[derive(Debug, Error)]
pub enum S3Error {
    #[error("failed to upload {key}: {message}")]
    Upload { key: String, message: String },

    #[error("failed to list objects under {prefix}: {message}")]
    List { prefix: String, message: String },

    #[error("failed to delete objects: {0}")]
    Delete(String),

    #[error("invalid S3 request: {0}")]
    Request(String),

    #[error("S3 health check failed: {0}")]
    Health(String),
}

pub type S3Result<T> = Result<T, S3Error>;

/// Shared S3 client wrapper
#[derive(Clone)]
pub struct S3Client {
    client: Arc<Client>,
    config: S3Config,
}

impl S3Client {
    /// Create new S3 client with custom configuration
    pub async fn with_config(config: S3Config) -> Self {
        let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(Region::new(config.region.clone()))
            .load()
            .await;

        let mut builder =
            aws_sdk_s3::config::Builder::from(&aws_config).force_path_style(config.path_style);
        if let Some(endpoint) = &config.endpoint_url {
            builder = builder.endpoint_url(endpoint);
        }

        tracing::debug!(
            bucket = %config.bucket,
            endpoint = config.endpoint_url.as_deref().unwrap_or("aws"),
            "S3 client configured"
        );

        Self {
            client: Arc::new(Client::from_conf(builder.build())),
            config,
        }
    }

    /// Object operations bound to this client's bucket
    pub fn operations(&self) -> S3Operations {
        S3Operations::new(self.client.clone(), self.config.clone())
    }

    /// Health check for S3 connectivity
    pub async fn health_check(&self) -> S3Result<()> {
        self.client
            .head_bucket()
            .bucket(&self.config.bucket)
            .send()
            .await
            .map_err(|e| S3Error::Health(aws_sdk_s3::error::DisplayErrorContext(&e).to_string()))?;

        Ok(())
    }
}
