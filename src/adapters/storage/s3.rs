use crate::adapters::storage::ObjectStorage;
use crate::config::StorageConfig;
use crate::error::Result;
use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_credential_types::Credentials;
use aws_sdk_s3::Client;
use aws_sdk_s3::error::DisplayErrorContext;
use serde_json::{Value, json};

/// Builds an S3 client from configuration, honoring custom endpoints and static credentials.
pub async fn initialize_client(config: &StorageConfig) -> Client {
    let mut loader = aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let (Some(access_key), Some(secret_key)) = (&config.access_key, &config.secret_key) {
        loader = loader.credentials_provider(Credentials::new(
            access_key.clone(),
            secret_key.clone(),
            None,
            None,
            "static",
        ));
    }

    let sdk_config = loader.load().await;
    let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config).force_path_style(config.force_path_style);
    if let Some(endpoint) = &config.endpoint {
        builder = builder.endpoint_url(endpoint);
    }

    Client::from_conf(builder.build())
}

#[derive(Clone, Debug)]
pub struct S3Storage {
    client: Client,
    bucket: String,
}

impl S3Storage {
    #[must_use]
    pub const fn new(client: Client, bucket: String) -> Self {
        Self { client, bucket }
    }
}

#[async_trait]
impl ObjectStorage for S3Storage {
    async fn healthcheck(&self) -> Result<Value> {
        match self.client.head_bucket().bucket(&self.bucket).send().await {
            Ok(_) => Ok(json!({ "status": "healthy", "type": "s3", "bucket": self.bucket })),
            Err(e) => {
                tracing::debug!(error = %DisplayErrorContext(&e), bucket = %self.bucket, "S3 HeadBucket failed");
                Ok(json!({
                    "status": "unhealthy",
                    "type": "s3",
                    "bucket": self.bucket,
                    "error": format!("Storage connection failed for bucket {}: {}", self.bucket, DisplayErrorContext(&e)),
                }))
            }
        }
    }
}
