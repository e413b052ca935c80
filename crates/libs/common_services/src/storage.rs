use app_state::StorageSettings;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::presigning::PresigningConfig;
use color_eyre::Result;
use std::time::Duration;

/// Client for the private R2 media bucket, spoken to over its S3 API.
#[derive(Clone)]
pub struct R2Storage {
    client: aws_sdk_s3::Client,
    bucket: String,
    url_ttl: Duration,
}

impl R2Storage {
    #[must_use]
    pub fn new(settings: &StorageSettings) -> Self {
        let credentials = Credentials::new(
            &settings.access_key_id,
            &settings.secret_access_key,
            None,
            None,
            "r2-static",
        );
        let config = aws_sdk_s3::Config::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("auto"))
            .endpoint_url(settings.endpoint())
            .credentials_provider(credentials)
            .build();
        Self {
            client: aws_sdk_s3::Client::from_conf(config),
            bucket: settings.bucket.clone(),
            url_ttl: Duration::from_secs(settings.signed_url_ttl_s),
        }
    }

    /// Presigned GET URL for an object. Signing happens locally, so this
    /// never talks to R2 and cannot tell you whether the key exists.
    pub async fn signed_get_url(&self, key: &str) -> Result<String> {
        let presigned = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .presigned(PresigningConfig::expires_in(self.url_ttl)?)
            .await?;
        Ok(presigned.uri().to_string())
    }
}
