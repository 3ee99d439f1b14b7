//! S3 client implementation

use super::config::TransferConfig;
use aws_config::SdkConfig;
use aws_sdk_s3::config::timeout::TimeoutConfig;
use aws_sdk_s3::Client as AwsS3Client;
use std::time::Duration;

/// Thin wrapper around the AWS SDK S3 client
///
/// Built once from the shared [`SdkConfig`] and handed to the storage layer,
/// so every request reuses the same resolved credentials and region.
#[derive(Clone, Debug)]
pub struct S3Client {
    client: AwsS3Client,
}

impl S3Client {
    /// Create a new S3 client from the shared SDK configuration
    ///
    /// # Example
    ///
    /// ```no_run
    /// use minimalgap::protocol::s3::{S3Client, TransferConfig};
    ///
    /// #[tokio::main(flavor = "current_thread")]
    /// async fn main() {
    ///     let sdk_config = aws_config::load_from_env().await;
    ///     let client = S3Client::new(&sdk_config, &TransferConfig::default());
    ///     # let _ = client;
    /// }
    /// ```
    pub fn new(sdk_config: &SdkConfig, transfer: &TransferConfig) -> Self {
        let timeout_config = TimeoutConfig::builder()
            .operation_timeout(Duration::from_secs(transfer.timeout_seconds))
            .build();

        let s3_config = aws_sdk_s3::config::Builder::from(sdk_config)
            .timeout_config(timeout_config)
            .build();

        Self {
            client: AwsS3Client::from_conf(s3_config),
        }
    }

    /// Get a reference to the underlying AWS S3 client
    pub fn aws_client(&self) -> &AwsS3Client {
        &self.client
    }
}
