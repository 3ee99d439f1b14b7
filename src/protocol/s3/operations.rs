//! S3 operations trait and its AWS SDK implementation

use super::client::S3Client;
use super::error::{StorageError, StorageResult};
use super::types::{ObjectReader, ObjectRef, UploadPartInfo};
use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::types::{CompletedMultipartUpload, CompletedPart};
use bytes::Bytes;
use tracing::debug;

/// Object-level requests the transfer layer is built on
///
/// [`S3Client`] implements this against AWS; tests substitute an in-memory
/// store.
#[async_trait]
pub trait S3Operations: Send + Sync {
    /// Store `body` as the whole object in a single request
    async fn put_object(&self, target: &ObjectRef, body: Bytes) -> StorageResult<()>;

    /// Start a multipart upload and return its upload id
    async fn create_multipart_upload(&self, target: &ObjectRef) -> StorageResult<String>;

    /// Upload one part of a multipart upload
    async fn upload_part(
        &self,
        target: &ObjectRef,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> StorageResult<UploadPartInfo>;

    /// Assemble the uploaded parts into the final object
    async fn complete_multipart_upload(
        &self,
        target: &ObjectRef,
        upload_id: &str,
        parts: &[UploadPartInfo],
    ) -> StorageResult<()>;

    /// Discard a multipart upload and any parts already stored
    async fn abort_multipart_upload(&self, target: &ObjectRef, upload_id: &str)
        -> StorageResult<()>;

    /// Open the body of an object for streaming
    async fn get_object(&self, target: &ObjectRef) -> StorageResult<ObjectReader>;
}

#[async_trait]
impl S3Operations for S3Client {
    async fn put_object(&self, target: &ObjectRef, body: Bytes) -> StorageResult<()> {
        let size = body.len();

        self.aws_client()
            .put_object()
            .bucket(target.bucket())
            .key(target.key())
            .content_length(size as i64)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, target))?;

        debug!(%target, size, "put object");
        Ok(())
    }

    async fn create_multipart_upload(&self, target: &ObjectRef) -> StorageResult<String> {
        let response = self
            .aws_client()
            .create_multipart_upload()
            .bucket(target.bucket())
            .key(target.key())
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, target))?;

        let upload_id = response.upload_id().ok_or_else(|| {
            StorageError::MultipartUpload("No upload ID returned from S3".to_string())
        })?;

        debug!(%target, upload_id, "created multipart upload");
        Ok(upload_id.to_string())
    }

    async fn upload_part(
        &self,
        target: &ObjectRef,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> StorageResult<UploadPartInfo> {
        let size = body.len();

        let response = self
            .aws_client()
            .upload_part()
            .bucket(target.bucket())
            .key(target.key())
            .upload_id(upload_id)
            .part_number(part_number)
            .content_length(size as i64)
            .body(ByteStream::from(body))
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, target))?;

        let etag = response.e_tag().ok_or_else(|| {
            StorageError::MultipartUpload(format!("No ETag returned for part {}", part_number))
        })?;

        Ok(UploadPartInfo {
            part_number,
            etag: etag.to_string(),
            size,
        })
    }

    async fn complete_multipart_upload(
        &self,
        target: &ObjectRef,
        upload_id: &str,
        parts: &[UploadPartInfo],
    ) -> StorageResult<()> {
        let completed_parts: Vec<CompletedPart> = parts
            .iter()
            .map(|p| {
                CompletedPart::builder()
                    .part_number(p.part_number)
                    .e_tag(&p.etag)
                    .build()
            })
            .collect();

        let multipart_upload = CompletedMultipartUpload::builder()
            .set_parts(Some(completed_parts))
            .build();

        self.aws_client()
            .complete_multipart_upload()
            .bucket(target.bucket())
            .key(target.key())
            .upload_id(upload_id)
            .multipart_upload(multipart_upload)
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, target))?;

        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        target: &ObjectRef,
        upload_id: &str,
    ) -> StorageResult<()> {
        self.aws_client()
            .abort_multipart_upload()
            .bucket(target.bucket())
            .key(target.key())
            .upload_id(upload_id)
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, target))?;

        Ok(())
    }

    async fn get_object(&self, target: &ObjectRef) -> StorageResult<ObjectReader> {
        let response = self
            .aws_client()
            .get_object()
            .bucket(target.bucket())
            .key(target.key())
            .send()
            .await
            .map_err(|e| StorageError::from_sdk(e, target))?;

        debug!(
            %target,
            content_length = response.content_length().unwrap_or_default(),
            "opened object body"
        );
        Ok(Box::pin(response.body.into_async_read()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::s3::TransferConfig;
    use aws_config::SdkConfig;
    use aws_credential_types::provider::SharedCredentialsProvider;
    use aws_sdk_s3::config::retry::RetryConfig;
    use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};

    /// Client aimed at a local port nothing listens on
    fn unreachable_client() -> S3Client {
        let sdk_config = SdkConfig::builder()
            .behavior_version(BehaviorVersion::latest())
            .region(Region::new("eu-west-1"))
            .credentials_provider(SharedCredentialsProvider::new(Credentials::new(
                "AKIDEXAMPLE",
                "secret",
                None,
                None,
                "test",
            )))
            .endpoint_url("http://127.0.0.1:1")
            .retry_config(RetryConfig::disabled())
            .build();
        S3Client::new(&sdk_config, &TransferConfig::default())
    }

    fn target() -> ObjectRef {
        ObjectRef::new("aws.minimalgap.com", "out/upload.txt").unwrap()
    }

    #[tokio::test]
    async fn test_put_object_unreachable_is_network_error() {
        let err = unreachable_client()
            .put_object(&target(), Bytes::from_static(b"ok"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Network(_)), "unexpected error: {err}");
    }

    #[tokio::test]
    async fn test_multipart_calls_unreachable_are_network_errors() {
        let client = unreachable_client();

        let err = client.create_multipart_upload(&target()).await.unwrap_err();
        assert!(matches!(err, StorageError::Network(_)), "unexpected error: {err}");

        let err = client
            .upload_part(&target(), "upload-1", 1, Bytes::from_static(b"ok"))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Network(_)), "unexpected error: {err}");

        let err = client
            .abort_multipart_upload(&target(), "upload-1")
            .await
            .unwrap_err();
        assert!(err.is_transient());
    }

    #[tokio::test]
    async fn test_get_object_unreachable_is_network_error() {
        let err = match unreachable_client().get_object(&target()).await {
            Ok(_) => panic!("get_object succeeded against an unreachable endpoint"),
            Err(err) => err,
        };
        assert!(matches!(err, StorageError::Network(_)), "unexpected error: {err}");
    }
}
