//! Error types for object storage operations

use super::types::ObjectRef;
use aws_sdk_s3::config::http::HttpResponse;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Result type alias for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur while moving bytes to or from object storage
#[derive(Error, Debug, Clone)]
pub enum StorageError {
    /// AWS SDK error that does not fit a more specific variant
    #[error("AWS SDK error: {0}")]
    Sdk(String),

    /// S3 service error with specific error code
    #[error("S3 service error ({code}): {message}")]
    Service { code: String, message: String },

    /// Object not found in bucket
    #[error("Object not found: {bucket}/{key}")]
    NotFound { bucket: String, key: String },

    /// Bucket not found or not accessible
    #[error("Bucket not found or not accessible: {0}")]
    BucketNotFound(String),

    /// Access denied error
    #[error("Access denied: {0}")]
    AccessDenied(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid bucket name
    #[error("Invalid bucket name: {0}")]
    InvalidBucketName(String),

    /// Invalid object key
    #[error("Invalid object key: {0}")]
    InvalidKey(String),

    /// Multipart upload error
    #[error("Multipart upload error: {0}")]
    MultipartUpload(String),

    /// Local file could not be read or written
    #[error("I/O error on {}: {message}", path.display())]
    LocalFile { path: PathBuf, message: String },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(String),

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),
}

impl StorageError {
    /// Wrap an I/O failure on a local file
    pub fn local_file(path: &Path, err: io::Error) -> Self {
        StorageError::LocalFile {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }

    /// Classify an SDK failure for an operation against `target`
    pub fn from_sdk<E>(err: SdkError<E, HttpResponse>, target: &ObjectRef) -> Self
    where
        E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    {
        match &err {
            SdkError::TimeoutError(_) => {
                StorageError::Timeout(format!("{}", DisplayErrorContext(&err)))
            }
            SdkError::DispatchFailure(_) => StorageError::Network(format!(
                "Network dispatch failure: {}",
                DisplayErrorContext(&err)
            )),
            SdkError::ResponseError(_) => StorageError::Network(format!(
                "Response error: {}",
                DisplayErrorContext(&err)
            )),
            SdkError::ServiceError(ctx) => {
                let status = ctx.raw().status().as_u16();
                let code = ctx.err().code().unwrap_or("Unknown");
                let message = ctx
                    .err()
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}", DisplayErrorContext(&err)));

                match (code, status) {
                    ("NoSuchBucket", _) => StorageError::BucketNotFound(target.bucket().to_string()),
                    ("NoSuchKey", _) | ("NotFound", _) | (_, 404) => StorageError::NotFound {
                        bucket: target.bucket().to_string(),
                        key: target.key().to_string(),
                    },
                    ("AccessDenied", _) | ("InvalidAccessKeyId", _) | (_, 403) => {
                        StorageError::AccessDenied(format!("{}: {}", target, message))
                    }
                    _ => StorageError::Service {
                        code: code.to_string(),
                        message,
                    },
                }
            }
            _ => StorageError::Sdk(format!("{}", DisplayErrorContext(&err))),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        match self {
            StorageError::Network(_) => true,
            StorageError::Timeout(_) => true,
            StorageError::Io(_) => true,
            StorageError::Service { code, .. } => is_retryable_code(code),
            _ => false,
        }
    }

    /// Check if error is transient (safe to retry)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            StorageError::Network(_) | StorageError::Timeout(_) | StorageError::Io(_)
        )
    }
}

impl From<io::Error> for StorageError {
    fn from(err: io::Error) -> Self {
        StorageError::Io(err.to_string())
    }
}

/// Check if an AWS error code is retryable
pub(crate) fn is_retryable_code(code: &str) -> bool {
    matches!(
        code,
        "RequestTimeout"
            | "ServiceUnavailable"
            | "InternalError"
            | "SlowDown"
            | "RequestTimeTooSkewed"
    )
}
