//! Type definitions for object storage operations

use super::error::{StorageError, StorageResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::pin::Pin;
use tokio::io::AsyncRead;

/// Byte stream of an object body being downloaded
pub type ObjectReader = Pin<Box<dyn AsyncRead + Send>>;

/// Location of an object: a (bucket, key) pair
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    bucket: String,
    key: String,
}

impl ObjectRef {
    /// Create a reference after validating the bucket name and key
    pub fn new(bucket: impl Into<String>, key: impl Into<String>) -> StorageResult<Self> {
        let bucket = bucket.into();
        let key = key.into();

        if bucket.is_empty() {
            return Err(StorageError::InvalidBucketName(
                "Bucket name cannot be empty".to_string(),
            ));
        }
        if !is_valid_bucket_name(&bucket) {
            return Err(StorageError::InvalidBucketName(format!(
                "{}. Bucket names must be 3-63 characters, \
                 lowercase letters, numbers, hyphens, and periods only",
                bucket
            )));
        }
        if key.is_empty() {
            return Err(StorageError::InvalidKey(
                "Object key cannot be empty".to_string(),
            ));
        }
        // S3 caps keys at 1024 bytes of UTF-8
        if key.len() > 1024 {
            return Err(StorageError::InvalidKey(format!(
                "Object key is {} bytes, maximum is 1024",
                key.len()
            )));
        }

        Ok(Self { bucket, key })
    }

    /// Bucket name
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// Object key
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for ObjectRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.bucket, self.key)
    }
}

/// Information about an uploaded part
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadPartInfo {
    /// Part number (1-indexed)
    pub part_number: i32,

    /// ETag of the uploaded part
    pub etag: String,

    /// Size of the part in bytes
    pub size: usize,
}

/// Validate S3 bucket name according to AWS rules
pub(crate) fn is_valid_bucket_name(name: &str) -> bool {
    let len = name.len();

    if !(3..=63).contains(&len) {
        return false;
    }

    // Must start and end with lowercase letter or number
    let bytes = name.as_bytes();
    let edge_ok = |b: u8| b.is_ascii_lowercase() || b.is_ascii_digit();
    if !edge_ok(bytes[0]) || !edge_ok(bytes[len - 1]) {
        return false;
    }

    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '.')
    {
        return false;
    }

    if name.contains("..") {
        return false;
    }

    // Cannot be formatted as IP address
    if name.split('.').count() == 4 && name.split('.').all(|s| s.parse::<u8>().is_ok()) {
        return false;
    }

    // Reserved prefix and suffix
    if name.starts_with("xn--") || name.ends_with("-s3alias") {
        return false;
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_bucket_names() {
        assert!(is_valid_bucket_name("aws.minimalgap.com"));
        assert!(is_valid_bucket_name("my-bucket"));
        assert!(is_valid_bucket_name("abc"));
        assert!(is_valid_bucket_name("a".repeat(63).as_str()));
    }

    #[test]
    fn test_invalid_bucket_names() {
        assert!(!is_valid_bucket_name("ab"));
        assert!(!is_valid_bucket_name(&"a".repeat(64)));
        assert!(!is_valid_bucket_name("My-Bucket"));
        assert!(!is_valid_bucket_name("my_bucket"));
        assert!(!is_valid_bucket_name("my..bucket"));
        assert!(!is_valid_bucket_name("192.168.1.1"));
        assert!(!is_valid_bucket_name("xn--bucket"));
        assert!(!is_valid_bucket_name("bucket-s3alias"));
        assert!(!is_valid_bucket_name("-bucket"));
        assert!(!is_valid_bucket_name("bucket."));
    }

    #[test]
    fn test_object_ref_display() {
        let target = ObjectRef::new("aws.minimalgap.com", "out/upload.txt").unwrap();
        assert_eq!(target.to_string(), "aws.minimalgap.com/out/upload.txt");
        assert_eq!(target.bucket(), "aws.minimalgap.com");
        assert_eq!(target.key(), "out/upload.txt");
    }

    #[test]
    fn test_object_ref_rejects_bad_input() {
        assert!(matches!(
            ObjectRef::new("", "key"),
            Err(StorageError::InvalidBucketName(_))
        ));
        assert!(matches!(
            ObjectRef::new("Bad_Bucket", "key"),
            Err(StorageError::InvalidBucketName(_))
        ));
        assert!(matches!(
            ObjectRef::new("good-bucket", ""),
            Err(StorageError::InvalidKey(_))
        ));
        assert!(matches!(
            ObjectRef::new("good-bucket", "k".repeat(1025)),
            Err(StorageError::InvalidKey(_))
        ));
    }
}
