//! Test doubles shared by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use minimalgap::protocol::s3::{
    ObjectReader, ObjectRef, S3Operations, StorageError, StorageResult, UploadPartInfo,
    MIN_PART_SIZE,
};
use minimalgap::protocol::ses::{MailError, MailMessage, MailResult, Mailer, MessageId};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Requests seen by [`MemoryStore`], in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Put { key: String, size: usize },
    Create { key: String },
    Part { key: String, part_number: i32, size: usize },
    Complete { key: String, parts: usize },
    Abort { key: String },
    Get { key: String },
}

#[derive(Default)]
struct Pending {
    target: Option<ObjectRef>,
    parts: BTreeMap<i32, Bytes>,
}

/// In-memory object store enforcing the S3 part size rules
#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<(String, String), Bytes>>,
    uploads: Mutex<HashMap<String, Pending>>,
    calls: Mutex<Vec<Call>>,
    next_id: AtomicUsize,
    buckets: Option<Vec<String>>,
    fail_part: Option<i32>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only these buckets exist; anything else is `NoSuchBucket`
    pub fn with_buckets(buckets: &[&str]) -> Self {
        Self {
            buckets: Some(buckets.iter().map(|b| b.to_string()).collect()),
            ..Self::default()
        }
    }

    /// Fail `UploadPart` for this part number
    pub fn failing_part(part_number: i32) -> Self {
        Self {
            fail_part: Some(part_number),
            ..Self::default()
        }
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
    }

    pub fn insert(&self, bucket: &str, key: &str, body: impl Into<Bytes>) {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), body.into());
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn pending_uploads(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn check_bucket(&self, target: &ObjectRef) -> StorageResult<()> {
        match &self.buckets {
            Some(buckets) if !buckets.iter().any(|b| b == target.bucket()) => {
                Err(StorageError::BucketNotFound(target.bucket().to_string()))
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl S3Operations for MemoryStore {
    async fn put_object(&self, target: &ObjectRef, body: Bytes) -> StorageResult<()> {
        self.check_bucket(target)?;
        self.record(Call::Put {
            key: target.key().to_string(),
            size: body.len(),
        });
        self.insert(target.bucket(), target.key(), body);
        Ok(())
    }

    async fn create_multipart_upload(&self, target: &ObjectRef) -> StorageResult<String> {
        self.check_bucket(target)?;
        self.record(Call::Create {
            key: target.key().to_string(),
        });
        let id = format!("upload-{}", self.next_id.fetch_add(1, Ordering::SeqCst));
        self.uploads.lock().unwrap().insert(
            id.clone(),
            Pending {
                target: Some(target.clone()),
                parts: BTreeMap::new(),
            },
        );
        Ok(id)
    }

    async fn upload_part(
        &self,
        target: &ObjectRef,
        upload_id: &str,
        part_number: i32,
        body: Bytes,
    ) -> StorageResult<UploadPartInfo> {
        self.record(Call::Part {
            key: target.key().to_string(),
            part_number,
            size: body.len(),
        });
        if self.fail_part == Some(part_number) {
            return Err(StorageError::Network("connection reset".to_string()));
        }

        let size = body.len();
        let mut uploads = self.uploads.lock().unwrap();
        let pending = uploads
            .get_mut(upload_id)
            .ok_or_else(|| StorageError::MultipartUpload(format!("no upload {}", upload_id)))?;
        pending.parts.insert(part_number, body);

        Ok(UploadPartInfo {
            part_number,
            etag: format!("\"etag-{}\"", part_number),
            size,
        })
    }

    async fn complete_multipart_upload(
        &self,
        target: &ObjectRef,
        upload_id: &str,
        parts: &[UploadPartInfo],
    ) -> StorageResult<()> {
        self.record(Call::Complete {
            key: target.key().to_string(),
            parts: parts.len(),
        });

        let pending = self
            .uploads
            .lock()
            .unwrap()
            .remove(upload_id)
            .ok_or_else(|| StorageError::MultipartUpload(format!("no upload {}", upload_id)))?;

        let stored: Vec<&Bytes> = pending.parts.values().collect();
        if stored.len() != parts.len() {
            return Err(StorageError::MultipartUpload("part count mismatch".to_string()));
        }
        let too_small = stored
            .split_last()
            .is_some_and(|(_, rest)| rest.iter().any(|part| part.len() < MIN_PART_SIZE));
        if too_small {
            return Err(StorageError::Service {
                code: "EntityTooSmall".to_string(),
                message: "Your proposed upload is smaller than the minimum allowed size"
                    .to_string(),
            });
        }

        let mut body = BytesMut::new();
        for part in stored {
            body.extend_from_slice(part);
        }
        let target = pending.target.unwrap_or_else(|| target.clone());
        self.insert(target.bucket(), target.key(), body.freeze());
        Ok(())
    }

    async fn abort_multipart_upload(
        &self,
        target: &ObjectRef,
        upload_id: &str,
    ) -> StorageResult<()> {
        self.record(Call::Abort {
            key: target.key().to_string(),
        });
        self.uploads.lock().unwrap().remove(upload_id);
        Ok(())
    }

    async fn get_object(&self, target: &ObjectRef) -> StorageResult<ObjectReader> {
        self.check_bucket(target)?;
        self.record(Call::Get {
            key: target.key().to_string(),
        });
        let body = self
            .object(target.bucket(), target.key())
            .ok_or_else(|| StorageError::NotFound {
                bucket: target.bucket().to_string(),
                key: target.key().to_string(),
            })?;
        Ok(Box::pin(std::io::Cursor::new(body.to_vec())))
    }
}

/// Mailer that keeps every message instead of sending it
#[derive(Default)]
pub struct RecordingMailer {
    sent: Mutex<Vec<MailMessage>>,
    reject: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send fails as an unverified sender would
    pub fn rejecting() -> Self {
        Self {
            reject: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<MailMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send(&self, message: &MailMessage) -> MailResult<MessageId> {
        if self.reject {
            return Err(MailError::Rejected(format!(
                "Email address is not verified: {}",
                message.from
            )));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push(message.clone());
        Ok(MessageId::new(format!("msg-{}", sent.len())))
    }
}
