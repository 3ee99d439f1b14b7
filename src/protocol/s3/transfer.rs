//! Streaming upload and download between local files and object storage

use super::config::TransferConfig;
use super::error::{StorageError, StorageResult};
use super::operations::S3Operations;
use super::types::{ObjectReader, ObjectRef, UploadPartInfo};
use super::MAX_PARTS;
use bytes::{Bytes, BytesMut};
use std::io;
use std::path::Path;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::sync::mpsc;
use tracing::{debug, error, info, trace, warn};

/// Upload and download files against a bucket/key addressing scheme
///
/// Owns the object operations it runs on. Every failure is logged and
/// returned to the caller.
#[derive(Debug, Clone)]
pub struct StorageClient<O> {
    ops: O,
    config: TransferConfig,
}

impl<O: S3Operations> StorageClient<O> {
    /// Create a storage client over `ops` after validating `config`
    pub fn new(ops: O, config: TransferConfig) -> StorageResult<Self> {
        config.validate()?;
        Ok(Self { ops, config })
    }

    /// Transfer settings in use
    pub fn config(&self) -> &TransferConfig {
        &self.config
    }

    /// Underlying object operations
    pub fn operations(&self) -> &O {
        &self.ops
    }

    /// Upload the file at `local_path` to `bucket`/`key`
    ///
    /// The file is read in `read_buffer_size` chunks into a pass-through pipe
    /// while the other end feeds a managed upload: one `PutObject` when the
    /// whole file fits in a part, a multipart upload otherwise. Returns
    /// `"bucket/key"` once the store has acknowledged every byte.
    pub async fn upload(
        &self,
        local_path: &Path,
        bucket: &str,
        key: &str,
    ) -> StorageResult<String> {
        let target = ObjectRef::new(bucket, key)?;

        match self.upload_to(local_path, &target).await {
            Ok(size) => {
                info!(%target, size, path = %local_path.display(), "upload complete");
                Ok(target.to_string())
            }
            Err(e) => {
                error!(%target, path = %local_path.display(), error = %e, "unable to upload");
                Err(e)
            }
        }
    }

    /// Download `bucket`/`key` into a new file at `dest_path`
    ///
    /// Existing content at `dest_path` is replaced and missing parent
    /// directories are created. Returns the number of bytes written.
    pub async fn download(
        &self,
        bucket: &str,
        key: &str,
        dest_path: &Path,
    ) -> StorageResult<u64> {
        let target = ObjectRef::new(bucket, key)?;

        match self.download_to(&target, dest_path).await {
            Ok(size) => {
                info!(%target, size, path = %dest_path.display(), "download complete");
                Ok(size)
            }
            Err(e) => {
                error!(%target, path = %dest_path.display(), error = %e, "unable to download");
                Err(e)
            }
        }
    }

    async fn upload_to(&self, local_path: &Path, target: &ObjectRef) -> StorageResult<u64> {
        let file = File::open(local_path)
            .await
            .map_err(|e| StorageError::local_file(local_path, e))?;

        let (tx, rx) = mpsc::channel(self.config.pipe_depth);
        let pump = pump_file(file, tx, self.config.read_buffer_size);
        let upload = self.managed_upload(PassThrough::new(rx), target);

        let (pumped, uploaded) = tokio::join!(pump, upload);
        let uploaded = uploaded.map_err(|e| match e {
            StorageError::Io(message) => StorageError::LocalFile {
                path: local_path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        if pumped != uploaded {
            return Err(StorageError::MultipartUpload(format!(
                "read {} bytes from {} but uploaded {}",
                pumped,
                local_path.display(),
                uploaded
            )));
        }
        Ok(uploaded)
    }

    async fn managed_upload(
        &self,
        mut pipe: PassThrough,
        target: &ObjectRef,
    ) -> StorageResult<u64> {
        let part_size = self.config.part_size;

        let first = pipe.next_part(part_size).await?;
        let second = if pipe.is_drained() {
            Bytes::new()
        } else {
            pipe.next_part(part_size).await?
        };

        if second.is_empty() {
            let size = first.len() as u64;
            self.ops.put_object(target, first).await?;
            return Ok(size);
        }

        let upload_id = self.ops.create_multipart_upload(target).await?;
        debug!(%target, upload_id, part_size, "streaming multipart upload");

        match self
            .upload_parts(target, &upload_id, [first, second], &mut pipe)
            .await
        {
            Ok(parts) => {
                self.ops
                    .complete_multipart_upload(target, &upload_id, &parts)
                    .await?;
                Ok(parts.iter().map(|p| p.size as u64).sum())
            }
            Err(e) => {
                if let Err(abort_err) = self.ops.abort_multipart_upload(target, &upload_id).await {
                    warn!(
                        %target,
                        upload_id,
                        error = %abort_err,
                        "failed to abort multipart upload"
                    );
                }
                Err(e)
            }
        }
    }

    async fn upload_parts(
        &self,
        target: &ObjectRef,
        upload_id: &str,
        leading: [Bytes; 2],
        pipe: &mut PassThrough,
    ) -> StorageResult<Vec<UploadPartInfo>> {
        let mut parts = Vec::new();
        let mut part_number = 1i32;

        for chunk in leading {
            check_part_number(part_number, self.config.part_size)?;
            let part = self
                .ops
                .upload_part(target, upload_id, part_number, chunk)
                .await?;
            parts.push(part);
            part_number += 1;
        }

        loop {
            let chunk = pipe.next_part(self.config.part_size).await?;
            if chunk.is_empty() {
                break;
            }
            check_part_number(part_number, self.config.part_size)?;
            let part = self
                .ops
                .upload_part(target, upload_id, part_number, chunk)
                .await?;
            parts.push(part);
            part_number += 1;
        }

        Ok(parts)
    }

    async fn download_to(&self, target: &ObjectRef, dest_path: &Path) -> StorageResult<u64> {
        let mut body = self.ops.get_object(target).await?;

        if let Some(parent) = dest_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| StorageError::local_file(parent, e))?;
        }

        let mut file = File::create(dest_path)
            .await
            .map_err(|e| StorageError::local_file(dest_path, e))?;

        let size = copy_body(&mut body, &mut file, self.config.read_buffer_size)
            .await
            .map_err(|e| match e {
                BodyCopyError::Read(e) => {
                    StorageError::Network(format!("Failed to read response body: {}", e))
                }
                BodyCopyError::Write(e) => StorageError::local_file(dest_path, e),
            })?;

        file.flush()
            .await
            .map_err(|e| StorageError::local_file(dest_path, e))?;
        Ok(size)
    }
}

/// Fail before sending a part S3 would reject for exceeding [`MAX_PARTS`]
fn check_part_number(part_number: i32, part_size: usize) -> StorageResult<()> {
    if part_number > MAX_PARTS {
        return Err(StorageError::MultipartUpload(format!(
            "file needs more than {} parts of {} bytes; raise part_size",
            MAX_PARTS, part_size
        )));
    }
    Ok(())
}

/// Read `file` in `chunk_size` pieces and push them into the pipe
///
/// Stops early when the consumer hangs up. A read failure is forwarded so
/// the consumer fails instead of seeing a truncated stream.
async fn pump_file(
    mut file: File,
    tx: mpsc::Sender<io::Result<Bytes>>,
    chunk_size: usize,
) -> u64 {
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        match file.read(&mut buffer).await {
            Ok(0) => break,
            Ok(n) => {
                total += n as u64;
                trace!(chunk = n, total, "read chunk");
                if tx.send(Ok(Bytes::copy_from_slice(&buffer[..n]))).await.is_err() {
                    break;
                }
            }
            Err(e) => {
                let _ = tx.send(Err(e)).await;
                break;
            }
        }
    }

    total
}

/// Consumer end of the pass-through pipe, regrouping chunks into parts
struct PassThrough {
    rx: mpsc::Receiver<io::Result<Bytes>>,
    pending: BytesMut,
    closed: bool,
}

impl PassThrough {
    fn new(rx: mpsc::Receiver<io::Result<Bytes>>) -> Self {
        Self {
            rx,
            pending: BytesMut::new(),
            closed: false,
        }
    }

    /// Next part of at most `part_size` bytes; empty once the pipe is drained
    async fn next_part(&mut self, part_size: usize) -> StorageResult<Bytes> {
        while !self.closed && self.pending.len() < part_size {
            match self.rx.recv().await {
                Some(Ok(chunk)) => self.pending.extend_from_slice(&chunk),
                Some(Err(e)) => return Err(StorageError::from(e)),
                None => self.closed = true,
            }
        }

        let take = self.pending.len().min(part_size);
        Ok(self.pending.split_to(take).freeze())
    }

    fn is_drained(&self) -> bool {
        self.closed && self.pending.is_empty()
    }
}

enum BodyCopyError {
    Read(io::Error),
    Write(io::Error),
}

async fn copy_body(
    body: &mut ObjectReader,
    file: &mut File,
    chunk_size: usize,
) -> Result<u64, BodyCopyError> {
    let mut buffer = vec![0u8; chunk_size];
    let mut total = 0u64;

    loop {
        let n = body.read(&mut buffer).await.map_err(BodyCopyError::Read)?;
        if n == 0 {
            break;
        }
        file.write_all(&buffer[..n])
            .await
            .map_err(BodyCopyError::Write)?;
        total += n as u64;
    }

    Ok(total)
}
