//! Write, upload and download back a small file

use crate::config::{Settings, ROUND_TRIP_CONTENT};
use crate::error::Result;
use crate::protocol::s3::{S3Operations, StorageClient};
use std::path::PathBuf;
use tracing::{debug, info};

/// What a completed round trip touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoundTripReport {
    /// `bucket/key` returned by the upload
    pub location: String,

    pub upload_path: PathBuf,
    pub download_path: PathBuf,

    /// Bytes written to the download file
    pub downloaded: u64,
}

/// Run the round trip against `storage`
///
/// Ensures `out_dir` exists, writes the upload file, uploads it under its
/// own relative path and downloads it next to it.
pub async fn run_roundtrip<O: S3Operations>(
    settings: &Settings,
    storage: &StorageClient<O>,
) -> Result<RoundTripReport> {
    let upload_path = settings.upload_path();
    let download_path = settings.download_path();
    let key = settings.object_key();

    tokio::fs::create_dir_all(&settings.out_dir).await?;
    tokio::fs::write(&upload_path, ROUND_TRIP_CONTENT).await?;
    debug!(path = %upload_path.display(), "wrote upload file");

    let location = storage.upload(&upload_path, &settings.bucket, &key).await?;
    info!(%location, "uploaded");

    let downloaded = storage
        .download(&settings.bucket, &key, &download_path)
        .await?;

    Ok(RoundTripReport {
        location,
        upload_path,
        download_path,
        downloaded,
    })
}
