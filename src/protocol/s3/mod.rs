//! Object storage on Amazon S3
//!
//! Uploads stream a local file through an in-process pass-through pipe into
//! a managed upload; downloads stream the object body straight into a local
//! file. Every SDK call sits behind [`S3Operations`], which [`S3Client`]
//! implements with `aws-sdk-s3`.
//!
//! # Examples
//!
//! ```no_run
//! use minimalgap::protocol::s3::{S3Client, StorageClient, TransferConfig};
//! use std::path::Path;
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let sdk_config = aws_config::load_from_env().await;
//!     let transfer = TransferConfig::default();
//!     let storage = StorageClient::new(S3Client::new(&sdk_config, &transfer), transfer)?;
//!
//!     let location = storage
//!         .upload(Path::new("out/upload.txt"), "aws.minimalgap.com", "out/upload.txt")
//!         .await?;
//!     println!("{}", location);
//!
//!     storage
//!         .download("aws.minimalgap.com", "out/upload.txt", Path::new("out/download.txt"))
//!         .await?;
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod operations;
mod transfer;
mod types;

#[cfg(test)]
mod tests;

pub use client::S3Client;
pub use config::TransferConfig;
pub use error::{StorageError, StorageResult};
pub use operations::S3Operations;
pub use transfer::StorageClient;
pub use types::{ObjectReader, ObjectRef, UploadPartInfo};

/// Default multipart part size (5 MiB - minimum for S3)
pub const DEFAULT_PART_SIZE: usize = 5 * 1024 * 1024;

/// Minimum multipart part size required by S3
pub const MIN_PART_SIZE: usize = 5 * 1024 * 1024;

/// Maximum multipart part size (5 GiB)
pub const MAX_PART_SIZE: usize = 5 * 1024 * 1024 * 1024;

/// Most parts S3 accepts in one multipart upload
pub const MAX_PARTS: i32 = 10_000;

/// Bytes read from a local file per chunk (16 KiB)
pub const DEFAULT_READ_BUFFER_SIZE: usize = 16 * 1024;

/// Chunks buffered in the pass-through pipe
pub const DEFAULT_PIPE_DEPTH: usize = 4;
