//! Live tests against a real bucket
//!
//! Set the following environment variables to run them:
//!
//! - `S3_TESTS_ENABLED`: Set to "1" to enable
//! - `S3_TEST_BUCKET`: Bucket name (default: aws.minimalgap.com)
//! - `AWS_DEFAULT_REGION`: Region (default: eu-west-1)
//! - `AWS_ACCESS_KEY_ID` / `AWS_SECRET_ACCESS_KEY`: credentials

use super::*;
use aws_sdk_s3::config::Region;
use std::env;

fn s3_tests_enabled() -> bool {
    env::var("S3_TESTS_ENABLED").unwrap_or_default() == "1"
}

fn test_bucket() -> String {
    env::var("S3_TEST_BUCKET").unwrap_or_else(|_| "aws.minimalgap.com".to_string())
}

async fn live_storage() -> StorageClient<S3Client> {
    let region = env::var("AWS_DEFAULT_REGION").unwrap_or_else(|_| "eu-west-1".to_string());
    let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new(region))
        .load()
        .await;
    let transfer = TransferConfig::default();
    StorageClient::new(S3Client::new(&sdk_config, &transfer), transfer)
        .expect("default transfer config is valid")
}

#[tokio::test]
#[ignore]
async fn test_live_round_trip() {
    if !s3_tests_enabled() {
        println!("Skipping S3 integration test - set S3_TESTS_ENABLED=1 to run");
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let upload = dir.path().join("upload.txt");
    let download = dir.path().join("download.txt");
    tokio::fs::write(&upload, b"ok").await.unwrap();

    let storage = live_storage().await;
    let bucket = test_bucket();
    let key = "test/minimalgap/upload.txt";

    let location = storage.upload(&upload, &bucket, key).await.unwrap();
    assert_eq!(location, format!("{}/{}", bucket, key));

    let size = storage.download(&bucket, key, &download).await.unwrap();
    assert_eq!(size, 2);
    assert_eq!(tokio::fs::read(&download).await.unwrap(), b"ok");
}

#[tokio::test]
#[ignore]
async fn test_live_missing_object() {
    if !s3_tests_enabled() {
        return;
    }

    let dir = tempfile::tempdir().unwrap();
    let storage = live_storage().await;

    let result = storage
        .download(
            &test_bucket(),
            "test/minimalgap/does-not-exist.txt",
            &dir.path().join("missing.txt"),
        )
        .await;
    assert!(matches!(
        result,
        Err(StorageError::NotFound { .. }) | Err(StorageError::AccessDenied(_))
    ));
}
