/*!
 * minimalgap - S3 round trip and transactional email
 *
 * Uploads a local file to an S3 bucket, downloads it back, and sends a
 * password reset email through SES. Credentials are resolved once from
 * the environment or a local file and shared by every client.
 */

pub mod commands;
pub mod config;
pub mod credentials;
pub mod error;
pub mod logging;
pub mod protocol;

// Re-export commonly used types
pub use config::{LogLevel, Settings};
pub use credentials::{AwsContext, CredentialError, CredentialSource, ResolvedCredentials};
pub use error::{MinimalgapError, Result};
pub use protocol::s3::{S3Client, StorageClient, StorageError};
pub use protocol::ses::{MailError, Mailer, SesMailer};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
