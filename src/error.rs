/*!
 * Error types for minimalgap
 */

use crate::credentials::CredentialError;
use crate::protocol::s3::StorageError;
use crate::protocol::ses::MailError;
use std::fmt;
use std::io;

pub type Result<T> = std::result::Result<T, MinimalgapError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_FATAL: i32 = 1;
pub const EXIT_OPERATION_FAILED: i32 = 2;

#[derive(Debug)]
pub enum MinimalgapError {
    /// Configuration error
    Config(String),

    /// Credentials could not be resolved
    Credentials(CredentialError),

    /// Upload or download failed
    Storage(StorageError),

    /// Email could not be sent
    Mail(MailError),

    /// Local I/O error outside a transfer
    Io(io::Error),
}

impl MinimalgapError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        if self.is_fatal() {
            EXIT_FATAL
        } else {
            EXIT_OPERATION_FAILED
        }
    }

    /// Nothing can proceed past these; no network call has been made yet
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            MinimalgapError::Config(_) | MinimalgapError::Credentials(_)
        )
    }
}

impl fmt::Display for MinimalgapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MinimalgapError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
            MinimalgapError::Credentials(err) => {
                write!(f, "Credential error: {}", err)
            }
            MinimalgapError::Storage(err) => {
                write!(f, "Storage error: {}", err)
            }
            MinimalgapError::Mail(err) => {
                write!(f, "Mail error: {}", err)
            }
            MinimalgapError::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
        }
    }
}

impl std::error::Error for MinimalgapError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            MinimalgapError::Credentials(err) => Some(err),
            MinimalgapError::Storage(err) => Some(err),
            MinimalgapError::Mail(err) => Some(err),
            MinimalgapError::Io(err) => Some(err),
            MinimalgapError::Config(_) => None,
        }
    }
}

impl From<io::Error> for MinimalgapError {
    fn from(err: io::Error) -> Self {
        MinimalgapError::Io(err)
    }
}

impl From<CredentialError> for MinimalgapError {
    fn from(err: CredentialError) -> Self {
        MinimalgapError::Credentials(err)
    }
}

impl From<StorageError> for MinimalgapError {
    fn from(err: StorageError) -> Self {
        MinimalgapError::Storage(err)
    }
}

impl From<MailError> for MinimalgapError {
    fn from(err: MailError) -> Self {
        MinimalgapError::Mail(err)
    }
}
