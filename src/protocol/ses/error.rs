//! Error types for email dispatch

use aws_sdk_ses::config::http::HttpResponse;
use aws_sdk_ses::error::{BuildError, DisplayErrorContext, ProvideErrorMetadata, SdkError};
use thiserror::Error;

/// Result type alias for mail operations
pub type MailResult<T> = Result<T, MailError>;

/// Errors that can occur while sending email
#[derive(Error, Debug, Clone)]
pub enum MailError {
    /// The message could not be turned into a valid request
    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    /// SES rejected the message
    #[error("Message rejected: {0}")]
    Rejected(String),

    /// Sending is paused or throttled for the account
    #[error("Sending quota or pause in effect ({code}): {message}")]
    Throttled { code: String, message: String },

    /// SES service error with specific error code
    #[error("SES service error ({code}): {message}")]
    Service { code: String, message: String },

    /// Network error
    #[error("Network error: {0}")]
    Network(String),

    /// Timeout error
    #[error("Operation timed out: {0}")]
    Timeout(String),

    /// AWS SDK error that does not fit a more specific variant
    #[error("AWS SDK error: {0}")]
    Sdk(String),
}

impl MailError {
    /// Check if error is transient (safe to retry)
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            MailError::Network(_) | MailError::Timeout(_) | MailError::Throttled { .. }
        )
    }
}

impl From<BuildError> for MailError {
    fn from(err: BuildError) -> Self {
        MailError::InvalidMessage(err.to_string())
    }
}

impl<E> From<SdkError<E, HttpResponse>> for MailError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    fn from(err: SdkError<E, HttpResponse>) -> Self {
        match &err {
            SdkError::TimeoutError(_) => {
                MailError::Timeout(format!("{}", DisplayErrorContext(&err)))
            }
            SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
                MailError::Network(format!("{}", DisplayErrorContext(&err)))
            }
            SdkError::ServiceError(ctx) => {
                let code = ctx.err().code().unwrap_or("Unknown").to_string();
                let message = ctx
                    .err()
                    .message()
                    .map(str::to_string)
                    .unwrap_or_else(|| format!("{}", DisplayErrorContext(&err)));

                match code.as_str() {
                    "MessageRejected" | "MailFromDomainNotVerifiedException" => {
                        MailError::Rejected(message)
                    }
                    "AccountSendingPausedException"
                    | "ConfigurationSetSendingPausedException"
                    | "Throttling" => MailError::Throttled { code, message },
                    _ => MailError::Service { code, message },
                }
            }
            _ => MailError::Sdk(format!("{}", DisplayErrorContext(&err))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_errors() {
        assert!(MailError::Network("reset".to_string()).is_transient());
        assert!(MailError::Throttled {
            code: "Throttling".to_string(),
            message: "slow down".to_string()
        }
        .is_transient());
        assert!(!MailError::Rejected("unverified sender".to_string()).is_transient());
        assert!(!MailError::InvalidMessage("no subject".to_string()).is_transient());
    }

    #[test]
    fn test_error_display() {
        let err = MailError::Service {
            code: "InvalidParameterValue".to_string(),
            message: "Missing final '@domain'".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "SES service error (InvalidParameterValue): Missing final '@domain'"
        );
    }
}
