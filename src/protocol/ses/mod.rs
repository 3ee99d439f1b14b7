//! Transactional email through Amazon SES
//!
//! [`Mailer`] is the seam the rest of the crate sends through; [`SesMailer`]
//! implements it with `aws-sdk-ses`.

mod client;
mod error;
mod message;

pub use client::{SendEmailRequest, SesMailer, CHARSET};
pub use error::{MailError, MailResult};
pub use message::{MailMessage, MessageId, RESET_PASSWORD_SUBJECT, RESET_PASSWORD_TEXT};

use async_trait::async_trait;
use tracing::info;

/// Sends a fully formed message and returns the service's message id
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, message: &MailMessage) -> MailResult<MessageId>;
}

/// Send the fixed password reset email to `recipient` from `sender`
pub async fn send_password_reset<M>(
    mailer: &M,
    sender: &str,
    recipient: &str,
) -> MailResult<MessageId>
where
    M: Mailer + ?Sized,
{
    info!(recipient, "sending password reset");
    mailer
        .send(&MailMessage::password_reset(sender, recipient))
        .await
}
