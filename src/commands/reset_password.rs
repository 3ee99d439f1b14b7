//! Send the password reset email

use crate::config::Settings;
use crate::error::Result;
use crate::protocol::ses::{send_password_reset, Mailer, MessageId};

/// Send the reset email to `recipient` from the configured sender
pub async fn run_reset_password<M>(
    settings: &Settings,
    mailer: &M,
    recipient: &str,
) -> Result<MessageId>
where
    M: Mailer + ?Sized,
{
    Ok(send_password_reset(mailer, &settings.sender, recipient).await?)
}
