//! Email messages and the fixed templates built from them

use serde::{Deserialize, Serialize};
use std::fmt;

/// Subject of the password reset email
pub const RESET_PASSWORD_SUBJECT: &str = "Reset Password";

/// Plain-text body of the password reset email
pub const RESET_PASSWORD_TEXT: &str = "Would you like to reset your email?";

/// A transactional email ready to be handed to a [`Mailer`](super::Mailer)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MailMessage {
    /// Sender address
    pub from: String,

    /// Recipient addresses
    pub to: Vec<String>,

    /// Carbon-copy addresses
    #[serde(default)]
    pub cc: Vec<String>,

    /// Subject line
    pub subject: String,

    /// HTML body; the text body is sent as HTML when absent
    #[serde(default)]
    pub html: Option<String>,

    /// Plain-text body
    pub text: String,
}

impl MailMessage {
    /// Password reset email addressed to a single recipient
    pub fn password_reset(from: impl Into<String>, recipient: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: vec![recipient.into()],
            cc: Vec::new(),
            subject: RESET_PASSWORD_SUBJECT.to_string(),
            html: None,
            text: RESET_PASSWORD_TEXT.to_string(),
        }
    }

    /// HTML body as sent: the explicit HTML, or the text body
    pub fn html_body(&self) -> &str {
        self.html.as_deref().unwrap_or(&self.text)
    }
}

/// Identifier the email service assigns to an accepted message
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(String);

impl MessageId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
