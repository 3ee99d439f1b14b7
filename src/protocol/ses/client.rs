//! SES client implementation

use super::error::{MailError, MailResult};
use super::message::{MailMessage, MessageId};
use super::Mailer;
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_ses::types::{Body, Content, Destination, Message};
use aws_sdk_ses::Client as AwsSesClient;
use tracing::{debug, error, info};

/// Character set declared on every part of the message
pub const CHARSET: &str = "UTF-8";

/// The pieces of an SES `SendEmail` request
#[derive(Debug, Clone)]
pub struct SendEmailRequest {
    pub source: String,
    pub destination: Destination,
    pub message: Message,
    pub reply_to: Vec<String>,
}

impl SendEmailRequest {
    /// Translate a message into the SES request shape
    ///
    /// Addresses are passed through unchecked; SES does the validation.
    pub fn from_message(mail: &MailMessage) -> MailResult<Self> {
        let destination = Destination::builder()
            .set_to_addresses(Some(mail.to.clone()))
            .set_cc_addresses(Some(mail.cc.clone()))
            .build();

        let body = Body::builder()
            .html(utf8_content(mail.html_body())?)
            .text(utf8_content(&mail.text)?)
            .build();

        let message = Message::builder()
            .subject(utf8_content(&mail.subject)?)
            .body(body)
            .build();

        Ok(Self {
            source: mail.from.clone(),
            destination,
            message,
            reply_to: Vec::new(),
        })
    }
}

fn utf8_content(data: &str) -> MailResult<Content> {
    Ok(Content::builder().charset(CHARSET).data(data).build()?)
}

/// [`Mailer`] backed by Amazon SES
#[derive(Clone, Debug)]
pub struct SesMailer {
    client: AwsSesClient,
}

impl SesMailer {
    /// Create a mailer from the shared SDK configuration
    pub fn new(sdk_config: &SdkConfig) -> Self {
        Self {
            client: AwsSesClient::new(sdk_config),
        }
    }

    /// Get a reference to the underlying AWS SES client
    pub fn aws_client(&self) -> &AwsSesClient {
        &self.client
    }
}

#[async_trait]
impl Mailer for SesMailer {
    async fn send(&self, mail: &MailMessage) -> MailResult<MessageId> {
        let request = SendEmailRequest::from_message(mail)?;
        debug!(source = %request.source, recipients = mail.to.len(), "sending email");

        let output = self
            .client
            .send_email()
            .source(request.source)
            .destination(request.destination)
            .message(request.message)
            .set_reply_to_addresses(Some(request.reply_to))
            .send()
            .await
            .map_err(|e| {
                let err = MailError::from(e);
                error!(error = %err, "unable to send email");
                err
            })?;

        let id = MessageId::new(output.message_id());
        info!(message_id = %id, subject = %mail.subject, "email accepted");
        Ok(id)
    }
}
