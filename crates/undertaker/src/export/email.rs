//! Emailing the exported will.
//!
//! [`Mailer`] is the transport seam; [`EmailJsMailer`] talks to the EmailJS
//! REST API. [`EmailSender`] validates the recipient, builds the PDF and
//! refuses overlapping sends.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use email_address::EmailAddress;
use serde::Serialize;
use tracing::{debug, info};

use super::generate_pdf;
use crate::config::EmailConfig;
use crate::error::{Error, Result};
use crate::render::WillView;

/// Template parameters of a will email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    /// Recipient address.
    pub to_email: String,
    /// Sender label.
    pub from_name: String,
    /// Message body.
    pub message: String,
    /// The PDF as a base64 data URI.
    pub pdf_attachment: String,
}

/// A transactional email transport.
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Send one templated email.
    async fn send(&self, message: &EmailMessage) -> Result<()>;
}

/// Request body of the EmailJS send endpoint.
#[derive(Debug, Serialize)]
struct EmailJsRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: &'a EmailMessage,
}

/// Mailer backed by the EmailJS REST API.
#[derive(Debug)]
pub struct EmailJsMailer {
    client: reqwest::Client,
    config: EmailConfig,
}

impl EmailJsMailer {
    /// Create a mailer from configuration.
    ///
    /// Placeholder credentials are accepted here and rejected on send.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: &EmailConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self {
            client,
            config: config.clone(),
        })
    }

    fn request<'a>(&'a self, message: &'a EmailMessage) -> EmailJsRequest<'a> {
        EmailJsRequest {
            service_id: &self.config.service_id,
            template_id: &self.config.template_id,
            user_id: &self.config.user_id,
            access_token: self.config.access_token.as_deref(),
            template_params: message,
        }
    }
}

#[async_trait]
impl Mailer for EmailJsMailer {
    #[tracing::instrument(skip(self, message), fields(to = %message.to_email), err)]
    async fn send(&self, message: &EmailMessage) -> Result<()> {
        if let Some(missing) = self.config.missing_credential() {
            return Err(Error::EmailNotConfigured { missing });
        }

        debug!("posting email to {}", self.config.endpoint);
        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&self.request(message))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::EmailRejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(())
    }
}

/// Check a recipient address before any work is done.
///
/// # Errors
///
/// Returns `MissingRecipient` for blank input and `InvalidRecipient` for
/// anything that does not look like an address.
pub fn validate_recipient(address: &str) -> Result<&str> {
    let address = address.trim();
    if address.is_empty() {
        return Err(Error::MissingRecipient);
    }

    if !EmailAddress::is_valid(address) {
        return Err(Error::InvalidRecipient {
            address: address.to_string(),
        });
    }

    Ok(address)
}

/// Sends a will as a PDF attachment, one send at a time.
#[derive(Debug)]
pub struct EmailSender<M> {
    mailer: M,
    from_name: String,
    jpeg_quality: u8,
    sending: AtomicBool,
}

/// Clears the busy flag when a send finishes, however it finishes.
struct Busy<'a>(&'a AtomicBool);

impl Drop for Busy<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<M: Mailer> EmailSender<M> {
    /// Create a sender.
    #[must_use]
    pub fn new(mailer: M, from_name: impl Into<String>, jpeg_quality: u8) -> Self {
        Self {
            mailer,
            from_name: from_name.into(),
            jpeg_quality,
            sending: AtomicBool::new(false),
        }
    }

    /// Whether a send is running.
    #[must_use]
    pub fn is_sending(&self) -> bool {
        self.sending.load(Ordering::Acquire)
    }

    /// The underlying transport.
    #[must_use]
    pub fn mailer(&self) -> &M {
        &self.mailer
    }

    /// Build the PDF of `view` and mail it to `recipient`.
    ///
    /// The recipient is checked first; an invalid one never reaches the
    /// transport.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a bad recipient, `SendInProgress` if
    /// another send is running, or the export or transport failure.
    pub async fn send_will(&self, recipient: &str, view: &WillView) -> Result<()> {
        let recipient = validate_recipient(recipient)?;

        if self
            .sending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(Error::SendInProgress);
        }
        let _busy = Busy(&self.sending);

        let pdf = generate_pdf(view, self.jpeg_quality).await?;
        let message = EmailMessage {
            to_email: recipient.to_string(),
            from_name: self.from_name.clone(),
            message: format!("Digital Will for {}", view.full_name),
            pdf_attachment: pdf.to_data_uri(),
        };

        self.mailer.send(&message).await?;
        info!("Sent will PDF to {}", recipient);
        Ok(())
    }
}
