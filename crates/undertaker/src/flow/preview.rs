//! The preview flow: show the latest will and export it.

use std::path::Path;

use tracing::{error, info};

use super::Notice;
use crate::error::Error;
use crate::export::{self, EmailSender, Mailer};
use crate::render::{DateStyle, WillView};
use crate::session::Session;
use crate::storage::WillStore;

const SIGN_IN_MESSAGE: &str = "Please sign in to view your will";
const NOT_FOUND_MESSAGE: &str = "No will found. Please create one first.";
const FETCH_FAILED_MESSAGE: &str = "Failed to fetch your will";
const PDF_FAILED_MESSAGE: &str = "Failed to generate PDF";
const SEND_FAILED_MESSAGE: &str = "Failed to send email";
const SENT_MESSAGE: &str = "Email sent successfully!";

/// What the preview shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PreviewState {
    /// The caller has no will yet.
    NotFound,
    /// Loading failed.
    Error(String),
    /// The latest will, ready to show.
    Ready(WillView),
}

impl PreviewState {
    /// The message shown instead of a will, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::NotFound => Some(NOT_FOUND_MESSAGE),
            Self::Error(message) => Some(message),
            Self::Ready(_) => None,
        }
    }

    /// The loaded will, if any.
    #[must_use]
    pub fn view(&self) -> Option<&WillView> {
        match self {
            Self::Ready(view) => Some(view),
            _ => None,
        }
    }
}

/// Load the most recent will owned by `session`.
///
/// No query is made without a session.
pub async fn load_preview(
    session: Option<&Session>,
    store: &dyn WillStore,
    style: DateStyle,
) -> PreviewState {
    let Some(session) = session else {
        return PreviewState::Error(SIGN_IN_MESSAGE.to_string());
    };

    match store.latest_for_owner(&session.uid).await {
        Ok(Some(record)) => PreviewState::Ready(WillView::from_record(&record, style)),
        Ok(None) => PreviewState::NotFound,
        Err(e) => {
            error!(error = %e, user_id = %session.uid, "Error fetching will");
            PreviewState::Error(FETCH_FAILED_MESSAGE.to_string())
        }
    }
}

/// A loaded will with its export actions.
#[derive(Debug, Clone)]
pub struct PreviewPage {
    view: WillView,
    recipient: String,
    jpeg_quality: u8,
}

impl PreviewPage {
    /// Wrap a loaded view.
    #[must_use]
    pub fn new(view: WillView, jpeg_quality: u8) -> Self {
        Self {
            view,
            recipient: String::new(),
            jpeg_quality,
        }
    }

    /// The will being shown.
    #[must_use]
    pub fn view(&self) -> &WillView {
        &self.view
    }

    /// The recipient field.
    #[must_use]
    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    /// Set the recipient field.
    pub fn set_recipient(&mut self, recipient: impl Into<String>) {
        self.recipient = recipient.into();
    }

    /// Export the will and write it to `path`.
    pub async fn download(&self, path: impl AsRef<Path>) -> Notice {
        let path = path.as_ref();
        match export::download(&self.view, path, self.jpeg_quality).await {
            Ok(saved) => Notice::success(format!("Saved {}", saved.path.display())),
            Err(e) => {
                error!(error = %e, path = %path.display(), "Error generating PDF");
                Notice::error(PDF_FAILED_MESSAGE)
            }
        }
    }

    /// Email the will to the recipient field.
    ///
    /// The recipient is cleared only when the send succeeds.
    pub async fn send<M: Mailer>(&mut self, sender: &EmailSender<M>) -> Notice {
        match sender.send_will(&self.recipient, &self.view).await {
            Ok(()) => {
                info!("will emailed");
                self.recipient.clear();
                Notice::success(SENT_MESSAGE)
            }
            Err(e) if e.is_validation() || matches!(e, Error::SendInProgress) => {
                Notice::error(e.user_message())
            }
            Err(e) if e.is_export() => {
                error!(error = %e, "Error generating PDF");
                Notice::error(PDF_FAILED_MESSAGE)
            }
            Err(e) => {
                error!(error = %e, "Error sending email");
                Notice::error(SEND_FAILED_MESSAGE)
            }
        }
    }
}
