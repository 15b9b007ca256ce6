//! The capture flow: fill in a will and save it.

use chrono::Utc;
use tracing::{error, info};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::session::Session;
use crate::storage::WillStore;
use crate::will::{NewWill, WillForm};

const SIGN_IN_MESSAGE: &str = "Please sign in to save your will";
const SAVED_MESSAGE: &str = "Your will has been saved successfully";
const SAVE_FAILED_MESSAGE: &str = "Failed to save your will. Please try again.";

/// Outcome of the last submit, as shown above the form.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubmitStatus {
    /// Nothing submitted yet.
    #[default]
    Idle,
    /// The will was saved.
    Success(String),
    /// The submit failed; the fields are kept.
    Error(String),
}

impl SubmitStatus {
    /// The message to display, if any.
    #[must_use]
    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Idle => None,
            Self::Success(message) | Self::Error(message) => Some(message),
        }
    }
}

/// The will form and the state of its submission.
///
/// A request id is attached on the first valid submit and kept across
/// failed retries by the same user, so a retry after a lost response cannot
/// create a second record. Changing the fields, submitting as someone else
/// or a successful save drops it.
#[derive(Debug, Clone, Default)]
pub struct CaptureForm {
    fields: WillForm,
    status: SubmitStatus,
    pending: Option<PendingRequest>,
}

/// A request id and the user it was minted for.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingRequest {
    id: Uuid,
    uid: String,
}

impl CaptureForm {
    /// An empty form.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A form pre-filled with `fields`.
    #[must_use]
    pub fn with_fields(fields: WillForm) -> Self {
        Self {
            fields,
            ..Self::default()
        }
    }

    /// Current field values.
    #[must_use]
    pub fn fields(&self) -> &WillForm {
        &self.fields
    }

    /// Replace the field values.
    pub fn set_fields(&mut self, fields: WillForm) {
        if fields != self.fields {
            self.pending = None;
        }
        self.fields = fields;
    }

    /// Outcome of the last submit.
    #[must_use]
    pub fn status(&self) -> &SubmitStatus {
        &self.status
    }

    /// Request id that the next submit will reuse, if a previous one failed.
    #[must_use]
    pub fn pending_request(&self) -> Option<Uuid> {
        self.pending.as_ref().map(|pending| pending.id)
    }

    /// The request id for a submit by `uid`, minting a new one if there is
    /// none or it belongs to another user.
    fn request_id_for(&mut self, uid: &str) -> Uuid {
        match &self.pending {
            Some(pending) if pending.uid == uid => pending.id,
            _ => {
                let id = Uuid::new_v4();
                self.pending = Some(PendingRequest {
                    id,
                    uid: uid.to_string(),
                });
                id
            }
        }
    }

    /// Save the form as a new will owned by `session`.
    ///
    /// `&mut self` keeps a second submit from starting while this one runs.
    ///
    /// # Errors
    ///
    /// Returns `NotAuthenticated` without a session, a validation error for
    /// bad fields, or the store error. The status is updated in every case.
    pub async fn submit(&mut self, session: Option<&Session>, store: &dyn WillStore) -> Result<i64> {
        let Some(session) = session else {
            self.status = SubmitStatus::Error(SIGN_IN_MESSAGE.to_string());
            return Err(Error::NotAuthenticated);
        };

        self.status = SubmitStatus::Idle;

        if let Err(e) = self.fields.validate() {
            self.status = SubmitStatus::Error(e.user_message());
            return Err(e);
        }

        let request_id = self.request_id_for(&session.uid);
        let will = NewWill::from_form(&self.fields, session, request_id, Utc::now())?;

        match store.create(&will).await {
            Ok(id) => {
                info!(id, user_id = %session.uid, "saved will");
                self.fields.clear();
                self.pending = None;
                self.status = SubmitStatus::Success(SAVED_MESSAGE.to_string());
                Ok(id)
            }
            Err(e) => {
                error!(error = %e, "Error saving will");
                if matches!(e, Error::RequestConflict { .. }) {
                    self.pending = None;
                }
                self.status = SubmitStatus::Error(SAVE_FAILED_MESSAGE.to_string());
                Err(e)
            }
        }
    }
}
