//! Error types for undertaker.
//!
//! Every failure in the crate is an [`Error`]. Callers that talk to a person
//! should show [`Error::user_message`] and log the full error, since the
//! detailed cause is not meant for the end user.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for undertaker operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Session Errors ===
    /// The action needs a signed-in session and none was supplied.
    #[error("not signed in")]
    NotAuthenticated,

    // === Input Errors ===
    /// A required form field was empty.
    #[error("required field '{field}' is empty")]
    MissingField {
        /// Name of the empty field.
        field: &'static str,
    },

    /// The date of birth could not be parsed as `YYYY-MM-DD`.
    #[error("invalid date of birth '{value}'")]
    InvalidDate {
        /// The rejected input.
        value: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A request id was reused by a different owner.
    #[error("request {request_id} is already stored for another owner")]
    RequestConflict {
        /// The conflicting request id.
        request_id: uuid::Uuid,
    },

    /// A stored row could not be decoded into a will record.
    #[error("corrupt will record {id}: {message}")]
    CorruptRecord {
        /// Row id of the record.
        id: i64,
        /// Description of what went wrong.
        message: String,
    },

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === Export Errors ===
    /// Rendering, rasterizing or encoding the document failed.
    #[error("export failed during {stage}: {message}")]
    Export {
        /// The stage that failed.
        stage: &'static str,
        /// Description of what went wrong.
        message: String,
    },

    /// JPEG encoding failed.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    // === Email Errors ===
    /// No recipient address was given.
    #[error("recipient address is empty")]
    MissingRecipient,

    /// The recipient address is not a valid email address.
    #[error("invalid recipient address '{address}'")]
    InvalidRecipient {
        /// The rejected address.
        address: String,
    },

    /// A send was attempted while a previous one was still running.
    #[error("an email is already being sent")]
    SendInProgress,

    /// Email credentials are missing or still placeholders.
    #[error("email provider is not configured: {missing} is not set")]
    EmailNotConfigured {
        /// Name of the missing setting.
        missing: &'static str,
    },

    /// The email provider rejected the request.
    #[error("email provider returned {status}: {body}")]
    EmailRejected {
        /// HTTP status code.
        status: u16,
        /// Response body.
        body: String,
    },

    /// The HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Generic Errors ===
    /// An internal error occurred (bug).
    #[error("internal error: {0}")]
    Internal(String),
}

/// A specialized Result type for undertaker operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a new export error for the given stage.
    #[must_use]
    pub fn export(stage: &'static str, message: impl Into<String>) -> Self {
        Self::Export {
            stage,
            message: message.into(),
        }
    }

    /// Create a new internal error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Check if this error means the caller has no session.
    #[must_use]
    pub fn is_not_authenticated(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
    }

    /// Check if this error came from the store or the email transport.
    #[must_use]
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::CorruptRecord { .. }
                | Self::RequestConflict { .. }
                | Self::EmailRejected { .. }
                | Self::Http(_)
        )
    }

    /// Check if this error came from building the PDF.
    #[must_use]
    pub fn is_export(&self) -> bool {
        matches!(self, Self::Export { .. } | Self::Image(_))
    }

    /// Check if this error is a rejected user input.
    #[must_use]
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::MissingField { .. }
                | Self::InvalidDate { .. }
                | Self::MissingRecipient
                | Self::InvalidRecipient { .. }
        )
    }

    /// The message shown to the user.
    ///
    /// Remote and export failures are deliberately collapsed into a few
    /// generic messages; the cause only goes to the log.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Please sign in to continue".to_string(),
            Self::MissingField { field } => format!("Please fill out the {field} field"),
            Self::InvalidDate { .. } => "Please enter a valid date of birth".to_string(),
            Self::MissingRecipient => "Please enter an email address".to_string(),
            Self::InvalidRecipient { .. } => "Please enter a valid email address".to_string(),
            Self::SendInProgress => "An email is already being sent".to_string(),
            Self::Export { .. } | Self::Image(_) => "Failed to generate PDF".to_string(),
            Self::EmailNotConfigured { .. } | Self::EmailRejected { .. } | Self::Http(_) => {
                "Failed to send email".to_string()
            }
            Self::ConfigLoad(_) | Self::ConfigValidation { .. } => {
                "The application is misconfigured".to_string()
            }
            _ => "Something went wrong. Please try again.".to_string(),
        }
    }
}
