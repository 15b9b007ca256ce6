//! User-facing flows.
//!
//! Each flow takes the session explicitly, performs one awaited operation
//! and turns the outcome into a status the caller can show. The user only
//! sees generic messages; the cause is logged.

pub mod capture;
pub mod preview;

use std::fmt;

pub use capture::{CaptureForm, SubmitStatus};
pub use preview::{load_preview, PreviewPage, PreviewState};

/// Kind of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    /// The action succeeded.
    Success,
    /// The action failed.
    Error,
}

/// A transient notification shown after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Success or failure.
    pub level: NoticeLevel,
    /// Text shown to the user.
    pub message: String,
}

impl Notice {
    /// A success notice.
    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    /// An error notice.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Whether this notice reports a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.level == NoticeLevel::Error
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notice() {
        let ok = Notice::success("Email sent successfully!");
        assert!(!ok.is_error());
        assert_eq!(ok.to_string(), "Email sent successfully!");

        assert!(Notice::error("Failed to send email").is_error());
    }
}
