//! The signed-in identity.
//!
//! Sign-in itself belongs to the authentication provider. Each flow takes an
//! `Option<&Session>` so that "not signed in" is a value the caller passes,
//! not ambient state.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An authenticated session as handed over by the authentication provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Opaque user identifier. Becomes the owner of every record created.
    pub uid: String,
    /// Email address of the user, if the provider exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Display name of the user, if the provider exposes one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
}

impl Session {
    /// Create a session with only a user identifier.
    #[must_use]
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            display_name: None,
        }
    }

    /// Name to greet the user with.
    #[must_use]
    pub fn label(&self) -> &str {
        self.display_name
            .as_deref()
            .or(self.email.as_deref())
            .unwrap_or(&self.uid)
    }
}

/// Unwrap an optional session or fail with [`Error::NotAuthenticated`].
///
/// # Errors
///
/// Returns `NotAuthenticated` when `session` is `None`.
pub fn require(session: Option<&Session>) -> Result<&Session> {
    session.ok_or(Error::NotAuthenticated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session() {
        let session = Session::new("u1");
        assert_eq!(session.uid, "u1");
        assert!(session.email.is_none());
    }

    #[test]
    fn test_label_prefers_display_name() {
        let mut session = Session::new("u1");
        assert_eq!(session.label(), "u1");

        session.email = Some("jane@example.com".to_string());
        assert_eq!(session.label(), "jane@example.com");

        session.display_name = Some("Jane".to_string());
        assert_eq!(session.label(), "Jane");
    }

    #[test]
    fn test_require() {
        let session = Session::new("u1");
        assert_eq!(require(Some(&session)).unwrap().uid, "u1");
        assert!(require(None).unwrap_err().is_not_authenticated());
    }

    #[test]
    fn test_serialization_skips_missing_fields() {
        let json = serde_json::to_string(&Session::new("u1")).unwrap();
        assert_eq!(json, r#"{"uid":"u1"}"#);
    }
}
