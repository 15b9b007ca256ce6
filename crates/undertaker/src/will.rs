//! Core will types for undertaker.
//!
//! A [`WillForm`] is what the user types. Once validated and stamped with a
//! session it becomes a [`NewWill`], and the store hands back a
//! [`WillRecord`] with its assigned id.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::session::Session;

/// Format of the date of birth as entered and as stored.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Raw form input, exactly as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WillForm {
    /// Full legal name.
    pub full_name: String,
    /// Date of birth, `YYYY-MM-DD`.
    pub date_of_birth: String,
    /// The final message.
    pub message: String,
}

impl WillForm {
    /// Create a form from the three inputs.
    #[must_use]
    pub fn new(
        full_name: impl Into<String>,
        date_of_birth: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            date_of_birth: date_of_birth.into(),
            message: message.into(),
        }
    }

    /// Apply the required-field check and parse the date of birth.
    ///
    /// Name and message are kept verbatim; only whitespace-only input is
    /// rejected.
    ///
    /// # Errors
    ///
    /// Returns `MissingField` for the first empty field, or `InvalidDate`
    /// if the date of birth is not `YYYY-MM-DD`.
    pub fn validate(&self) -> Result<NaiveDate> {
        if self.full_name.trim().is_empty() {
            return Err(Error::MissingField { field: "full name" });
        }
        if self.date_of_birth.trim().is_empty() {
            return Err(Error::MissingField {
                field: "date of birth",
            });
        }
        if self.message.trim().is_empty() {
            return Err(Error::MissingField { field: "message" });
        }

        NaiveDate::parse_from_str(self.date_of_birth.trim(), DATE_FORMAT).map_err(|_| {
            Error::InvalidDate {
                value: self.date_of_birth.clone(),
            }
        })
    }

    /// Whether every field is empty.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.full_name.is_empty() && self.date_of_birth.is_empty() && self.message.is_empty()
    }

    /// Reset every field.
    pub fn clear(&mut self) {
        self.full_name.clear();
        self.date_of_birth.clear();
        self.message.clear();
    }
}

/// A will ready to be written to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWill {
    /// Client-generated idempotency token.
    pub request_id: Uuid,
    /// Full legal name.
    pub full_name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// The final message.
    pub message: String,
    /// Owner, taken from the session.
    pub user_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time. Equal to `created_at`; wills are never updated.
    pub updated_at: DateTime<Utc>,
}

impl NewWill {
    /// Validate `form` and stamp it with the session owner and `now`.
    ///
    /// # Errors
    ///
    /// Returns the validation error from [`WillForm::validate`].
    pub fn from_form(
        form: &WillForm,
        session: &Session,
        request_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self> {
        let date_of_birth = form.validate()?;
        Ok(Self {
            request_id,
            full_name: form.full_name.clone(),
            date_of_birth,
            message: form.message.clone(),
            user_id: session.uid.clone(),
            created_at: now,
            updated_at: now,
        })
    }
}

/// A persisted will.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WillRecord {
    /// Identifier assigned by the store.
    pub id: i64,
    /// Idempotency token it was created with.
    pub request_id: Uuid,
    /// Full legal name.
    pub full_name: String,
    /// Date of birth.
    pub date_of_birth: NaiveDate,
    /// The final message.
    pub message: String,
    /// Owner identifier.
    pub user_id: String,
    /// Creation time.
    pub created_at: DateTime<Utc>,
    /// Last update time.
    pub updated_at: DateTime<Utc>,
}

impl WillRecord {
    /// Attach a store id to a new will.
    #[must_use]
    pub fn from_new(id: i64, will: NewWill) -> Self {
        Self {
            id,
            request_id: will.request_id,
            full_name: will.full_name,
            date_of_birth: will.date_of_birth,
            message: will.message,
            user_id: will.user_id,
            created_at: will.created_at,
            updated_at: will.updated_at,
        }
    }

    /// Check whether `uid` owns this will.
    #[must_use]
    pub fn is_owned_by(&self, uid: &str) -> bool {
        self.user_id == uid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn jane() -> WillForm {
        WillForm::new("Jane Doe", "1990-01-01", "Take care of the cat.")
    }

    #[test]
    fn test_validate_ok() {
        let date = jane().validate().unwrap();
        assert_eq!(date, NaiveDate::from_ymd_opt(1990, 1, 1).unwrap());
    }

    #[test]
    fn test_validate_reports_first_missing_field() {
        let form = WillForm::new("", "", "");
        assert!(matches!(
            form.validate(),
            Err(Error::MissingField { field: "full name" })
        ));

        let form = WillForm::new("Jane", "1990-01-01", "   \n");
        assert!(matches!(
            form.validate(),
            Err(Error::MissingField { field: "message" })
        ));
    }

    #[test]
    fn test_validate_invalid_date() {
        let form = WillForm::new("Jane", "01/01/1990", "Bye");
        assert!(matches!(form.validate(), Err(Error::InvalidDate { .. })));

        let form = WillForm::new("Jane", "1990-02-30", "Bye");
        assert!(matches!(form.validate(), Err(Error::InvalidDate { .. })));
    }

    #[test]
    fn test_clear() {
        let mut form = jane();
        assert!(!form.is_blank());
        form.clear();
        assert!(form.is_blank());
    }

    #[test]
    fn test_new_will_from_form() {
        let now = Utc::now();
        let request_id = Uuid::new_v4();
        let will = NewWill::from_form(&jane(), &Session::new("u1"), request_id, now).unwrap();

        assert_eq!(will.user_id, "u1");
        assert_eq!(will.full_name, "Jane Doe");
        assert_eq!(will.message, "Take care of the cat.");
        assert_eq!(will.request_id, request_id);
        assert_eq!(will.created_at, now);
        assert_eq!(will.updated_at, now);
    }

    #[test]
    fn test_new_will_keeps_text_verbatim() {
        let form = WillForm::new("  Jane  Doe ", "1990-01-01", "line one\n\n  line two ");
        let will = NewWill::from_form(&form, &Session::new("u1"), Uuid::new_v4(), Utc::now())
            .unwrap();

        assert_eq!(will.full_name, "  Jane  Doe ");
        assert_eq!(will.message, "line one\n\n  line two ");
    }

    #[test]
    fn test_record_serializes_camel_case() {
        let will =
            NewWill::from_form(&jane(), &Session::new("u1"), Uuid::new_v4(), Utc::now()).unwrap();
        let record = WillRecord::from_new(7, will);
        let json = serde_json::to_string(&record).unwrap();

        assert!(json.contains(r#""fullName":"Jane Doe""#));
        assert!(json.contains(r#""dateOfBirth":"1990-01-01""#));
        assert!(json.contains(r#""userId":"u1""#));
        assert!(json.contains("createdAt"));
        assert!(record.is_owned_by("u1"));
        assert!(!record.is_owned_by("u2"));
    }
}
