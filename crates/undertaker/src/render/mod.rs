//! Rendering a will for display and export.
//!
//! [`WillView`] is the read-only, display-formatted form of a record. The
//! [`layout`] module places it on a page and [`raster`] paints that page
//! into pixels.

pub mod layout;
pub mod raster;

use chrono::{DateTime, Local, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};

use crate::will::WillRecord;

/// How dates are shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DateStyle {
    /// `1/1/1990` and `1/1/2024, 9:05:00 AM`.
    #[default]
    Us,
    /// `1990-01-01` and `2024-01-01 09:05:00`.
    Iso,
    /// `January 1, 1990` and `January 1, 2024 at 9:05 AM`.
    Long,
}

impl DateStyle {
    /// Format a calendar date.
    ///
    /// Dates of birth carry no time zone and are never shifted.
    #[must_use]
    pub fn format_date(self, date: NaiveDate) -> String {
        match self {
            Self::Us => date.format("%-m/%-d/%Y").to_string(),
            Self::Iso => date.format("%Y-%m-%d").to_string(),
            Self::Long => date.format("%B %-d, %Y").to_string(),
        }
    }

    /// Format an instant in the time zone it is expressed in.
    #[must_use]
    pub fn format_datetime<Tz>(self, ts: &DateTime<Tz>) -> String
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        match self {
            Self::Us => ts.format("%-m/%-d/%Y, %-I:%M:%S %p").to_string(),
            Self::Iso => ts.format("%Y-%m-%d %H:%M:%S").to_string(),
            Self::Long => ts.format("%B %-d, %Y at %-I:%M %p").to_string(),
        }
    }
}

/// A will as it is shown: text fields verbatim, dates formatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WillView {
    /// Full name, verbatim.
    pub full_name: String,
    /// Formatted date of birth.
    pub date_of_birth: String,
    /// Final message, verbatim.
    pub message: String,
    /// Formatted creation time in local time.
    pub created_on: String,
}

impl WillView {
    /// Build the view of a record, showing the creation time in local time.
    #[must_use]
    pub fn from_record(record: &WillRecord, style: DateStyle) -> Self {
        Self::from_record_in(record, style, &Local)
    }

    /// Build the view of a record, showing the creation time in `tz`.
    #[must_use]
    pub fn from_record_in<Tz>(record: &WillRecord, style: DateStyle, tz: &Tz) -> Self
    where
        Tz: TimeZone,
        Tz::Offset: std::fmt::Display,
    {
        Self {
            full_name: record.full_name.clone(),
            date_of_birth: style.format_date(record.date_of_birth),
            message: record.message.clone(),
            created_on: style.format_datetime(&record.created_at.with_timezone(tz)),
        }
    }

    /// Plain-text rendering used by the terminal preview.
    #[must_use]
    pub fn to_plain_text(&self) -> String {
        format!(
            "Digital Will Preview\n\
             ====================\n\n\
             Personal Information\n\
             Full Name:     {}\n\
             Date of Birth: {}\n\n\
             Final Message\n\
             {}\n\n\
             Created on: {}\n",
            self.full_name, self.date_of_birth, self.message, self.created_on
        )
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    use super::*;

    fn record() -> WillRecord {
        let created = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        WillRecord {
            id: 1,
            request_id: Uuid::new_v4(),
            full_name: "Jane Doe".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 1, 1).unwrap(),
            message: "Take care of the cat.".to_string(),
            user_id: "u1".to_string(),
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn test_format_date_styles() {
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
        assert_eq!(DateStyle::Us.format_date(date), "1/1/1990");
        assert_eq!(DateStyle::Iso.format_date(date), "1990-01-01");
        assert_eq!(DateStyle::Long.format_date(date), "January 1, 1990");
    }

    #[test]
    fn test_format_datetime_styles() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap();
        assert_eq!(DateStyle::Us.format_datetime(&ts), "3/5/2024, 2:07:09 PM");
        assert_eq!(DateStyle::Iso.format_datetime(&ts), "2024-03-05 14:07:09");
        assert_eq!(
            DateStyle::Long.format_datetime(&ts),
            "March 5, 2024 at 2:07 PM"
        );
    }

    #[test]
    fn test_view_keeps_text_verbatim() {
        let view = WillView::from_record_in(&record(), DateStyle::Us, &Utc);

        assert_eq!(view.full_name, "Jane Doe");
        assert_eq!(view.message, "Take care of the cat.");
        assert_eq!(view.date_of_birth, "1/1/1990");
        assert_eq!(view.created_on, "3/5/2024, 2:07:09 PM");
    }

    #[test]
    fn test_date_of_birth_not_shifted_by_local_zone() {
        let view = WillView::from_record(&record(), DateStyle::Iso);
        assert_eq!(view.date_of_birth, "1990-01-01");
    }

    #[test]
    fn test_plain_text() {
        let text = WillView::from_record_in(&record(), DateStyle::Us, &Utc).to_plain_text();
        assert!(text.contains("Full Name:     Jane Doe"));
        assert!(text.contains("Date of Birth: 1/1/1990"));
        assert!(text.contains("Take care of the cat."));
        assert!(text.contains("Created on: 3/5/2024"));
    }

    #[test]
    fn test_date_style_serde() {
        let style: DateStyle = serde_json::from_str(r#""long""#).unwrap();
        assert_eq!(style, DateStyle::Long);
        assert_eq!(serde_json::to_string(&DateStyle::Us).unwrap(), r#""us""#);
    }
}
