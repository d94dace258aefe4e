use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::errors::{FieldErrors, ModelError};
use crate::resource::Resource;
use crate::validation::{decode, optional_positive_int, optional_text, require_text, Fields};

pub const DEFAULT_STATUS: &str = "confirmed";

/// Travel booking. Dates are opaque strings; only their presence is checked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Booking {
    pub destination: String,
    pub traveler_name: String,
    pub start_date: String,
    pub end_date: String,
    #[serde(default = "default_travelers")]
    pub num_travelers: u32,
    #[serde(default = "default_status")]
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(flatten)]
    pub extra: Fields,
}

fn default_travelers() -> u32 { 1 }
fn default_status() -> String { DEFAULT_STATUS.to_string() }

impl Resource for Booking {
    const COLLECTION: &'static str = "bookings";
    const LABEL: &'static str = "Booking";
    const READ_ONLY: &'static [&'static str] = &["created_at", "updated_at"];

    fn validate(fields: Fields) -> Result<Self, ModelError> {
        let mut errors = FieldErrors::new();
        for field in ["destination", "traveler_name", "start_date", "end_date"] {
            require_text(&fields, field, &mut errors);
        }
        optional_positive_int(&fields, "num_travelers", &mut errors);
        optional_text(&fields, "status", &mut errors);
        decode(fields, errors)
    }

    fn on_create(&mut self, now: DateTime<Utc>) {
        self.created_at = Some(now);
        self.updated_at = Some(now);
    }

    fn on_update(&mut self, now: DateTime<Utc>) {
        self.updated_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn paris() -> Fields {
        json!({
            "destination": "Paris",
            "traveler_name": "Ada",
            "start_date": "2025-06-01",
            "end_date": "2025-06-04"
        })
        .as_object()
        .cloned()
        .unwrap_or_default()
    }

    #[test]
    fn applies_defaults() {
        let b = Booking::validate(paris()).unwrap();
        assert_eq!(b.num_travelers, 1);
        assert_eq!(b.status, DEFAULT_STATUS);
        assert!(b.created_at.is_none());
    }

    #[test]
    fn reports_every_missing_field() {
        let mut f = paris();
        f.remove("destination");
        f.remove("end_date");
        match Booking::validate(f) {
            Err(ModelError::Validation(e)) => {
                assert_eq!(e.len(), 2);
                assert!(e.contains_field("destination"));
                assert!(e.contains_field("end_date"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn dates_are_not_compared() {
        let mut f = paris();
        f.insert("end_date".into(), json!("2020-01-01"));
        assert!(Booking::validate(f).is_ok());
    }

    #[test]
    fn timestamps_follow_lifecycle_hooks() {
        let mut b = Booking::validate(paris()).unwrap();
        let t0 = Utc::now();
        b.on_create(t0);
        assert_eq!(b.created_at, Some(t0));
        let t1 = t0 + chrono::Duration::seconds(5);
        b.on_update(t1);
        assert_eq!(b.created_at, Some(t0));
        assert_eq!(b.updated_at, Some(t1));
    }
}
