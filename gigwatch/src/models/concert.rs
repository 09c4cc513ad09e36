//! Concert model
//!
//! A [`RawConcert`] is what the AI gateway returns. Reconciliation turns it
//! into a [`Concert`] with an id and the derived favorite flag; reminders and
//! ticket state are set by the user afterwards.

use chrono::{DateTime, Utc};
use gigwatch_common::time::{self, parse_iso8601};
use gigwatch_common::{Error, Result};
use serde::{Deserialize, Serialize};

use super::band::BandKey;

/// Reminder offsets (days before the concert) a user may choose from
pub const REMINDER_DAY_OPTIONS: [u32; 4] = [1, 7, 15, 30];

/// Accept only the offsets in [`REMINDER_DAY_OPTIONS`]
pub fn validate_reminder_days(days: u32) -> Result<u32> {
    if REMINDER_DAY_OPTIONS.contains(&days) {
        Ok(days)
    } else {
        Err(Error::InvalidInput(format!(
            "Reminder must be one of {:?} days, got {}",
            REMINDER_DAY_OPTIONS, days
        )))
    }
}

/// Concert record as fetched from the AI gateway
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawConcert {
    pub band_name: String,
    /// ISO-8601 date or date-time
    pub date: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub venue: String,
    #[serde(default)]
    pub ticket_url: String,
    /// Source-supplied identifier, rarely present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// A concert in the user's result set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Concert {
    pub id: String,
    pub band_name: String,
    pub date: String,
    pub city: String,
    pub country: String,
    pub venue: String,
    pub ticket_url: String,
    /// Mirrors the matching band's flag as of the last reconciliation
    #[serde(default)]
    pub is_favorite: bool,
    #[serde(default)]
    pub reminder_days: Option<u32>,
    #[serde(default)]
    pub ticket_purchased: bool,
}

/// Identity of a concert across refreshes: band key + normalized date
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConcertIdentity {
    band: BandKey,
    date: String,
}

impl ConcertIdentity {
    pub fn new(band_name: &str, date: &str) -> Self {
        // Parsed dates compare by instant, so one moment written with two offsets matches
        let date = match parse_iso8601(date) {
            Some(instant) => instant.to_rfc3339(),
            None => date.trim().to_string(),
        };
        Self {
            band: BandKey::new(band_name),
            date,
        }
    }
}

impl RawConcert {
    pub fn band_key(&self) -> BandKey {
        BandKey::new(&self.band_name)
    }

    pub fn identity(&self) -> ConcertIdentity {
        ConcertIdentity::new(&self.band_name, &self.date)
    }

    /// Source id, if one was supplied and is not blank
    pub fn source_id(&self) -> Option<&str> {
        self.id.as_deref().map(str::trim).filter(|id| !id.is_empty())
    }
}

impl Concert {
    /// Build a concert from a fetched record
    pub fn from_raw(raw: RawConcert, id: String, is_favorite: bool) -> Self {
        Self {
            id,
            band_name: raw.band_name,
            date: raw.date,
            city: raw.city,
            country: raw.country,
            venue: raw.venue,
            ticket_url: raw.ticket_url,
            is_favorite,
            reminder_days: None,
            ticket_purchased: false,
        }
    }

    pub fn band_key(&self) -> BandKey {
        BandKey::new(&self.band_name)
    }

    pub fn identity(&self) -> ConcertIdentity {
        ConcertIdentity::new(&self.band_name, &self.date)
    }

    /// Concert start instant, `None` when the date is unparseable
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        parse_iso8601(&self.date)
    }

    /// Instant the reminder should fire (start minus offset), if any
    pub fn reminder_fire_time(&self) -> Option<DateTime<Utc>> {
        let days = self.reminder_days?;
        self.starts_at().map(|start| start - time::days(days))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn concert(date: &str, reminder_days: Option<u32>) -> Concert {
        Concert {
            id: "c1".to_string(),
            band_name: "Radiohead".to_string(),
            date: date.to_string(),
            city: "Oslo".to_string(),
            country: "Norway".to_string(),
            venue: "Spektrum".to_string(),
            ticket_url: "https://tickets.example/c1".to_string(),
            is_favorite: false,
            reminder_days,
            ticket_purchased: false,
        }
    }

    #[test]
    fn test_validate_reminder_days() {
        for days in REMINDER_DAY_OPTIONS {
            assert_eq!(validate_reminder_days(days).unwrap(), days);
        }
        assert!(matches!(validate_reminder_days(3), Err(Error::InvalidInput(_))));
        assert!(validate_reminder_days(0).is_err());
    }

    #[test]
    fn test_raw_concert_parses_original_payload_shape() {
        let json = r#"{
            "bandName": "radiohead",
            "date": "2025-06-01",
            "city": "Oslo",
            "country": "Norway",
            "venue": "X",
            "ticketUrl": "u"
        }"#;
        let raw: RawConcert = serde_json::from_str(json).unwrap();
        assert_eq!(raw.band_name, "radiohead");
        assert_eq!(raw.ticket_url, "u");
        assert_eq!(raw.id, None);
        assert_eq!(raw.source_id(), None);
    }

    #[test]
    fn test_blank_source_id_is_ignored() {
        let raw = RawConcert {
            band_name: "Low".to_string(),
            date: "2025-06-01".to_string(),
            city: String::new(),
            country: String::new(),
            venue: String::new(),
            ticket_url: String::new(),
            id: Some("  ".to_string()),
        };
        assert_eq!(raw.source_id(), None);
    }

    #[test]
    fn test_stored_concert_without_user_fields_deserializes() {
        let json = r#"{
            "id": "abc",
            "bandName": "Low",
            "date": "2025-06-01",
            "city": "Duluth",
            "country": "USA",
            "venue": "Sacred Heart",
            "ticketUrl": "u",
            "isFavorite": true
        }"#;
        let concert: Concert = serde_json::from_str(json).unwrap();
        assert_eq!(concert.reminder_days, None);
        assert!(!concert.ticket_purchased);
    }

    #[test]
    fn test_identity_compares_instants_and_band_keys() {
        let a = ConcertIdentity::new("Radiohead", "2025-06-01T20:00:00Z");
        let b = ConcertIdentity::new(" radiohead", "2025-06-01T22:00:00+02:00");
        assert_eq!(a, b);

        let c = ConcertIdentity::new("Radiohead", "2025-06-02T20:00:00Z");
        assert_ne!(a, c);
    }

    #[test]
    fn test_reminder_fire_time() {
        let c = concert("2025-06-11T00:00:00Z", Some(7));
        assert_eq!(
            c.reminder_fire_time(),
            Some(Utc.with_ymd_and_hms(2025, 6, 4, 0, 0, 0).unwrap())
        );

        assert_eq!(concert("2025-06-11", None).reminder_fire_time(), None);
        assert_eq!(concert("soon", Some(7)).reminder_fire_time(), None);
    }
}
