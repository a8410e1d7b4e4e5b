//! Slot and busy-interval types used by availability

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Resolve a studio-local wall-clock time to an instant.
///
/// Ambiguous times (DST fall-back) take the earlier instant; times inside a
/// DST gap are shifted forward by the gap.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> DateTime<Utc> {
    match tz.from_local_datetime(&local).earliest() {
        Some(dt) => dt.with_timezone(&Utc),
        None => tz
            .from_local_datetime(&(local + Duration::hours(1)))
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|| local.and_utc()),
    }
}

/// Time range already occupied, from the calendar or a vacation block.
/// Half-open: `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusyInterval {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl BusyInterval {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Widen the interval by `buffer` on both sides
    pub fn padded(&self, buffer: Duration) -> Self {
        Self {
            start: self.start - buffer,
            end: self.end + buffer,
        }
    }

    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        start < self.end && end > self.start
    }
}

/// A bookable session slot
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TimeSlot {
    #[serde(rename = "startISO")]
    pub start_iso: DateTime<Utc>,
    #[serde(rename = "endISO")]
    pub end_iso: DateTime<Utc>,
    /// Human readable start in studio-local time, e.g. `Mon, Jan 13, 09:00`
    pub label: String,
}

#[derive(Debug, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct AvailabilityQuery {
    /// Number of days to look ahead, starting tomorrow
    pub days: Option<i64>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AvailabilityResponse {
    pub slots: Vec<TimeSlot>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 7, h, m, 0).unwrap()
    }

    #[test]
    fn test_overlap_is_half_open() {
        let busy = BusyInterval::new(at(10, 0), at(12, 0));
        assert!(busy.overlaps(at(11, 0), at(13, 0)));
        assert!(!busy.overlaps(at(12, 0), at(14, 0)));
        assert!(!busy.overlaps(at(8, 0), at(10, 0)));
    }

    #[test]
    fn test_padding_widens_both_sides() {
        let busy = BusyInterval::new(at(10, 0), at(12, 0)).padded(Duration::minutes(60));
        assert_eq!(busy.start, at(9, 0));
        assert_eq!(busy.end, at(13, 0));
    }

    #[test]
    fn test_slot_serializes_iso_field_names() {
        let slot = TimeSlot {
            start_iso: at(9, 0),
            end_iso: at(11, 0),
            label: "Mon, Jan 07, 09:00".to_string(),
        };
        let json = serde_json::to_value(&slot).unwrap();
        assert_eq!(json["startISO"], "2030-01-07T09:00:00Z");
        assert_eq!(json["endISO"], "2030-01-07T11:00:00Z");
    }

    #[test]
    fn test_local_to_utc_applies_offset() {
        let local = NaiveDate::from_ymd_opt(2030, 1, 7)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        // Kyiv is UTC+2 in winter
        assert_eq!(local_to_utc(chrono_tz::Europe::Kyiv, local), at(7, 0));
        assert_eq!(local_to_utc(chrono_tz::UTC, local), at(9, 0));
    }
}
