//! Slot generator
//!
//! Pure function from working hours, busy intervals and block/buffer rules to
//! the ordered list of bookable slots. It has no notion of "today"; the caller
//! bounds the range.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike, Utc, Weekday};
use chrono_tz::Tz;

use crate::models::{
    slot::{local_to_utc, BusyInterval, TimeSlot},
    WorkingHours,
};

/// Label format for slots, e.g. `Mon, Jan 13, 09:00`
const LABEL_FORMAT: &str = "%a, %b %d, %H:%M";

/// Rules applied to every candidate slot
#[derive(Debug, Clone, Copy)]
pub struct SlotRules {
    pub working_hours: WorkingHours,
    /// Calendar time blocked per session; not the advertised session length
    pub block_minutes: i64,
    pub buffer_minutes: i64,
    pub tz: Tz,
}

/// Generate free slots for every weekday in `[range_start, range_end)`
pub fn generate(
    range_start: NaiveDate,
    range_end: NaiveDate,
    busy: &[BusyInterval],
    rules: &SlotRules,
) -> Vec<TimeSlot> {
    let hours = rules.working_hours;
    if hours.start >= hours.end || rules.block_minutes <= 0 || range_start >= range_end {
        return Vec::new();
    }

    let block = Duration::minutes(rules.block_minutes);
    let buffer = Duration::minutes(rules.buffer_minutes.max(0));
    let padded: Vec<BusyInterval> = busy.iter().map(|b| b.padded(buffer)).collect();

    let mut slots = Vec::new();
    for day in range_start.iter_days().take_while(|d| *d < range_end) {
        if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            continue;
        }

        let close = local_to_utc(rules.tz, at_hour(day, hours.end));
        for hour in hours.start..hours.end {
            let local_start = at_hour(day, hour);
            let start = local_to_utc(rules.tz, local_start);
            let end = start + block;
            // Later candidates end even later
            if end > close {
                break;
            }
            if padded.iter().any(|b| b.overlaps(start, end)) {
                continue;
            }
            slots.push(TimeSlot {
                start_iso: start,
                end_iso: end,
                label: local_start.format(LABEL_FORMAT).to_string(),
            });
        }
    }
    slots
}

/// Whether `start` is a start time `generate` could emit for these hours,
/// ignoring busy time
pub fn is_slot_start(start: DateTime<Utc>, hours: WorkingHours, block_minutes: i64, tz: Tz) -> bool {
    if hours.start >= hours.end || block_minutes <= 0 {
        return false;
    }
    let local = start.with_timezone(&tz);
    let day = local.date_naive();
    if matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
        return false;
    }
    let hour = local.hour();
    if hour < hours.start || hour >= hours.end {
        return false;
    }
    let close = local_to_utc(tz, at_hour(day, hours.end));
    local_to_utc(tz, at_hour(day, hour)) == start && start + Duration::minutes(block_minutes) <= close
}

fn at_hour(day: NaiveDate, hour: u32) -> NaiveDateTime {
    day.and_time(NaiveTime::MIN) + Duration::hours(i64::from(hour))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::Europe::Kyiv;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn rules(tz: Tz) -> SlotRules {
        SlotRules {
            working_hours: WorkingHours { start: 9, end: 15 },
            block_minutes: 120,
            buffer_minutes: 60,
            tz,
        }
    }

    fn start_hours(slots: &[TimeSlot]) -> Vec<u32> {
        slots.iter().map(|s| s.start_iso.hour()).collect()
    }

    #[test]
    fn test_empty_calendar_fills_window() {
        // Monday, 09..15 with a 2h block: 9, 10, 11, 12, 13
        let slots = generate(date(2030, 1, 7), date(2030, 1, 8), &[], &rules(chrono_tz::UTC));
        assert_eq!(start_hours(&slots), vec![9, 10, 11, 12, 13]);
        assert_eq!(slots[0].label, "Mon, Jan 07, 09:00");
        assert!(slots.iter().all(|s| s.end_iso - s.start_iso == Duration::minutes(120)));
    }

    #[test]
    fn test_busy_interval_with_buffer() {
        // Busy 10:00-12:00, buffer 60: 09:00 overlaps the padded start,
        // 13:00 is the first free slot, 14:00 would close at 16:00
        let busy = [BusyInterval::new(utc(2030, 1, 7, 10), utc(2030, 1, 7, 12))];
        let slots = generate(date(2030, 1, 7), date(2030, 1, 8), &busy, &rules(chrono_tz::UTC));
        assert_eq!(start_hours(&slots), vec![13]);
    }

    #[test]
    fn test_range_starting_saturday_begins_monday() {
        let slots = generate(date(2030, 1, 5), date(2030, 1, 26), &[], &rules(chrono_tz::UTC));
        let first = slots.first().expect("weekday slots exist");
        assert_eq!(first.start_iso, utc(2030, 1, 7, 9));
        assert!(slots
            .iter()
            .all(|s| s.start_iso.date_naive() != date(2030, 1, 5)));
    }

    #[test]
    fn test_vacation_days_yield_no_slots() {
        // Fri 2025-01-10 .. Sun 2025-01-12 blocked; Monday stays open
        let vacation = BusyInterval::new(
            Kyiv.with_ymd_and_hms(2025, 1, 10, 0, 0, 0).unwrap().with_timezone(&Utc),
            Kyiv.with_ymd_and_hms(2025, 1, 13, 0, 0, 0).unwrap().with_timezone(&Utc),
        );
        let slots = generate(date(2025, 1, 10), date(2025, 1, 14), &[vacation], &rules(Kyiv));
        assert!(slots
            .iter()
            .all(|s| s.start_iso.with_timezone(&Kyiv).date_naive() == date(2025, 1, 13)));
        assert_eq!(slots.len(), 5);
    }

    #[test]
    fn test_deterministic() {
        let busy = [BusyInterval::new(utc(2030, 1, 8, 7), utc(2030, 1, 8, 9))];
        let a = generate(date(2030, 1, 7), date(2030, 1, 21), &busy, &rules(Kyiv));
        let b = generate(date(2030, 1, 7), date(2030, 1, 21), &busy, &rules(Kyiv));
        assert_eq!(a, b);
    }

    #[test]
    fn test_slots_within_window_and_never_weekend() {
        let r = rules(Kyiv);
        let slots = generate(date(2030, 3, 1), date(2030, 4, 15), &[], &r);
        assert!(!slots.is_empty());
        for slot in &slots {
            let local_start = slot.start_iso.with_timezone(&Kyiv);
            let local_end = slot.end_iso.with_timezone(&Kyiv);
            assert!(local_start.hour() >= r.working_hours.start);
            assert_eq!(local_start.date_naive(), local_end.date_naive());
            assert!(local_end.hour() * 60 + local_end.minute() <= r.working_hours.end * 60);
            assert!(!matches!(local_start.weekday(), Weekday::Sat | Weekday::Sun));
        }
    }

    #[test]
    fn test_no_slot_overlaps_padded_busy() {
        let r = rules(chrono_tz::UTC);
        let busy = [
            BusyInterval::new(utc(2030, 1, 7, 12), utc(2030, 1, 7, 13)),
            BusyInterval::new(utc(2030, 1, 8, 8), utc(2030, 1, 8, 10)),
            BusyInterval::new(utc(2030, 1, 9, 14), utc(2030, 1, 10, 9)),
        ];
        let slots = generate(date(2030, 1, 7), date(2030, 1, 12), &busy, &r);
        assert!(!slots.is_empty());
        let buffer = Duration::minutes(r.buffer_minutes);
        for slot in &slots {
            for b in &busy {
                assert!(!b.padded(buffer).overlaps(slot.start_iso, slot.end_iso));
            }
        }
    }

    #[test]
    fn test_inverted_hours_yield_nothing() {
        let mut r = rules(chrono_tz::UTC);
        r.working_hours = WorkingHours { start: 15, end: 9 };
        assert!(generate(date(2030, 1, 7), date(2030, 1, 14), &[], &r).is_empty());
    }

    #[test]
    fn test_block_longer_than_window_yields_nothing() {
        let mut r = rules(chrono_tz::UTC);
        r.block_minutes = 7 * 60;
        assert!(generate(date(2030, 1, 7), date(2030, 1, 14), &[], &r).is_empty());
    }

    #[test]
    fn test_generated_starts_are_slot_starts() {
        let r = rules(Kyiv);
        let slots = generate(date(2025, 1, 13), date(2025, 1, 18), &[], &r);
        assert!(!slots.is_empty());
        for slot in &slots {
            assert!(is_slot_start(slot.start_iso, r.working_hours, r.block_minutes, Kyiv));
        }
    }

    #[test]
    fn test_off_schedule_starts_rejected() {
        let hours = WorkingHours { start: 9, end: 15 };
        let tz = chrono_tz::UTC;
        assert!(is_slot_start(utc(2025, 1, 13, 13), hours, 120, tz));
        // Saturday
        assert!(!is_slot_start(utc(2025, 1, 11, 9), hours, 120, tz));
        assert!(!is_slot_start(utc(2025, 1, 13, 8), hours, 120, tz));
        // 14:00 + 120 min passes closing
        assert!(!is_slot_start(utc(2025, 1, 13, 14), hours, 120, tz));
        let half_past = Utc.with_ymd_and_hms(2025, 1, 13, 10, 30, 0).unwrap();
        assert!(!is_slot_start(half_past, hours, 120, tz));
        let with_seconds = Utc.with_ymd_and_hms(2025, 1, 13, 10, 0, 5).unwrap();
        assert!(!is_slot_start(with_seconds, hours, 120, tz));
    }
}
