//! Conversions between merchant wall-clock time and stored UTC instants.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Zone used when a merchant has no valid IANA time zone configured.
pub const DEFAULT_TIMEZONE: Tz = chrono_tz::Australia::Sydney;

/// Longest daylight-saving gap we step over when resolving a local time.
const MAX_GAP_MINUTES: i64 = 180;

/// Parse an IANA zone name, returning `None` for unknown names.
pub fn parse_timezone(name: &str) -> Option<Tz> {
    name.trim().parse::<Tz>().ok()
}

/// Convert a local wall-clock time in `tz` to a naive UTC timestamp.
///
/// Ambiguous times (clocks going back) resolve to the earliest instant. Times
/// inside a daylight-saving gap resolve to the first valid instant after them.
pub fn local_to_utc(tz: Tz, local: NaiveDateTime) -> NaiveDateTime {
    let mut candidate = local;
    for _ in 0..=MAX_GAP_MINUTES {
        if let Some(resolved) = tz.from_local_datetime(&candidate).earliest() {
            return resolved.naive_utc();
        }
        candidate += Duration::minutes(1);
    }
    log::warn!("Could not resolve local time {local} in {tz}; treating it as UTC");
    local
}

/// Convert a naive UTC timestamp to wall-clock time in `tz`.
pub fn utc_to_local(tz: Tz, utc: NaiveDateTime) -> NaiveDateTime {
    tz.from_utc_datetime(&utc).naive_local()
}

/// UTC instant of `time` on the local `date`.
pub fn local_date_time_to_utc(tz: Tz, date: NaiveDate, time: NaiveTime) -> NaiveDateTime {
    local_to_utc(tz, date.and_time(time))
}

/// UTC bounds `[start, end)` of the local calendar day `date`.
pub fn local_day_bounds(tz: Tz, date: NaiveDate) -> (NaiveDateTime, NaiveDateTime) {
    let start = local_to_utc(tz, date.and_time(NaiveTime::MIN));
    let next = date.succ_opt().unwrap_or(date);
    let end = local_to_utc(tz, next.and_time(NaiveTime::MIN));
    (start, end)
}

/// Local calendar date of a UTC instant.
pub fn local_date(tz: Tz, utc: NaiveDateTime) -> NaiveDate {
    utc_to_local(tz, utc).date()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn datetime(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .and_then(|date| date.and_hms_opt(h, min, 0))
            .expect("valid datetime")
    }

    #[test]
    fn converts_standard_time_in_sydney() {
        // AEST is UTC+10 in June.
        let utc = local_to_utc(DEFAULT_TIMEZONE, datetime(2025, 6, 2, 9, 0));
        assert_eq!(utc, datetime(2025, 6, 1, 23, 0));
        assert_eq!(utc_to_local(DEFAULT_TIMEZONE, utc), datetime(2025, 6, 2, 9, 0));
    }

    #[test]
    fn converts_daylight_time_in_sydney() {
        // AEDT is UTC+11 in January.
        let utc = local_to_utc(DEFAULT_TIMEZONE, datetime(2025, 1, 15, 10, 30));
        assert_eq!(utc, datetime(2025, 1, 14, 23, 30));
    }

    #[test]
    fn gap_resolves_to_first_valid_instant() {
        // Clocks jump from 02:00 to 03:00 on 2025-10-05 in Sydney.
        let utc = local_to_utc(DEFAULT_TIMEZONE, datetime(2025, 10, 5, 2, 30));
        assert_eq!(utc_to_local(DEFAULT_TIMEZONE, utc), datetime(2025, 10, 5, 3, 0));
    }

    #[test]
    fn ambiguous_time_resolves_to_earliest() {
        // Clocks fall back from 03:00 to 02:00 on 2025-04-06 in Sydney.
        let utc = local_to_utc(DEFAULT_TIMEZONE, datetime(2025, 4, 6, 2, 30));
        assert_eq!(utc, datetime(2025, 4, 5, 15, 30));
    }

    #[test]
    fn day_bounds_cover_local_day() {
        let date = NaiveDate::from_ymd_opt(2025, 6, 2).expect("valid date");
        let (start, end) = local_day_bounds(DEFAULT_TIMEZONE, date);
        assert_eq!(start, datetime(2025, 6, 1, 14, 0));
        assert_eq!(end, datetime(2025, 6, 2, 14, 0));
    }

    #[test]
    fn parses_known_zone_names_only() {
        assert!(parse_timezone("Australia/Perth").is_some());
        assert!(parse_timezone("Mars/Olympus").is_none());
    }
}
