//! Merchant holidays and the Australian public holiday calendar.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use serde::{Deserialize, Serialize};

/// Where a merchant holiday came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HolidaySource {
    Custom,
    State,
}

impl HolidaySource {
    pub fn as_str(&self) -> &'static str {
        match self {
            HolidaySource::Custom => "custom",
            HolidaySource::State => "state",
        }
    }

    pub fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("state") {
            HolidaySource::State
        } else {
            HolidaySource::Custom
        }
    }
}

/// Australian state or territory with its own holiday calendar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AustralianState {
    Act,
    Nsw,
    Nt,
    Qld,
    Sa,
    Tas,
    Vic,
    Wa,
}

impl AustralianState {
    pub const ALL: [AustralianState; 8] = [
        AustralianState::Act,
        AustralianState::Nsw,
        AustralianState::Nt,
        AustralianState::Qld,
        AustralianState::Sa,
        AustralianState::Tas,
        AustralianState::Vic,
        AustralianState::Wa,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AustralianState::Act => "ACT",
            AustralianState::Nsw => "NSW",
            AustralianState::Nt => "NT",
            AustralianState::Qld => "QLD",
            AustralianState::Sa => "SA",
            AustralianState::Tas => "TAS",
            AustralianState::Vic => "VIC",
            AustralianState::Wa => "WA",
        }
    }
}

impl fmt::Display for AustralianState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AustralianState {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        AustralianState::ALL
            .into_iter()
            .find(|state| state.as_str() == upper)
            .ok_or_else(|| format!("Unsupported state \"{}\"", s.trim()))
    }
}

/// Day on which a merchant may be closed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerchantHoliday {
    pub id: i32,
    pub merchant_id: i32,
    pub name: String,
    pub date: NaiveDate,
    /// Whether bookings are refused on this date.
    pub is_day_off: bool,
    pub source: HolidaySource,
    pub state: Option<AustralianState>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMerchantHoliday {
    pub merchant_id: i32,
    pub name: String,
    pub date: NaiveDate,
    pub is_day_off: bool,
    pub source: HolidaySource,
    pub state: Option<AustralianState>,
}

impl NewMerchantHoliday {
    /// Custom day-off holiday with a trimmed name.
    pub fn custom(merchant_id: i32, name: impl Into<String>, date: NaiveDate) -> Self {
        Self {
            merchant_id,
            name: name.into().trim().to_string(),
            date,
            is_day_off: true,
            source: HolidaySource::Custom,
            state: None,
        }
    }
}

/// Patch applied to an existing holiday. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateMerchantHoliday {
    pub name: Option<String>,
    pub date: Option<NaiveDate>,
    pub is_day_off: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Public holiday produced by the state calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublicHoliday {
    pub name: String,
    pub date: NaiveDate,
    /// Part-day holidays do not close the business by default.
    pub part_day: bool,
}

impl PublicHoliday {
    fn full(name: &str, date: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            date,
            part_day: false,
        }
    }

    fn part(name: &str, date: NaiveDate) -> Self {
        Self {
            name: name.to_string(),
            date,
            part_day: true,
        }
    }
}

/// Outcome of synchronising a state calendar into a merchant's holidays.
#[derive(Debug, Clone, Default, Serialize, PartialEq, Eq)]
pub struct HolidaySyncSummary {
    pub created: usize,
    pub updated: usize,
    pub removed: usize,
    pub skipped_custom: usize,
}

fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or(NaiveDate::MIN)
}

/// Easter Sunday by the anonymous Gregorian algorithm.
pub fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    ymd(year, month as u32, day as u32)
}

/// The `occurrence`-th `weekday` of a month (1-based).
fn nth_weekday(year: i32, month: u32, weekday: Weekday, occurrence: u8) -> NaiveDate {
    NaiveDate::from_weekday_of_month_opt(year, month, weekday, occurrence)
        .unwrap_or_else(|| ymd(year, month, 1))
}

fn last_weekday(year: i32, month: u32, weekday: Weekday) -> NaiveDate {
    let first_of_next = if month == 12 {
        ymd(year + 1, 1, 1)
    } else {
        ymd(year, month + 1, 1)
    };
    let mut date = first_of_next - Duration::days(1);
    while date.weekday() != weekday {
        date -= Duration::days(1);
    }
    date
}

fn first_weekday_on_or_after(year: i32, month: u32, day: u32, weekday: Weekday) -> NaiveDate {
    let mut date = ymd(year, month, day);
    while date.weekday() != weekday {
        date += Duration::days(1);
    }
    date
}

fn new_year_holidays(year: i32) -> Vec<PublicHoliday> {
    let date = ymd(year, 1, 1);
    let mut holidays = vec![PublicHoliday::full("New Year's Day", date)];
    match date.weekday() {
        Weekday::Sat => holidays.push(PublicHoliday::full(
            "New Year's Day (observed)",
            date + Duration::days(2),
        )),
        Weekday::Sun => holidays.push(PublicHoliday::full(
            "New Year's Day (observed)",
            date + Duration::days(1),
        )),
        _ => {}
    }
    holidays
}

fn australia_day(year: i32) -> PublicHoliday {
    let date = ymd(year, 1, 26);
    let date = match date.weekday() {
        Weekday::Sat => date + Duration::days(2),
        Weekday::Sun => date + Duration::days(1),
        _ => date,
    };
    PublicHoliday::full("Australia Day", date)
}

fn christmas_holidays(year: i32, state: AustralianState) -> Vec<PublicHoliday> {
    let christmas = ymd(year, 12, 25);
    let boxing = ymd(year, 12, 26);
    let mut holidays = vec![PublicHoliday::full("Christmas Day", christmas)];

    match christmas.weekday() {
        Weekday::Sat => holidays.push(PublicHoliday::full(
            "Christmas Day (observed)",
            christmas + Duration::days(2),
        )),
        Weekday::Sun => holidays.push(PublicHoliday::full(
            "Christmas Day (observed)",
            christmas + Duration::days(1),
        )),
        _ => {}
    }

    let boxing_name = if state == AustralianState::Sa {
        "Proclamation Day public holiday / Boxing Day"
    } else {
        "Boxing Day"
    };
    holidays.push(PublicHoliday::full(boxing_name, boxing));

    if matches!(boxing.weekday(), Weekday::Sat | Weekday::Sun) {
        holidays.push(PublicHoliday::full(
            "Boxing Day (observed)",
            boxing + Duration::days(2),
        ));
    }

    holidays
}

fn state_extras(state: AustralianState, year: i32, easter: NaiveDate) -> Vec<PublicHoliday> {
    let easter_saturday = easter - Duration::days(1);
    let kings_birthday = "King\u{2019}s Birthday";

    match state {
        AustralianState::Act => vec![
            PublicHoliday::full("Canberra Day", nth_weekday(year, 3, Weekday::Mon, 2)),
            PublicHoliday::full(
                "Easter Saturday \u{2013} the day after Good Friday",
                easter_saturday,
            ),
            PublicHoliday::full("Easter Sunday", easter),
            PublicHoliday::full(
                "Reconciliation Day",
                first_weekday_on_or_after(year, 5, 27, Weekday::Mon),
            ),
            PublicHoliday::full(kings_birthday, nth_weekday(year, 6, Weekday::Mon, 2)),
            PublicHoliday::full("Labour Day", nth_weekday(year, 10, Weekday::Mon, 1)),
        ],
        AustralianState::Nsw => vec![
            PublicHoliday::full("Easter Saturday", easter_saturday),
            PublicHoliday::full("Easter Sunday", easter),
            PublicHoliday::full(kings_birthday, nth_weekday(year, 6, Weekday::Mon, 2)),
            PublicHoliday::full("Labour Day", nth_weekday(year, 10, Weekday::Mon, 1)),
        ],
        AustralianState::Nt => vec![
            PublicHoliday::full("Easter Saturday", easter_saturday),
            PublicHoliday::full("Easter Sunday", easter),
            PublicHoliday::full("May Day", nth_weekday(year, 5, Weekday::Mon, 1)),
            PublicHoliday::full(kings_birthday, nth_weekday(year, 6, Weekday::Mon, 2)),
            PublicHoliday::full("Picnic Day", nth_weekday(year, 8, Weekday::Mon, 1)),
            PublicHoliday::part(
                "Christmas Eve (part-day, 7 pm \u{2013} midnight)",
                ymd(year, 12, 24),
            ),
            PublicHoliday::part(
                "New Year's Eve (part-day, 7 pm \u{2013} midnight)",
                ymd(year, 12, 31),
            ),
        ],
        AustralianState::Qld => vec![
            PublicHoliday::full("The day after Good Friday", easter_saturday),
            PublicHoliday::full("Easter Sunday", easter),
            PublicHoliday::full("Labour Day", nth_weekday(year, 5, Weekday::Mon, 1)),
            PublicHoliday::full(
                "Royal Queensland Show (Brisbane area only)",
                first_weekday_on_or_after(year, 8, 11, Weekday::Wed),
            ),
            PublicHoliday::full(kings_birthday, nth_weekday(year, 10, Weekday::Mon, 1)),
            PublicHoliday::part(
                "Christmas Eve (part-day, 6 pm \u{2013} midnight)",
                ymd(year, 12, 24),
            ),
        ],
        AustralianState::Sa => vec![
            PublicHoliday::full("Adelaide Cup Day", nth_weekday(year, 3, Weekday::Mon, 2)),
            PublicHoliday::full("Easter Saturday", easter_saturday),
            PublicHoliday::full("Easter Sunday", easter),
            PublicHoliday::full(kings_birthday, nth_weekday(year, 6, Weekday::Mon, 2)),
            PublicHoliday::full("Labour Day", nth_weekday(year, 10, Weekday::Mon, 1)),
            PublicHoliday::part(
                "Christmas Eve (part-day, 7 pm \u{2013} midnight)",
                ymd(year, 12, 24),
            ),
            PublicHoliday::part(
                "New Year's Eve (part-day, 7 pm \u{2013} midnight)",
                ymd(year, 12, 31),
            ),
        ],
        AustralianState::Tas => vec![
            PublicHoliday::full(
                "Royal Hobart Regatta (certain areas only)",
                nth_weekday(year, 2, Weekday::Mon, 2),
            ),
            PublicHoliday::full("Eight Hours Day", nth_weekday(year, 3, Weekday::Mon, 2)),
            PublicHoliday::full(
                "Easter Tuesday (generally Tasmanian Public Service only)",
                easter + Duration::days(2),
            ),
            PublicHoliday::full(kings_birthday, nth_weekday(year, 6, Weekday::Mon, 2)),
            PublicHoliday::full(
                "Recreation Day (certain areas only)",
                nth_weekday(year, 11, Weekday::Mon, 1),
            ),
        ],
        AustralianState::Vic => vec![
            PublicHoliday::full("Labour Day", nth_weekday(year, 3, Weekday::Mon, 2)),
            PublicHoliday::full("Saturday before Easter Sunday", easter_saturday),
            PublicHoliday::full("Easter Sunday", easter),
            PublicHoliday::full(kings_birthday, nth_weekday(year, 6, Weekday::Mon, 2)),
            PublicHoliday::full(
                "Friday before the AFL Grand Final",
                last_weekday(year, 9, Weekday::Fri),
            ),
            PublicHoliday::full("Melbourne Cup", nth_weekday(year, 11, Weekday::Tue, 1)),
        ],
        AustralianState::Wa => vec![
            PublicHoliday::full("Labour Day", nth_weekday(year, 3, Weekday::Mon, 1)),
            PublicHoliday::full("Easter Sunday", easter),
            PublicHoliday::full("Western Australia Day", nth_weekday(year, 6, Weekday::Mon, 1)),
            PublicHoliday::full(kings_birthday, last_weekday(year, 9, Weekday::Mon)),
        ],
    }
}

/// Public holidays of `state` in `year`, one per date, sorted by date.
///
/// When two holidays share a date the national one listed first is kept.
pub fn australian_public_holidays(state: AustralianState, year: i32) -> Vec<PublicHoliday> {
    let easter = easter_sunday(year);

    let mut all = new_year_holidays(year);
    all.push(australia_day(year));
    all.push(PublicHoliday::full("Good Friday", easter - Duration::days(2)));
    all.push(PublicHoliday::full("Easter Monday", easter + Duration::days(1)));
    all.push(PublicHoliday::full("Anzac Day", ymd(year, 4, 25)));
    all.extend(christmas_holidays(year, state));
    all.extend(state_extras(state, year, easter));

    let mut seen = HashSet::new();
    let mut holidays: Vec<PublicHoliday> = all
        .into_iter()
        .filter(|holiday| seen.insert(holiday.date))
        .collect();
    holidays.sort_by_key(|holiday| holiday.date);
    holidays
}

#[cfg(test)]
mod tests {
    use super::*;

    fn find<'a>(holidays: &'a [PublicHoliday], name: &str) -> Option<&'a PublicHoliday> {
        holidays.iter().find(|holiday| holiday.name == name)
    }

    #[test]
    fn computes_easter_dates() {
        assert_eq!(easter_sunday(2024), ymd(2024, 3, 31));
        assert_eq!(easter_sunday(2025), ymd(2025, 4, 20));
        assert_eq!(easter_sunday(2026), ymd(2026, 4, 5));
    }

    #[test]
    fn nsw_2025_calendar() {
        let holidays = australian_public_holidays(AustralianState::Nsw, 2025);

        assert_eq!(find(&holidays, "Good Friday").map(|h| h.date), Some(ymd(2025, 4, 18)));
        assert_eq!(find(&holidays, "Easter Monday").map(|h| h.date), Some(ymd(2025, 4, 21)));
        assert_eq!(find(&holidays, "Labour Day").map(|h| h.date), Some(ymd(2025, 10, 6)));
        assert_eq!(
            find(&holidays, "King\u{2019}s Birthday").map(|h| h.date),
            Some(ymd(2025, 6, 9))
        );
        assert!(holidays.windows(2).all(|pair| pair[0].date < pair[1].date));
    }

    #[test]
    fn weekend_holidays_get_observed_days() {
        // 2022-01-01 is a Saturday and 2022-12-25 a Sunday.
        let holidays = australian_public_holidays(AustralianState::Vic, 2022);
        assert_eq!(
            find(&holidays, "New Year's Day (observed)").map(|h| h.date),
            Some(ymd(2022, 1, 3))
        );
        assert_eq!(
            find(&holidays, "Christmas Day (observed)").map(|h| h.date),
            Some(ymd(2022, 12, 26))
        );
        // Boxing Day falls on a Monday in 2022, so it has no observance of its own.
        assert_eq!(find(&holidays, "Boxing Day (observed)"), None);
    }

    #[test]
    fn australia_day_moves_off_weekend() {
        // 2025-01-26 is a Sunday.
        let holidays = australian_public_holidays(AustralianState::Wa, 2025);
        assert_eq!(find(&holidays, "Australia Day").map(|h| h.date), Some(ymd(2025, 1, 27)));
    }

    #[test]
    fn dedupe_keeps_first_holiday_per_date() {
        // Easter Monday and Anzac Day coincide on 2011-04-25.
        let holidays = australian_public_holidays(AustralianState::Act, 2011);
        let on_anzac: Vec<_> = holidays
            .iter()
            .filter(|holiday| holiday.date == ymd(2011, 4, 25))
            .collect();
        assert_eq!(on_anzac.len(), 1);
        assert_eq!(on_anzac[0].name, "Easter Monday");
    }

    #[test]
    fn part_day_holidays_are_flagged() {
        let holidays = australian_public_holidays(AustralianState::Sa, 2025);
        let eve = holidays
            .iter()
            .find(|holiday| holiday.date == ymd(2025, 12, 24))
            .expect("christmas eve present");
        assert!(eve.part_day);
        assert_eq!(
            find(&holidays, "Proclamation Day public holiday / Boxing Day").map(|h| h.date),
            Some(ymd(2025, 12, 26))
        );
    }

    #[test]
    fn victoria_specials() {
        let holidays = australian_public_holidays(AustralianState::Vic, 2025);
        assert_eq!(
            find(&holidays, "Melbourne Cup").map(|h| h.date),
            Some(ymd(2025, 11, 4))
        );
        assert_eq!(
            find(&holidays, "Friday before the AFL Grand Final").map(|h| h.date),
            Some(ymd(2025, 9, 26))
        );
    }

    #[test]
    fn parses_states_case_insensitively() {
        assert_eq!("qld".parse::<AustralianState>(), Ok(AustralianState::Qld));
        assert!("XYZ".parse::<AustralianState>().is_err());
        let json = serde_json::to_string(&AustralianState::Tas).expect("serialize");
        assert_eq!(json, "\"TAS\"");
    }
}
