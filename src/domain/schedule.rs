use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::domain::merchant::MerchantSettings;

/// Parse a strict `HH:MM` wall-clock time.
pub fn parse_hhmm(value: &str) -> Option<NaiveTime> {
    let value = value.trim();
    if value.len() != 5 {
        return None;
    }
    NaiveTime::parse_from_str(value, "%H:%M").ok()
}

/// Format a wall-clock time as `HH:MM`.
pub fn format_hhmm(time: NaiveTime) -> String {
    time.format("%H:%M").to_string()
}

/// Weekday index used by rosters: 0 = Sunday through 6 = Saturday.
pub fn roster_day_of_week(date: NaiveDate) -> i32 {
    date.weekday().num_days_from_sunday() as i32
}

/// Recurring weekly shift of a staff member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StaffSchedule {
    pub id: i32,
    pub staff_id: i32,
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: i32,
    /// Shift start as `HH:MM`.
    pub start_time: String,
    /// Shift end as `HH:MM`.
    pub end_time: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewStaffSchedule {
    pub staff_id: i32,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

/// Date-specific replacement of the weekly shift.
///
/// Both times set describe the shift for that day; both empty mark a day off.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ScheduleOverride {
    pub id: i32,
    pub staff_id: i32,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

impl ScheduleOverride {
    /// Whether the override removes the staff member from the roster.
    pub fn is_day_off(&self) -> bool {
        self.start_time.is_none() || self.end_time.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewScheduleOverride {
    pub staff_id: i32,
    pub date: NaiveDate,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    pub reason: Option<String>,
}

/// Roster data needed to work out who is on shift on a given date.
#[derive(Debug, Clone, Default)]
pub struct Roster {
    pub schedules: Vec<StaffSchedule>,
    pub overrides: Vec<ScheduleOverride>,
}

impl Roster {
    pub fn new(schedules: Vec<StaffSchedule>, overrides: Vec<ScheduleOverride>) -> Self {
        Self {
            schedules,
            overrides,
        }
    }

    /// Local working window of `staff_id` on `date`.
    ///
    /// Resolution order is date override, weekly schedule, then business hours
    /// when the merchant does not restrict bookings to rostered staff.
    pub fn shift(
        &self,
        staff_id: i32,
        date: NaiveDate,
        settings: &MerchantSettings,
    ) -> Option<(NaiveTime, NaiveTime)> {
        if let Some(entry) = self
            .overrides
            .iter()
            .find(|entry| entry.staff_id == staff_id && entry.date == date)
        {
            return match (entry.start_time.as_deref(), entry.end_time.as_deref()) {
                (Some(start), Some(end)) => valid_window(start, end),
                _ => None,
            };
        }

        let day_of_week = roster_day_of_week(date);
        if let Some(entry) = self
            .schedules
            .iter()
            .find(|entry| entry.staff_id == staff_id && entry.day_of_week == day_of_week)
        {
            return valid_window(&entry.start_time, &entry.end_time);
        }

        if settings.show_only_rostered_staff {
            return None;
        }

        settings.opening_window(date.weekday()).flatten()
    }

    /// Whether `staff_id` is on shift for the whole local range `[start, end)`.
    pub fn covers(
        &self,
        staff_id: i32,
        date: NaiveDate,
        start: NaiveTime,
        end: NaiveTime,
        settings: &MerchantSettings,
    ) -> bool {
        match self.shift(staff_id, date, settings) {
            Some((shift_start, shift_end)) => shift_start <= start && end <= shift_end,
            None => false,
        }
    }
}

fn valid_window(start: &str, end: &str) -> Option<(NaiveTime, NaiveTime)> {
    let start = parse_hhmm(start)?;
    let end = parse_hhmm(end)?;
    (start < end).then_some((start, end))
}
