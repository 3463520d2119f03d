use std::collections::HashSet;

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidateEmail, ValidationErrors};

use crate::domain::schedule::{NewScheduleOverride, NewStaffSchedule, format_hhmm, parse_hhmm};
use crate::domain::staff::{AccessLevel, NewStaff, StaffStatus, UpdateStaff};
use crate::forms::{optional_inline, parse_date, sanitize_inline_text};

const NAME_MAX_LEN: u64 = 64;

#[derive(Debug, Error)]
pub enum StaffFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("first name cannot be empty")]
    EmptyName,
    #[error("access level must be 1, 2 or 3")]
    InvalidAccessLevel,
    #[error("invalid email `{0}`")]
    InvalidEmail(String),
    #[error("unknown staff status `{0}`")]
    InvalidStatus(String),
    #[error("times must use HH:MM")]
    InvalidTime,
    #[error("start time must be before end time")]
    StartAfterEnd,
    #[error("day of week {0} is listed more than once")]
    DuplicateDay(i32),
    #[error("provide both start and end time, or neither for a day off")]
    IncompleteOverride,
    #[error("invalid date `{0}`")]
    InvalidDate(String),
}

pub type StaffFormResult<T> = Result<T, StaffFormError>;

#[derive(Debug, Deserialize, Validate)]
pub struct AddStaffForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub first_name: String,
    #[validate(length(max = NAME_MAX_LEN))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub access_level: Option<i32>,
    #[validate(length(max = 16))]
    pub calendar_color: Option<String>,
}

impl AddStaffForm {
    pub fn into_new_staff(self, merchant_id: i32) -> StaffFormResult<NewStaff> {
        self.validate()?;
        let first_name = sanitize_inline_text(&self.first_name);
        if first_name.is_empty() {
            return Err(StaffFormError::EmptyName);
        }
        let access_level = match self.access_level {
            Some(level) => {
                AccessLevel::try_from(level).map_err(|_| StaffFormError::InvalidAccessLevel)?
            }
            None => AccessLevel::Staff,
        };

        let mut staff = NewStaff::new(merchant_id, first_name, access_level);
        staff.last_name = optional_inline(self.last_name.as_deref());
        staff.email = normalize_email(self.email.as_deref())?.filter(|email| !email.is_empty());
        staff.phone = optional_inline(self.phone.as_deref());
        staff.calendar_color = optional_inline(self.calendar_color.as_deref());
        Ok(staff)
    }
}

/// Patch for a staff member. Empty optional strings clear the value.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditStaffForm {
    #[validate(length(min = 1, max = NAME_MAX_LEN))]
    pub first_name: Option<String>,
    #[validate(length(max = NAME_MAX_LEN))]
    pub last_name: Option<String>,
    pub email: Option<String>,
    #[validate(length(max = 32))]
    pub phone: Option<String>,
    pub access_level: Option<i32>,
    pub status: Option<String>,
    #[validate(length(max = 16))]
    pub calendar_color: Option<String>,
}

impl EditStaffForm {
    pub fn into_update_staff(self) -> StaffFormResult<UpdateStaff> {
        self.validate()?;

        let first_name = match self.first_name.as_deref().map(sanitize_inline_text) {
            Some(name) if name.is_empty() => return Err(StaffFormError::EmptyName),
            other => other,
        };
        let access_level = self
            .access_level
            .map(AccessLevel::try_from)
            .transpose()
            .map_err(|_| StaffFormError::InvalidAccessLevel)?;
        let status = self
            .status
            .map(|status| {
                status
                    .parse::<StaffStatus>()
                    .map_err(|_| StaffFormError::InvalidStatus(status))
            })
            .transpose()?;

        Ok(UpdateStaff {
            first_name,
            last_name: self.last_name.as_deref().map(sanitize_inline_text),
            email: normalize_email(self.email.as_deref())?,
            phone: self.phone.as_deref().map(sanitize_inline_text),
            access_level,
            status,
            calendar_color: self.calendar_color.as_deref().map(sanitize_inline_text),
            updated_at: None,
        })
    }
}

/// Lowercased email; an empty value stays empty so patches can clear it.
fn normalize_email(raw: Option<&str>) -> StaffFormResult<Option<String>> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    let email = raw.trim().to_lowercase();
    if !email.is_empty() && !email.validate_email() {
        return Err(StaffFormError::InvalidEmail(email));
    }
    Ok(Some(email))
}

#[derive(Debug, Deserialize)]
pub struct ScheduleEntryForm {
    /// 0 = Sunday through 6 = Saturday.
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
}

/// Whole weekly schedule of one staff member.
#[derive(Debug, Deserialize)]
pub struct ReplaceSchedulesForm {
    pub schedules: Vec<ScheduleEntryForm>,
}

impl ReplaceSchedulesForm {
    pub fn into_new_schedules(self, staff_id: i32) -> StaffFormResult<Vec<NewStaffSchedule>> {
        let mut seen = HashSet::new();
        let mut schedules = Vec::with_capacity(self.schedules.len());

        for entry in self.schedules {
            if !(0..=6).contains(&entry.day_of_week) {
                return Err(StaffFormError::Validation(day_of_week_error()));
            }
            if !seen.insert(entry.day_of_week) {
                return Err(StaffFormError::DuplicateDay(entry.day_of_week));
            }
            let (start, end) = ordered_times(&entry.start_time, &entry.end_time)?;
            schedules.push(NewStaffSchedule {
                staff_id,
                day_of_week: entry.day_of_week,
                start_time: start,
                end_time: end,
            });
        }

        schedules.sort_by_key(|schedule| schedule.day_of_week);
        Ok(schedules)
    }
}

fn day_of_week_error() -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    errors.add(
        "day_of_week",
        validator::ValidationError::new("range").with_message("must be between 0 and 6".into()),
    );
    errors
}

fn ordered_times(start: &str, end: &str) -> StaffFormResult<(String, String)> {
    let (Some(start), Some(end)) = (parse_hhmm(start), parse_hhmm(end)) else {
        return Err(StaffFormError::InvalidTime);
    };
    if start >= end {
        return Err(StaffFormError::StartAfterEnd);
    }
    Ok((format_hhmm(start), format_hhmm(end)))
}

/// Date-specific shift or day off.
#[derive(Debug, Deserialize, Validate)]
pub struct ScheduleOverrideForm {
    pub date: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
    #[validate(length(max = 256))]
    pub reason: Option<String>,
}

impl ScheduleOverrideForm {
    pub fn into_new_override(self, staff_id: i32) -> StaffFormResult<NewScheduleOverride> {
        self.validate()?;
        let date: NaiveDate =
            parse_date(&self.date).ok_or_else(|| StaffFormError::InvalidDate(self.date.clone()))?;

        let start = self.start_time.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let end = self.end_time.as_deref().map(str::trim).filter(|v| !v.is_empty());
        let (start_time, end_time) = match (start, end) {
            (Some(start), Some(end)) => {
                let (start, end) = ordered_times(start, end)?;
                (Some(start), Some(end))
            }
            (None, None) => (None, None),
            _ => return Err(StaffFormError::IncompleteOverride),
        };

        Ok(NewScheduleOverride {
            staff_id,
            date,
            start_time,
            end_time,
            reason: optional_inline(self.reason.as_deref()),
        })
    }
}

/// `GET /v1/staff` filters.
#[derive(Debug, Default, Deserialize)]
pub struct StaffQueryParams {
    #[serde(default)]
    pub active_only: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_form_defaults_to_staff_level() {
        let form = AddStaffForm {
            first_name: " Mia ".into(),
            last_name: None,
            email: Some(" Mia@Salon.Test ".into()),
            phone: None,
            access_level: None,
            calendar_color: Some("#aabbcc".into()),
        };
        let staff = form.into_new_staff(1).unwrap();
        assert_eq!(staff.first_name, "Mia");
        assert_eq!(staff.email.as_deref(), Some("mia@salon.test"));
        assert_eq!(staff.access_level, AccessLevel::Staff);
    }

    #[test]
    fn add_form_rejects_unknown_level() {
        let form = AddStaffForm {
            first_name: "Mia".into(),
            last_name: None,
            email: None,
            phone: None,
            access_level: Some(7),
            calendar_color: None,
        };
        assert!(matches!(
            form.into_new_staff(1),
            Err(StaffFormError::InvalidAccessLevel)
        ));
    }

    #[test]
    fn edit_form_parses_status() {
        let form = EditStaffForm {
            status: Some("inactive".into()),
            ..Default::default()
        };
        assert_eq!(
            form.into_update_staff().unwrap().status,
            Some(StaffStatus::Inactive)
        );

        let form = EditStaffForm {
            status: Some("retired".into()),
            ..Default::default()
        };
        assert!(matches!(
            form.into_update_staff(),
            Err(StaffFormError::InvalidStatus(_))
        ));
    }

    #[test]
    fn schedules_reject_duplicates_and_reversed_times() {
        let form = ReplaceSchedulesForm {
            schedules: vec![
                ScheduleEntryForm {
                    day_of_week: 1,
                    start_time: "09:00".into(),
                    end_time: "17:00".into(),
                },
                ScheduleEntryForm {
                    day_of_week: 1,
                    start_time: "10:00".into(),
                    end_time: "12:00".into(),
                },
            ],
        };
        assert!(matches!(
            form.into_new_schedules(4),
            Err(StaffFormError::DuplicateDay(1))
        ));

        let form = ReplaceSchedulesForm {
            schedules: vec![ScheduleEntryForm {
                day_of_week: 2,
                start_time: "17:00".into(),
                end_time: "09:00".into(),
            }],
        };
        assert!(matches!(
            form.into_new_schedules(4),
            Err(StaffFormError::StartAfterEnd)
        ));
    }

    #[test]
    fn override_without_times_is_a_day_off() {
        let form = ScheduleOverrideForm {
            date: "2025-04-25".into(),
            start_time: Some("".into()),
            end_time: None,
            reason: Some("Anzac Day".into()),
        };
        let entry = form.into_new_override(9).unwrap();
        assert_eq!(entry.start_time, None);
        assert_eq!(entry.end_time, None);

        let form = ScheduleOverrideForm {
            date: "2025-04-25".into(),
            start_time: Some("10:00".into()),
            end_time: None,
            reason: None,
        };
        assert!(matches!(
            form.into_new_override(9),
            Err(StaffFormError::IncompleteOverride)
        ));
    }
}
