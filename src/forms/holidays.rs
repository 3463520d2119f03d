use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::holiday::{AustralianState, NewMerchantHoliday, UpdateMerchantHoliday};
use crate::forms::{parse_date, sanitize_inline_text};

#[derive(Debug, Error)]
pub enum HolidayFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("Holiday name is required")]
    EmptyName,
    #[error("invalid date `{0}`")]
    InvalidDate(String),
    #[error("{0}")]
    InvalidState(String),
}

pub type HolidayFormResult<T> = Result<T, HolidayFormError>;

fn required_date(raw: &str) -> HolidayFormResult<NaiveDate> {
    parse_date(raw).ok_or_else(|| HolidayFormError::InvalidDate(raw.to_string()))
}

#[derive(Debug, Deserialize, Validate)]
pub struct AddHolidayForm {
    #[validate(length(max = 128))]
    pub name: String,
    pub date: String,
}

impl AddHolidayForm {
    pub fn into_new_holiday(self, merchant_id: i32) -> HolidayFormResult<NewMerchantHoliday> {
        self.validate()?;
        let name = sanitize_inline_text(&self.name);
        if name.is_empty() {
            return Err(HolidayFormError::EmptyName);
        }
        let date = required_date(&self.date)?;
        Ok(NewMerchantHoliday::custom(merchant_id, name, date))
    }
}

#[derive(Debug, Default, Deserialize, Validate)]
pub struct EditHolidayForm {
    #[validate(length(max = 128))]
    pub name: Option<String>,
    pub date: Option<String>,
    pub is_day_off: Option<bool>,
}

impl EditHolidayForm {
    pub fn into_update_holiday(self) -> HolidayFormResult<UpdateMerchantHoliday> {
        self.validate()?;
        let name = match self.name.as_deref().map(sanitize_inline_text) {
            Some(name) if name.is_empty() => return Err(HolidayFormError::EmptyName),
            other => other,
        };
        let date = self.date.as_deref().map(required_date).transpose()?;
        Ok(UpdateMerchantHoliday {
            name,
            date,
            is_day_off: self.is_day_off,
            updated_at: None,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct SyncHolidaysForm {
    pub state: String,
    pub year: Option<i32>,
}

impl SyncHolidaysForm {
    /// State to sync and the year, defaulting to `current_year`.
    pub fn into_target(self, current_year: i32) -> HolidayFormResult<(AustralianState, i32)> {
        let state = self
            .state
            .parse::<AustralianState>()
            .map_err(HolidayFormError::InvalidState)?;
        Ok((state, self.year.unwrap_or(current_year)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn custom_holidays_need_a_name() {
        let form = AddHolidayForm {
            name: "   ".into(),
            date: "2025-12-24".into(),
        };
        assert!(matches!(
            form.into_new_holiday(1),
            Err(HolidayFormError::EmptyName)
        ));

        let form = AddHolidayForm {
            name: " Staff party ".into(),
            date: "2025-12-24".into(),
        };
        let holiday = form.into_new_holiday(1).unwrap();
        assert_eq!(holiday.name, "Staff party");
        assert!(holiday.is_day_off);
    }

    #[test]
    fn sync_form_defaults_year() {
        let form = SyncHolidaysForm {
            state: "vic".into(),
            year: None,
        };
        assert_eq!(form.into_target(2026).unwrap(), (AustralianState::Vic, 2026));

        let form = SyncHolidaysForm {
            state: "XYZ".into(),
            year: Some(2025),
        };
        assert!(matches!(
            form.into_target(2025),
            Err(HolidayFormError::InvalidState(_))
        ));
    }
}
