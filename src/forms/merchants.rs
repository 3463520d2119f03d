use chrono::Weekday;
use serde::Deserialize;
use thiserror::Error;
use validator::{Validate, ValidationErrors};

use crate::domain::holiday::AustralianState;
use crate::domain::merchant::{BusinessHours, MerchantSettings, NewMerchant};
use crate::domain::schedule::parse_hhmm;
use crate::domain::timezone::parse_timezone;

#[derive(Debug, Error)]
pub enum MerchantFormError {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationErrors),
    #[error("{day}: times must use HH:MM")]
    InvalidTime { day: String },
    #[error("{day}: opening time must be before closing time")]
    OpenAfterClose { day: String },
    #[error("{0}")]
    InvalidState(String),
    #[error("subdomain may only contain lowercase letters, digits and hyphens")]
    InvalidSubdomain,
    #[error("unknown time zone `{0}`")]
    InvalidTimezone(String),
    #[error("currency must be a three letter ISO code")]
    InvalidCurrency,
}

pub type MerchantFormResult<T> = Result<T, MerchantFormError>;

/// Partial update of the merchant settings document.
#[derive(Debug, Default, Deserialize, Validate)]
pub struct UpdateSettingsForm {
    pub business_hours: Option<BusinessHours>,
    pub auto_confirm_bookings: Option<bool>,
    pub show_only_rostered_staff: Option<bool>,
    pub allow_unassigned_bookings: Option<bool>,
    #[validate(range(min = 5, max = 120))]
    pub slot_interval_minutes: Option<i64>,
    /// State code; an empty string clears the selection.
    pub holiday_state: Option<String>,
}

impl UpdateSettingsForm {
    /// Validate the patch and apply it on top of `current`.
    pub fn apply_to(self, mut current: MerchantSettings) -> MerchantFormResult<MerchantSettings> {
        self.validate()?;

        if let Some(hours) = self.business_hours {
            validate_business_hours(&hours)?;
            current.business_hours = Some(hours);
        }
        if let Some(value) = self.auto_confirm_bookings {
            current.auto_confirm_bookings = value;
        }
        if let Some(value) = self.show_only_rostered_staff {
            current.show_only_rostered_staff = value;
        }
        if let Some(value) = self.allow_unassigned_bookings {
            current.allow_unassigned_bookings = value;
        }
        if let Some(value) = self.slot_interval_minutes {
            current.slot_interval_minutes = value;
        }
        if let Some(state) = self.holiday_state {
            current.holiday_state = if state.trim().is_empty() {
                None
            } else {
                Some(
                    state
                        .parse::<AustralianState>()
                        .map_err(MerchantFormError::InvalidState)?,
                )
            };
        }

        Ok(current)
    }
}

/// New tenant account, as given to the `create-merchant` command.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterMerchantForm {
    #[validate(length(min = 1, max = 128))]
    pub name: String,
    #[validate(length(min = 1, max = 63))]
    pub subdomain: String,
    #[validate(email)]
    pub email: String,
    #[validate(length(min = 3, max = 64))]
    pub username: String,
    #[validate(length(min = 8))]
    pub password: String,
    pub timezone: Option<String>,
    pub currency: Option<String>,
}

impl RegisterMerchantForm {
    /// Validate the account details and attach an already hashed password.
    pub fn into_new_merchant(self, password_hash: String) -> MerchantFormResult<NewMerchant> {
        self.validate()?;

        let subdomain = self.subdomain.trim().to_lowercase();
        let valid_subdomain = !subdomain.starts_with('-')
            && !subdomain.ends_with('-')
            && subdomain
                .bytes()
                .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-');
        if subdomain.is_empty() || !valid_subdomain {
            return Err(MerchantFormError::InvalidSubdomain);
        }

        let mut merchant =
            NewMerchant::new(self.name, subdomain, self.email, self.username, password_hash);
        if let Some(timezone) = self.timezone.map(|tz| tz.trim().to_string()) {
            if parse_timezone(&timezone).is_none() {
                return Err(MerchantFormError::InvalidTimezone(timezone));
            }
            merchant = merchant.with_timezone(timezone);
        }
        if let Some(currency) = self.currency.map(|c| c.trim().to_string()) {
            if currency.len() != 3 || !currency.bytes().all(|b| b.is_ascii_alphabetic()) {
                return Err(MerchantFormError::InvalidCurrency);
            }
            merchant = merchant.with_currency(currency);
        }
        Ok(merchant)
    }
}

fn day_name(weekday: Weekday) -> String {
    match weekday {
        Weekday::Mon => "monday",
        Weekday::Tue => "tuesday",
        Weekday::Wed => "wednesday",
        Weekday::Thu => "thursday",
        Weekday::Fri => "friday",
        Weekday::Sat => "saturday",
        Weekday::Sun => "sunday",
    }
    .to_string()
}

fn validate_business_hours(hours: &BusinessHours) -> MerchantFormResult<()> {
    for (weekday, day) in hours.days() {
        let (Some(open), Some(close)) = (parse_hhmm(&day.open), parse_hhmm(&day.close)) else {
            return Err(MerchantFormError::InvalidTime {
                day: day_name(weekday),
            });
        };
        if day.is_open && open >= close {
            return Err(MerchantFormError::OpenAfterClose {
                day: day_name(weekday),
            });
        }
    }
    Ok(())
}
