use chrono::{NaiveDateTime, NaiveTime, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::domain::holiday::AustralianState;
use crate::domain::schedule::parse_hhmm;
use crate::domain::timezone::{DEFAULT_TIMEZONE, parse_timezone};

/// Default IANA zone for newly created merchants.
pub const DEFAULT_TIMEZONE_NAME: &str = "Australia/Sydney";
/// Default ISO 4217 currency for newly created merchants.
pub const DEFAULT_CURRENCY: &str = "AUD";
/// Default distance between generated booking slots.
pub const DEFAULT_SLOT_INTERVAL_MINUTES: i64 = 15;

/// Tenant business owning locations, staff, services and customers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Merchant {
    /// Unique identifier of the merchant.
    pub id: i32,
    /// Display name of the business.
    pub name: String,
    /// Lowercase subdomain used to resolve the tenant on public endpoints.
    pub subdomain: String,
    /// Contact email of the owner.
    pub email: String,
    /// Login name for the back office.
    pub username: String,
    /// Argon2 PHC string, never serialized.
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    /// IANA time zone used for all wall-clock arithmetic.
    pub timezone: String,
    /// ISO 4217 currency code.
    pub currency: String,
    /// Parsed merchant settings.
    pub settings: MerchantSettings,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Merchant {
    /// Resolved time zone, falling back to Sydney for unknown names.
    pub fn tz(&self) -> Tz {
        parse_timezone(&self.timezone).unwrap_or(DEFAULT_TIMEZONE)
    }
}

/// Payload required to insert a new merchant.
#[derive(Debug, Clone)]
pub struct NewMerchant {
    pub name: String,
    pub subdomain: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub timezone: String,
    pub currency: String,
    pub settings: MerchantSettings,
}

impl NewMerchant {
    /// Build a merchant payload with default zone, currency and settings.
    pub fn new(
        name: impl Into<String>,
        subdomain: impl Into<String>,
        email: impl Into<String>,
        username: impl Into<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into().trim().to_string(),
            subdomain: subdomain.into().trim().to_lowercase(),
            email: email.into().trim().to_lowercase(),
            username: username.into().trim().to_string(),
            password_hash: password_hash.into(),
            timezone: DEFAULT_TIMEZONE_NAME.to_string(),
            currency: DEFAULT_CURRENCY.to_string(),
            settings: MerchantSettings::default(),
        }
    }

    /// Override the merchant time zone.
    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    /// Override the merchant currency.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = currency.into().to_uppercase();
        self
    }
}

/// Opening hours of a single weekday.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DayHours {
    pub is_open: bool,
    /// Opening time as `HH:MM`.
    pub open: String,
    /// Closing time as `HH:MM`.
    pub close: String,
}

impl DayHours {
    fn open_between(open: &str, close: &str) -> Self {
        Self {
            is_open: true,
            open: open.to_string(),
            close: close.to_string(),
        }
    }

    fn closed() -> Self {
        Self {
            is_open: false,
            open: "09:00".to_string(),
            close: "17:00".to_string(),
        }
    }

    /// Opening window of the day, `None` when closed or misconfigured.
    pub fn window(&self) -> Option<(NaiveTime, NaiveTime)> {
        if !self.is_open {
            return None;
        }
        let open = parse_hhmm(&self.open)?;
        let close = parse_hhmm(&self.close)?;
        (open < close).then_some((open, close))
    }
}

/// Weekly opening hours of the business.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BusinessHours {
    pub monday: DayHours,
    pub tuesday: DayHours,
    pub wednesday: DayHours,
    pub thursday: DayHours,
    pub friday: DayHours,
    pub saturday: DayHours,
    pub sunday: DayHours,
}

impl Default for BusinessHours {
    fn default() -> Self {
        Self {
            monday: DayHours::open_between("09:00", "17:00"),
            tuesday: DayHours::open_between("09:00", "17:00"),
            wednesday: DayHours::open_between("09:00", "17:00"),
            thursday: DayHours::open_between("09:00", "17:00"),
            friday: DayHours::open_between("09:00", "17:00"),
            saturday: DayHours::closed(),
            sunday: DayHours::closed(),
        }
    }
}

impl BusinessHours {
    /// Hours configured for `weekday`.
    pub fn day(&self, weekday: Weekday) -> &DayHours {
        match weekday {
            Weekday::Mon => &self.monday,
            Weekday::Tue => &self.tuesday,
            Weekday::Wed => &self.wednesday,
            Weekday::Thu => &self.thursday,
            Weekday::Fri => &self.friday,
            Weekday::Sat => &self.saturday,
            Weekday::Sun => &self.sunday,
        }
    }

    /// All days paired with their weekday, Monday first.
    pub fn days(&self) -> [(Weekday, &DayHours); 7] {
        [
            (Weekday::Mon, &self.monday),
            (Weekday::Tue, &self.tuesday),
            (Weekday::Wed, &self.wednesday),
            (Weekday::Thu, &self.thursday),
            (Weekday::Fri, &self.friday),
            (Weekday::Sat, &self.saturday),
            (Weekday::Sun, &self.sunday),
        ]
    }
}

fn default_business_hours() -> Option<BusinessHours> {
    Some(BusinessHours::default())
}

fn default_true() -> bool {
    true
}

fn default_slot_interval() -> i64 {
    DEFAULT_SLOT_INTERVAL_MINUTES
}

/// Booking behaviour configured per merchant and stored as JSON.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MerchantSettings {
    /// Weekly hours; `None` when the merchant has not configured any.
    #[serde(default = "default_business_hours")]
    pub business_hours: Option<BusinessHours>,
    /// Online bookings are confirmed immediately instead of pending.
    #[serde(default = "default_true")]
    pub auto_confirm_bookings: bool,
    /// Staff without a roster entry are not bookable.
    #[serde(default = "default_true")]
    pub show_only_rostered_staff: bool,
    /// Bookings may be accepted without a staff member.
    #[serde(default)]
    pub allow_unassigned_bookings: bool,
    #[serde(default = "default_slot_interval")]
    pub slot_interval_minutes: i64,
    /// State whose public holidays were last synchronised.
    #[serde(default)]
    pub holiday_state: Option<AustralianState>,
}

impl Default for MerchantSettings {
    fn default() -> Self {
        Self {
            business_hours: default_business_hours(),
            auto_confirm_bookings: true,
            show_only_rostered_staff: true,
            allow_unassigned_bookings: false,
            slot_interval_minutes: DEFAULT_SLOT_INTERVAL_MINUTES,
            holiday_state: None,
        }
    }
}

impl MerchantSettings {
    /// Parse the stored JSON, falling back to defaults when unreadable.
    pub fn from_json(raw: &str) -> Self {
        match serde_json::from_str(raw) {
            Ok(settings) => settings,
            Err(err) => {
                log::warn!("Unreadable merchant settings, using defaults: {err}");
                Self::default()
            }
        }
    }

    /// Serialize settings for storage.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Opening window for `weekday`.
    ///
    /// The outer `Option` is `None` when business hours are not configured at
    /// all; the inner one is `None` when the day is closed.
    pub fn opening_window(&self, weekday: Weekday) -> Option<Option<(NaiveTime, NaiveTime)>> {
        self.business_hours
            .as_ref()
            .map(|hours| hours.day(weekday).window())
    }
}
