use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Staff whose first name matches this placeholder are never assigned work.
pub const UNASSIGNED_STAFF_NAME: &str = "unassigned";

/// Seniority of a staff member, used to gate PIN-protected actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "i32", try_from = "i32")]
pub enum AccessLevel {
    Staff = 1,
    Manager = 2,
    Owner = 3,
}

impl AccessLevel {
    /// Minimum level required to perform `action`.
    ///
    /// Unknown actions require the owner.
    pub fn required_for(action: &str) -> Self {
        match action {
            "view_customer_details" | "process_payment" | "create_booking" => AccessLevel::Staff,
            "refund_payment"
            | "cancel_booking"
            | "view_reports"
            | "edit_staff"
            | "view_sensitive_customer_data" => AccessLevel::Manager,
            _ => AccessLevel::Owner,
        }
    }

    pub fn role_name(&self) -> &'static str {
        match self {
            AccessLevel::Staff => "STAFF",
            AccessLevel::Manager => "MANAGER",
            AccessLevel::Owner => "OWNER",
        }
    }
}

impl From<AccessLevel> for i32 {
    fn from(value: AccessLevel) -> Self {
        value as i32
    }
}

impl TryFrom<i32> for AccessLevel {
    type Error = String;

    fn try_from(value: i32) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(AccessLevel::Staff),
            2 => Ok(AccessLevel::Manager),
            3 => Ok(AccessLevel::Owner),
            other => Err(format!("unknown access level {other}")),
        }
    }
}

/// Employment status of a staff member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaffStatus {
    Active,
    Inactive,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            StaffStatus::Active => "active",
            StaffStatus::Inactive => "inactive",
        }
    }
}

impl fmt::Display for StaffStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StaffStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "active" => Ok(StaffStatus::Active),
            "inactive" => Ok(StaffStatus::Inactive),
            other => Err(format!("unknown staff status {other}")),
        }
    }
}

/// Staff member of a merchant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Staff {
    pub id: i32,
    pub merchant_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub access_level: AccessLevel,
    pub status: StaffStatus,
    /// Hex colour used by calendar views.
    pub calendar_color: Option<String>,
    /// Encrypted PIN, never serialized.
    #[serde(skip)]
    pub pin_cipher: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl Staff {
    pub fn is_active(&self) -> bool {
        self.status == StaffStatus::Active
    }

    /// Whether this record is the "Unassigned" placeholder column.
    pub fn is_placeholder(&self) -> bool {
        self.first_name.trim().eq_ignore_ascii_case(UNASSIGNED_STAFF_NAME)
    }

    /// Active staff that can receive bookings.
    pub fn is_bookable(&self) -> bool {
        self.is_active() && !self.is_placeholder()
    }

    pub fn has_pin(&self) -> bool {
        self.pin_cipher.is_some()
    }

    pub fn full_name(&self) -> String {
        match self.last_name.as_deref().map(str::trim) {
            Some(last) if !last.is_empty() => format!("{} {}", self.first_name, last),
            _ => self.first_name.clone(),
        }
    }
}

/// JSON shape of a staff member exposed over the API.
#[derive(Debug, Clone, Serialize)]
pub struct StaffView {
    #[serde(flatten)]
    pub staff: Staff,
    pub has_pin: bool,
}

impl From<Staff> for StaffView {
    fn from(staff: Staff) -> Self {
        let has_pin = staff.has_pin();
        Self { staff, has_pin }
    }
}

/// Payload required to insert a new staff member.
#[derive(Debug, Clone)]
pub struct NewStaff {
    pub merchant_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub access_level: AccessLevel,
    pub calendar_color: Option<String>,
}

impl NewStaff {
    pub fn new(merchant_id: i32, first_name: impl Into<String>, access_level: AccessLevel) -> Self {
        Self {
            merchant_id,
            first_name: first_name.into(),
            last_name: None,
            email: None,
            phone: None,
            access_level,
            calendar_color: None,
        }
    }

    pub fn with_last_name(mut self, last_name: impl Into<String>) -> Self {
        self.last_name = Some(last_name.into());
        self
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Patch applied to an existing staff member. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdateStaff {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub access_level: Option<AccessLevel>,
    pub status: Option<StaffStatus>,
    pub calendar_color: Option<String>,
    pub updated_at: Option<NaiveDateTime>,
}

/// Query definition used to list staff for a merchant.
#[derive(Debug, Clone)]
pub struct StaffListQuery {
    pub merchant_id: i32,
    pub status: Option<StaffStatus>,
}

impl StaffListQuery {
    pub fn new(merchant_id: i32) -> Self {
        Self {
            merchant_id,
            status: None,
        }
    }

    /// Restrict the list to active staff.
    pub fn active(mut self) -> Self {
        self.status = Some(StaffStatus::Active);
        self
    }
}
