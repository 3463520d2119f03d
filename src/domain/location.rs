use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Physical site of a merchant.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Location {
    pub id: i32,
    pub merchant_id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLocation {
    pub merchant_id: i32,
    pub name: String,
    pub address: Option<String>,
    pub phone: Option<String>,
}

impl NewLocation {
    pub fn new(merchant_id: i32, name: impl Into<String>) -> Self {
        Self {
            merchant_id,
            name: name.into(),
            address: None,
            phone: None,
        }
    }
}

/// Patch applied to an existing location. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateLocation {
    pub name: Option<String>,
    pub address: Option<String>,
    pub phone: Option<String>,
    pub is_active: Option<bool>,
    pub updated_at: Option<NaiveDateTime>,
}
