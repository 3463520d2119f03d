use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::staff::{
    AccessLevel, NewStaff as DomainNewStaff, Staff as DomainStaff, StaffStatus,
    UpdateStaff as DomainUpdateStaff,
};
use crate::models::nullable_text;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::staff)]
pub struct Staff {
    pub id: i32,
    pub merchant_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub access_level: i32,
    pub status: String,
    pub calendar_color: Option<String>,
    pub pin_cipher: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::staff)]
pub struct NewStaff<'a> {
    pub merchant_id: i32,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub access_level: i32,
    pub calendar_color: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::staff)]
pub struct UpdateStaff<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<Option<&'a str>>,
    pub email: Option<Option<&'a str>>,
    pub phone: Option<Option<&'a str>>,
    pub access_level: Option<i32>,
    pub status: Option<&'a str>,
    pub calendar_color: Option<Option<&'a str>>,
    pub updated_at: NaiveDateTime,
}

impl From<Staff> for DomainStaff {
    fn from(value: Staff) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            access_level: AccessLevel::try_from(value.access_level).unwrap_or(AccessLevel::Staff),
            status: value.status.parse().unwrap_or(StaffStatus::Inactive),
            calendar_color: value.calendar_color,
            pin_cipher: value.pin_cipher,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewStaff> for NewStaff<'a> {
    fn from(value: &'a DomainNewStaff) -> Self {
        Self {
            merchant_id: value.merchant_id,
            first_name: value.first_name.as_str(),
            last_name: value.last_name.as_deref(),
            email: value.email.as_deref(),
            phone: value.phone.as_deref(),
            access_level: value.access_level.into(),
            calendar_color: value.calendar_color.as_deref(),
        }
    }
}

impl<'a> UpdateStaff<'a> {
    pub fn from_domain(value: &'a DomainUpdateStaff, now: NaiveDateTime) -> Self {
        Self {
            first_name: value.first_name.as_deref(),
            last_name: nullable_text(&value.last_name),
            email: nullable_text(&value.email),
            phone: nullable_text(&value.phone),
            access_level: value.access_level.map(i32::from),
            status: value.status.as_ref().map(StaffStatus::as_str),
            calendar_color: nullable_text(&value.calendar_color),
            updated_at: value.updated_at.unwrap_or(now),
        }
    }
}
