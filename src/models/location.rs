use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::location::{
    Location as DomainLocation, NewLocation as DomainNewLocation,
    UpdateLocation as DomainUpdateLocation,
};
use crate::models::nullable_text;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::locations)]
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

#[derive(Insertable)]
#[diesel(table_name = crate::schema::locations)]
pub struct NewLocation<'a> {
    pub merchant_id: i32,
    pub name: &'a str,
    pub address: Option<&'a str>,
    pub phone: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::locations)]
pub struct UpdateLocation<'a> {
    pub name: Option<&'a str>,
    pub address: Option<Option<&'a str>>,
    pub phone: Option<Option<&'a str>>,
    pub is_active: Option<bool>,
    pub updated_at: NaiveDateTime,
}

impl From<Location> for DomainLocation {
    fn from(value: Location) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            name: value.name,
            address: value.address,
            phone: value.phone,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewLocation> for NewLocation<'a> {
    fn from(value: &'a DomainNewLocation) -> Self {
        Self {
            merchant_id: value.merchant_id,
            name: value.name.as_str(),
            address: value.address.as_deref(),
            phone: value.phone.as_deref(),
        }
    }
}

impl<'a> UpdateLocation<'a> {
    pub fn from_domain(value: &'a DomainUpdateLocation, now: NaiveDateTime) -> Self {
        Self {
            name: value.name.as_deref(),
            address: nullable_text(&value.address),
            phone: nullable_text(&value.phone),
            is_active: value.is_active,
            updated_at: value.updated_at.unwrap_or(now),
        }
    }
}
