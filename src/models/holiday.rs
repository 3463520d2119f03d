use chrono::{NaiveDate, NaiveDateTime};
use diesel::prelude::*;

use crate::domain::holiday::{
    HolidaySource, MerchantHoliday as DomainMerchantHoliday,
    NewMerchantHoliday as DomainNewMerchantHoliday,
    UpdateMerchantHoliday as DomainUpdateMerchantHoliday,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::merchant_holidays)]
pub struct MerchantHoliday {
    pub id: i32,
    pub merchant_id: i32,
    pub name: String,
    pub date: NaiveDate,
    pub is_day_off: bool,
    pub source: String,
    pub state: Option<String>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::merchant_holidays)]
pub struct NewMerchantHoliday<'a> {
    pub merchant_id: i32,
    pub name: &'a str,
    pub date: NaiveDate,
    pub is_day_off: bool,
    pub source: &'a str,
    pub state: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::merchant_holidays)]
pub struct UpdateMerchantHoliday<'a> {
    pub name: Option<&'a str>,
    pub date: Option<NaiveDate>,
    pub is_day_off: Option<bool>,
    pub updated_at: NaiveDateTime,
}

impl From<MerchantHoliday> for DomainMerchantHoliday {
    fn from(value: MerchantHoliday) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            name: value.name,
            date: value.date,
            is_day_off: value.is_day_off,
            source: HolidaySource::parse(&value.source),
            state: value.state.and_then(|state| state.parse().ok()),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewMerchantHoliday> for NewMerchantHoliday<'a> {
    fn from(value: &'a DomainNewMerchantHoliday) -> Self {
        Self {
            merchant_id: value.merchant_id,
            name: value.name.as_str(),
            date: value.date,
            is_day_off: value.is_day_off,
            source: value.source.as_str(),
            state: value.state.as_ref().map(|state| state.as_str()),
        }
    }
}

impl<'a> UpdateMerchantHoliday<'a> {
    pub fn from_domain(value: &'a DomainUpdateMerchantHoliday, now: NaiveDateTime) -> Self {
        Self {
            name: value.name.as_deref(),
            date: value.date,
            is_day_off: value.is_day_off,
            updated_at: value.updated_at.unwrap_or(now),
        }
    }
}
