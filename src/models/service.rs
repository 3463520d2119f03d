use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::service::{
    NewService as DomainNewService, Service as DomainService, UpdateService as DomainUpdateService,
};
use crate::models::nullable_text;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::services)]
pub struct Service {
    pub id: i32,
    pub merchant_id: i32,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub duration_minutes: i32,
    pub padding_before_minutes: i32,
    pub padding_after_minutes: i32,
    pub price_cents: i64,
    pub tax_rate_bps: i32,
    pub is_active: bool,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::services)]
pub struct NewService<'a> {
    pub merchant_id: i32,
    pub name: &'a str,
    pub description: Option<&'a str>,
    pub category: Option<&'a str>,
    pub duration_minutes: i32,
    pub padding_before_minutes: i32,
    pub padding_after_minutes: i32,
    pub price_cents: i64,
    pub tax_rate_bps: i32,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::services)]
pub struct UpdateService<'a> {
    pub name: Option<&'a str>,
    pub description: Option<Option<&'a str>>,
    pub category: Option<Option<&'a str>>,
    pub duration_minutes: Option<i32>,
    pub padding_before_minutes: Option<i32>,
    pub padding_after_minutes: Option<i32>,
    pub price_cents: Option<i64>,
    pub tax_rate_bps: Option<i32>,
    pub is_active: Option<bool>,
    pub updated_at: NaiveDateTime,
}

impl From<Service> for DomainService {
    fn from(value: Service) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            name: value.name,
            description: value.description,
            category: value.category,
            duration_minutes: value.duration_minutes,
            padding_before_minutes: value.padding_before_minutes,
            padding_after_minutes: value.padding_after_minutes,
            price_cents: value.price_cents,
            tax_rate_bps: value.tax_rate_bps,
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewService> for NewService<'a> {
    fn from(value: &'a DomainNewService) -> Self {
        Self {
            merchant_id: value.merchant_id,
            name: value.name.as_str(),
            description: value.description.as_deref(),
            category: value.category.as_deref(),
            duration_minutes: value.duration_minutes,
            padding_before_minutes: value.padding_before_minutes,
            padding_after_minutes: value.padding_after_minutes,
            price_cents: value.price_cents,
            tax_rate_bps: value.tax_rate_bps,
        }
    }
}

impl<'a> UpdateService<'a> {
    pub fn from_domain(value: &'a DomainUpdateService, now: NaiveDateTime) -> Self {
        Self {
            name: value.name.as_deref(),
            description: nullable_text(&value.description),
            category: nullable_text(&value.category),
            duration_minutes: value.duration_minutes,
            padding_before_minutes: value.padding_before_minutes,
            padding_after_minutes: value.padding_after_minutes,
            price_cents: value.price_cents,
            tax_rate_bps: value.tax_rate_bps,
            is_active: value.is_active,
            updated_at: value.updated_at.unwrap_or(now),
        }
    }
}
