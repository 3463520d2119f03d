use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::customer::{
    Customer as DomainCustomer, CustomerStatus, NewCustomer as DomainNewCustomer,
    UpdateCustomer as DomainUpdateCustomer,
};
use crate::models::nullable_text;

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::customers)]
pub struct Customer {
    pub id: i32,
    pub merchant_id: i32,
    pub first_name: String,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::customers)]
pub struct NewCustomer<'a> {
    pub merchant_id: i32,
    pub first_name: &'a str,
    pub last_name: Option<&'a str>,
    pub email: Option<&'a str>,
    pub phone: Option<&'a str>,
    pub notes: Option<&'a str>,
}

#[derive(AsChangeset)]
#[diesel(table_name = crate::schema::customers)]
pub struct UpdateCustomer<'a> {
    pub first_name: Option<&'a str>,
    pub last_name: Option<Option<&'a str>>,
    pub email: Option<Option<&'a str>>,
    pub phone: Option<Option<&'a str>>,
    pub notes: Option<Option<&'a str>>,
    pub updated_at: NaiveDateTime,
}

impl From<Customer> for DomainCustomer {
    fn from(value: Customer) -> Self {
        Self {
            id: value.id,
            merchant_id: value.merchant_id,
            first_name: value.first_name,
            last_name: value.last_name,
            email: value.email,
            phone: value.phone,
            notes: value.notes,
            status: CustomerStatus::parse(&value.status),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewCustomer> for NewCustomer<'a> {
    fn from(value: &'a DomainNewCustomer) -> Self {
        Self {
            merchant_id: value.merchant_id,
            first_name: value.first_name.as_str(),
            last_name: value.last_name.as_deref(),
            email: value.email.as_deref(),
            phone: value.phone.as_deref(),
            notes: value.notes.as_deref(),
        }
    }
}

impl<'a> UpdateCustomer<'a> {
    pub fn from_domain(value: &'a DomainUpdateCustomer, now: NaiveDateTime) -> Self {
        Self {
            first_name: value.first_name.as_deref(),
            last_name: nullable_text(&value.last_name),
            email: nullable_text(&value.email),
            phone: nullable_text(&value.phone),
            notes: nullable_text(&value.notes),
            updated_at: value.updated_at.unwrap_or(now),
        }
    }
}
