use chrono::NaiveDateTime;
use diesel::prelude::*;

use crate::domain::merchant::{
    Merchant as DomainMerchant, MerchantSettings, NewMerchant as DomainNewMerchant,
};

#[derive(Debug, Clone, Identifiable, Queryable, Selectable)]
#[diesel(table_name = crate::schema::merchants)]
pub struct Merchant {
    pub id: i32,
    pub name: String,
    pub subdomain: String,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub timezone: String,
    pub currency: String,
    pub settings: String,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Insertable)]
#[diesel(table_name = crate::schema::merchants)]
pub struct NewMerchant<'a> {
    pub name: &'a str,
    pub subdomain: &'a str,
    pub email: &'a str,
    pub username: &'a str,
    pub password_hash: &'a str,
    pub timezone: &'a str,
    pub currency: &'a str,
    pub settings: String,
}

impl From<Merchant> for DomainMerchant {
    fn from(value: Merchant) -> Self {
        Self {
            id: value.id,
            name: value.name,
            subdomain: value.subdomain,
            email: value.email,
            username: value.username,
            password_hash: value.password_hash,
            timezone: value.timezone,
            currency: value.currency,
            settings: MerchantSettings::from_json(&value.settings),
            created_at: value.created_at,
            updated_at: value.updated_at,
        }
    }
}

impl<'a> From<&'a DomainNewMerchant> for NewMerchant<'a> {
    fn from(value: &'a DomainNewMerchant) -> Self {
        Self {
            name: value.name.as_str(),
            subdomain: value.subdomain.as_str(),
            email: value.email.as_str(),
            username: value.username.as_str(),
            password_hash: value.password_hash.as_str(),
            timezone: value.timezone.as_str(),
            currency: value.currency.as_str(),
            settings: value.settings.to_json(),
        }
    }
}
